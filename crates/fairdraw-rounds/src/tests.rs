// Lifecycle tests for the round registry in both entropy modes

#[cfg(test)]
mod tests {
    use crate::*;
    use fairdraw_entropy::{ChainView, MockChain, MockVrfCoordinator};
    use fairdraw_types::*;
    use proptest::prelude::*;

    fn vrf_registry() -> (RoundRegistry, MockChain, MockVrfCoordinator) {
        let chain = MockChain::new(100);
        let coordinator = MockVrfCoordinator::new();
        let registry =
            RoundRegistry::vrf(VrfConfig::default(), chain.clone(), coordinator.clone()).unwrap();
        (registry, chain, coordinator)
    }

    fn block_hash_registry(block_wait: u64) -> (RoundRegistry, MockChain) {
        let chain = MockChain::new(1000);
        let registry =
            RoundRegistry::block_hash(BlockHashConfig { block_wait }, chain.clone()).unwrap();
        (registry, chain)
    }

    /// Opens the next round and delivers the oracle answer
    fn open_and_fulfill(
        registry: &mut RoundRegistry,
        coordinator: &MockVrfCoordinator,
        secret: &[u8],
    ) -> (RoundId, U256) {
        let round = registry
            .open_next_round(Commitment::from_secret(secret))
            .unwrap();
        let request_id = coordinator.last_request_id().unwrap();
        let words = coordinator.random_words_for(request_id).unwrap();
        registry.fulfill_random_words(request_id, &words).unwrap();
        (round, words[0])
    }

    // ----- round counter -----

    #[test]
    fn test_advance_by_zero_fails() {
        let (mut registry, _, _) = vrf_registry();
        assert_eq!(registry.advance_by(0), Err(FairdrawError::InvalidAdvance));
        assert_eq!(registry.current_round(), 0);
        assert!(registry.events().is_empty());
    }

    #[test]
    fn test_advance_by_three_three_times() {
        let (mut registry, _, _) = vrf_registry();
        assert_eq!(registry.advance_by(3), Ok(3));
        assert_eq!(registry.advance_by(3), Ok(6));
        assert_eq!(registry.advance_by(3), Ok(9));
        assert_eq!(registry.current_round(), 9);

        let changes: Vec<_> = registry
            .events()
            .iter()
            .filter(|e| matches!(e, RoundEvent::RoundChanged { .. }))
            .collect();
        assert_eq!(changes.len(), 3);
        assert_eq!(
            registry.events()[2],
            RoundEvent::RoundChanged { previous: 6, current: 9 }
        );
    }

    #[test]
    fn test_advance_overflow() {
        let (mut registry, _, _) = vrf_registry();
        registry.advance_by(u64::MAX).unwrap();
        assert_eq!(registry.advance(), Err(FairdrawError::RoundOverflow));
        assert_eq!(registry.current_round(), u64::MAX);
    }

    #[test]
    fn test_event_log_keeps_most_recent() {
        let (mut registry, _, _) = vrf_registry();
        let total = MAX_RETAINED_EVENTS as u64 + 10;
        for _ in 0..total {
            registry.advance().unwrap();
        }

        let events = registry.events();
        assert_eq!(events.len(), MAX_RETAINED_EVENTS);
        assert_eq!(
            events.first(),
            Some(&RoundEvent::RoundChanged { previous: 10, current: 11 })
        );
        assert_eq!(
            events.last(),
            Some(&RoundEvent::RoundChanged { previous: total - 1, current: total })
        );
    }

    #[test]
    fn test_advance_does_not_open() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.advance().unwrap();
        assert_eq!(registry.round_state(1), RoundState::Unopened);
        assert!(coordinator.requests().is_empty());
    }

    // ----- commit -----

    #[test]
    fn test_open_requires_active_round() {
        let (mut registry, _, _) = vrf_registry();
        assert_eq!(
            registry.open_round(Commitment::from_secret(b"abc")),
            Err(FairdrawError::NoActiveRound)
        );
    }

    #[test]
    fn test_open_rejects_zero_commitment() {
        let (mut registry, _, _) = vrf_registry();
        registry.advance().unwrap();
        assert!(matches!(
            registry.open_round(Commitment(H256::zero())),
            Err(FairdrawError::InvalidCommitment(_))
        ));
    }

    #[test]
    fn test_vrf_open_dispatches_request() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.advance().unwrap();
        let commitment = Commitment::from_secret(b"abc");
        assert_eq!(registry.open_round(commitment), Ok(1));

        let request_id = coordinator.last_request_id().unwrap();
        assert_eq!(registry.round_for_request(request_id), Some(1));
        assert_eq!(registry.round_state(1), RoundState::Committed);
        assert!(!registry.is_fulfilled(1));

        let pending = registry.pending_round(1).unwrap();
        assert_eq!(pending.commitment, commitment);
        assert_eq!(pending.anchor_block, 100);
        assert_eq!(pending.request_id, Some(request_id));
        assert_eq!(pending.resolved_entropy, None);
    }

    #[test]
    fn test_vrf_second_open_while_pending_fails() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.open_next_round(Commitment::from_secret(b"one")).unwrap();

        assert_eq!(
            registry.open_next_round(Commitment::from_secret(b"two")),
            Err(FairdrawError::OraclePending { pending: 1 })
        );
        // The failed call must not have advanced the counter
        assert_eq!(registry.current_round(), 1);
        assert_eq!(coordinator.requests().len(), 1);

        // Fulfilled is not enough, the slot frees on finalize
        let request_id = coordinator.last_request_id().unwrap();
        let words = coordinator.random_words_for(request_id).unwrap();
        registry.fulfill_random_words(request_id, &words).unwrap();
        assert_eq!(
            registry.open_next_round(Commitment::from_secret(b"two")),
            Err(FairdrawError::OraclePending { pending: 1 })
        );

        registry.finalize(1, b"one").unwrap();
        assert_eq!(registry.open_next_round(Commitment::from_secret(b"two")), Ok(2));
    }

    #[test]
    fn test_rejected_request_leaves_no_state() {
        let (mut registry, _, coordinator) = vrf_registry();
        coordinator.reject_requests(true);

        assert!(matches!(
            registry.open_next_round(Commitment::from_secret(b"abc")),
            Err(FairdrawError::Entropy(_))
        ));
        assert_eq!(registry.current_round(), 0);
        assert!(registry.pending_rounds().is_empty());
        assert!(registry.events().is_empty());

        coordinator.reject_requests(false);
        assert_eq!(registry.open_next_round(Commitment::from_secret(b"abc")), Ok(1));
    }

    #[test]
    fn test_open_next_round_event_order() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        let request_id = coordinator.last_request_id();

        assert_eq!(
            registry.drain_events(),
            vec![
                RoundEvent::RoundChanged { previous: 0, current: 1 },
                RoundEvent::RandomnessRequested {
                    round: 1,
                    request_id,
                    anchor_block: 100,
                },
            ]
        );
        assert!(registry.events().is_empty());
    }

    // ----- oracle callback -----

    #[test]
    fn test_callback_sets_marker_and_entropy() {
        let (mut registry, chain, coordinator) = vrf_registry();
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        chain.mine(4);

        let request_id = coordinator.last_request_id().unwrap();
        let words = coordinator.random_words_for(request_id).unwrap();
        assert_eq!(registry.fulfill_random_words(request_id, &words), Ok(1));

        assert!(registry.is_fulfilled(1));
        assert!(!registry.is_finalized(1));
        assert_eq!(registry.fulfillment_block(1), Some(104));
        assert_eq!(registry.round_state(1), RoundState::Fulfilled);
        assert_eq!(
            registry.pending_round(1).unwrap().resolved_entropy,
            Some(words[0])
        );
    }

    #[test]
    fn test_callback_unknown_request() {
        let (mut registry, _, _) = vrf_registry();
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        assert_eq!(
            registry.fulfill_random_words(RequestId(99), &[U256::one()]),
            Err(FairdrawError::UnknownRequest(RequestId(99)))
        );
    }

    #[test]
    fn test_duplicate_callback_rejected() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        let request_id = coordinator.last_request_id().unwrap();

        registry.fulfill_random_words(request_id, &[U256::from(5u64)]).unwrap();
        assert_eq!(
            registry.fulfill_random_words(request_id, &[U256::from(6u64)]),
            Err(FairdrawError::AlreadyFulfilled(1))
        );
        assert_eq!(
            registry.pending_round(1).unwrap().resolved_entropy,
            Some(U256::from(5u64))
        );
    }

    #[test]
    fn test_stale_callback_for_finished_round() {
        let (mut registry, _, coordinator) = vrf_registry();
        open_and_fulfill(&mut registry, &coordinator, b"one");
        let first_request = coordinator.last_request_id().unwrap();
        registry.finalize(1, b"one").unwrap();
        registry.open_next_round(Commitment::from_secret(b"two")).unwrap();

        assert_eq!(
            registry.fulfill_random_words(first_request, &[U256::one()]),
            Err(FairdrawError::StaleCallback {
                request: first_request,
                round: 1,
            })
        );
        assert!(!registry.is_fulfilled(2));
    }

    /// Coordinator that hands out the same id for every request
    struct FixedIdCoordinator;

    impl fairdraw_entropy::VrfCoordinator for FixedIdCoordinator {
        fn request_random_words(
            &mut self,
            _request: &fairdraw_entropy::VrfRequest,
        ) -> Result<RequestId> {
            Ok(RequestId(1))
        }
    }

    #[test]
    fn test_reused_request_id_rejected() {
        let chain = MockChain::new(100);
        let mut registry =
            RoundRegistry::vrf(VrfConfig::default(), chain.clone(), FixedIdCoordinator).unwrap();

        registry.open_next_round(Commitment::from_secret(b"one")).unwrap();
        let old_word = U256::from(7u64);
        registry.fulfill_random_words(RequestId(1), &[old_word]).unwrap();
        registry.finalize(1, b"one").unwrap();
        let events_before = registry.events().len();

        assert_eq!(
            registry.open_next_round(Commitment::from_secret(b"two")),
            Err(FairdrawError::DuplicateRequest {
                request: RequestId(1),
                round: 1,
            })
        );
        assert_eq!(registry.current_round(), 1);
        assert!(registry.pending_rounds().is_empty());
        assert_eq!(registry.round_for_request(RequestId(1)), Some(1));
        assert_eq!(registry.events().len(), events_before);

        // The old answer replayed cannot land anywhere
        assert_eq!(
            registry.fulfill_random_words(RequestId(1), &[old_word]),
            Err(FairdrawError::StaleCallback {
                request: RequestId(1),
                round: 1,
            })
        );
        assert!(!registry.is_fulfilled(2));
        assert_eq!(
            FairdrawError::DuplicateRequest { request: RequestId(1), round: 1 }.kind(),
            ErrorKind::Sequencing
        );
    }

    #[test]
    fn test_callback_without_words() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        let request_id = coordinator.last_request_id().unwrap();
        assert_eq!(
            registry.fulfill_random_words(request_id, &[]),
            Err(FairdrawError::EmptyRandomWords(request_id))
        );
        assert!(!registry.is_fulfilled(1));
    }

    #[test]
    fn test_callback_in_block_hash_mode() {
        let (mut registry, _) = block_hash_registry(3);
        assert!(matches!(
            registry.fulfill_random_words(RequestId(1), &[U256::one()]),
            Err(FairdrawError::WrongMode(_))
        ));
    }

    // ----- finalize (oracle) -----

    #[test]
    fn test_end_to_end_abc() {
        let (mut registry, _, coordinator) = vrf_registry();
        let (round, raw) = open_and_fulfill(&mut registry, &coordinator, b"abc");

        let result = registry.finalize(round, b"abc").unwrap();
        assert_eq!(result, combine(raw, b"abc"));
        assert_eq!(registry.final_result(round), Ok(result));
        assert!(registry.is_finalized(round));
        assert_eq!(registry.round_state(round), RoundState::Finalized);
        assert!(registry.pending_round(round).is_none());

        assert_eq!(
            registry.finalize(round, b"abc"),
            Err(FairdrawError::AlreadyFinalized(round))
        );
        assert_eq!(
            registry.finalize(round, b"anything"),
            Err(FairdrawError::AlreadyFinalized(round))
        );
        assert_eq!(registry.final_result(round), Ok(result));
    }

    #[test]
    fn test_final_result_unreadable_until_finalized() {
        let (mut registry, _, coordinator) = vrf_registry();
        assert_eq!(registry.final_result(1), Err(FairdrawError::NotFinalized(1)));

        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        assert_eq!(registry.final_result(1), Err(FairdrawError::NotFinalized(1)));

        let request_id = coordinator.last_request_id().unwrap();
        let words = coordinator.random_words_for(request_id).unwrap();
        registry.fulfill_random_words(request_id, &words).unwrap();
        assert_eq!(registry.final_result(1), Err(FairdrawError::NotFinalized(1)));

        registry.finalize(1, b"abc").unwrap();
        assert!(registry.final_result(1).is_ok());
    }

    #[test]
    fn test_finalize_before_fulfilled() {
        let (mut registry, _, _) = vrf_registry();
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        assert_eq!(
            registry.finalize(1, b"abc"),
            Err(FairdrawError::NotFulfilled(1))
        );
    }

    #[test]
    fn test_finalize_unopened_round() {
        let (mut registry, _, _) = vrf_registry();
        assert_eq!(registry.finalize(3, b"abc"), Err(FairdrawError::RoundNotOpen(3)));
    }

    #[test]
    fn test_invalid_secret_leaves_round_open() {
        let (mut registry, _, coordinator) = vrf_registry();
        let (round, raw) = open_and_fulfill(&mut registry, &coordinator, b"abc");
        registry.drain_events();

        assert_eq!(
            registry.finalize(round, b"abd"),
            Err(FairdrawError::InvalidSecret(round))
        );
        assert_eq!(registry.round_state(round), RoundState::Fulfilled);
        assert!(registry.pending_round(round).is_some());
        assert!(registry.events().is_empty());

        assert_eq!(registry.finalize(round, b"abc"), Ok(combine(raw, b"abc")));
    }

    #[test]
    fn test_uncombined_callback_finalizes_directly() {
        let chain = MockChain::new(100);
        let coordinator = MockVrfCoordinator::new();
        let mut registry =
            RoundRegistry::vrf(VrfConfig::default(), chain, coordinator.clone())
                .unwrap()
                .with_secret_combination(false);

        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        let request_id = coordinator.last_request_id().unwrap();
        let words = coordinator.random_words_for(request_id).unwrap();
        registry.fulfill_random_words(request_id, &words).unwrap();

        assert_eq!(registry.final_result(1), Ok(words[0]));
        assert!(registry.pending_rounds().is_empty());
        assert_eq!(
            registry.finalize(1, b"abc"),
            Err(FairdrawError::AlreadyFinalized(1))
        );
        // Slot is free for the next round
        assert_eq!(registry.open_next_round(Commitment::from_secret(b"def")), Ok(2));
    }

    #[test]
    fn test_request_map_survives_finalize() {
        let (mut registry, _, coordinator) = vrf_registry();
        open_and_fulfill(&mut registry, &coordinator, b"abc");
        let request_id = coordinator.last_request_id().unwrap();
        registry.finalize(1, b"abc").unwrap();
        assert_eq!(registry.round_for_request(request_id), Some(1));
        assert_eq!(registry.round_for_request(RequestId(77)), None);
    }

    #[test]
    fn test_skipped_round_ids() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.advance_by(10).unwrap();
        registry.open_round(Commitment::from_secret(b"ten")).unwrap();
        let request_id = coordinator.last_request_id().unwrap();
        assert_eq!(registry.round_for_request(request_id), Some(10));
        assert_eq!(registry.round_state(5), RoundState::Unopened);
    }

    // ----- block-hash mode -----

    #[test]
    fn test_block_hash_open_anchors_immediately() {
        let (mut registry, _) = block_hash_registry(5);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();

        assert!(registry.is_fulfilled(1));
        assert_eq!(registry.fulfillment_block(1), Some(1000));
        assert_eq!(registry.round_state(1), RoundState::Fulfilled);
        assert_eq!(registry.pending_round(1).unwrap().request_id, None);
        assert!(matches!(
            registry.events().last(),
            Some(RoundEvent::RandomnessFulfilled { round: 1, block: 1000, .. })
        ));
    }

    #[test]
    fn test_block_hash_reveal_too_early() {
        let (mut registry, chain) = block_hash_registry(5);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        chain.mine(4);

        assert_eq!(
            registry.finalize(1, b"abc"),
            Err(FairdrawError::RevealTooEarly {
                round: 1,
                current: 1004,
                earliest: 1005,
            })
        );
        chain.mine(1);
        assert!(registry.finalize(1, b"abc").is_ok());
    }

    #[test]
    fn test_block_hash_result_uses_anchor_hash() {
        let (mut registry, chain) = block_hash_registry(2);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        chain.mine(2);

        let expected_raw = U256::from_big_endian(chain.block_hash(1000).as_bytes());
        assert_eq!(registry.finalize(1, b"abc"), Ok(combine(expected_raw, b"abc")));
    }

    #[test]
    fn test_block_hash_window_upper_edge() {
        let (mut registry, chain) = block_hash_registry(5);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        chain.set_height(1000 + MAX_BLOCK_HASH_AGE);
        assert!(registry.finalize(1, b"abc").is_ok());
    }

    #[test]
    fn test_block_hash_window_expired_is_permanent() {
        let (mut registry, chain) = block_hash_registry(5);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        chain.set_height(1000 + MAX_BLOCK_HASH_AGE + 1);

        let err = registry.finalize(1, b"abc").unwrap_err();
        assert_eq!(
            err,
            FairdrawError::RevealWindowExpired {
                round: 1,
                current: 1256,
                latest: 1255,
            }
        );
        assert!(!err.is_recoverable());
        assert_eq!(registry.round_state(1), RoundState::Fulfilled);

        chain.mine(100);
        assert!(matches!(
            registry.finalize(1, b"abc"),
            Err(FairdrawError::RevealWindowExpired { .. })
        ));
    }

    #[test]
    fn test_block_hash_concurrent_rounds() {
        let (mut registry, chain) = block_hash_registry(3);
        registry.open_next_round(Commitment::from_secret(b"one")).unwrap();
        chain.mine(1);
        registry.open_next_round(Commitment::from_secret(b"two")).unwrap();
        chain.mine(1);
        registry.open_next_round(Commitment::from_secret(b"three")).unwrap();
        assert_eq!(registry.pending_rounds().len(), 3);

        chain.mine(3);
        let third = registry.finalize(3, b"three").unwrap();
        let first = registry.finalize(1, b"one").unwrap();
        let second = registry.finalize(2, b"two").unwrap();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert!(registry.pending_rounds().is_empty());
    }

    #[test]
    fn test_block_hash_reopen_fails() {
        let (mut registry, chain) = block_hash_registry(1);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        assert_eq!(
            registry.open_round(Commitment::from_secret(b"xyz")),
            Err(FairdrawError::AlreadyOpen(1))
        );

        chain.mine(1);
        registry.finalize(1, b"abc").unwrap();
        assert_eq!(
            registry.open_round(Commitment::from_secret(b"xyz")),
            Err(FairdrawError::AlreadyFinalized(1))
        );
    }

    #[test]
    fn test_block_hash_invalid_secret_checked_after_window() {
        let (mut registry, chain) = block_hash_registry(5);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        assert!(matches!(
            registry.finalize(1, b"wrong"),
            Err(FairdrawError::RevealTooEarly { .. })
        ));
        chain.mine(5);
        assert_eq!(registry.finalize(1, b"wrong"), Err(FairdrawError::InvalidSecret(1)));
    }

    // ----- sampling -----

    #[test]
    fn test_sample_requires_finalized_round() {
        let (mut registry, _, coordinator) = vrf_registry();
        open_and_fulfill(&mut registry, &coordinator, b"abc");
        assert_eq!(
            registry.sample(b"raffle", 1, 1, 10, 10, 0),
            Err(FairdrawError::NotFinalized(1))
        );

        registry.finalize(1, b"abc").unwrap();
        let values = registry.sample(b"raffle", 1, 1, 10, 10, 0).unwrap();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=10).collect::<Vec<u32>>());
        assert_eq!(registry.sample(b"raffle", 1, 1, 10, 10, 0).unwrap(), values);
        assert!(matches!(
            registry.sample(b"raffle", 1, 1, 5, 10, 0),
            Err(FairdrawError::RangeTooSmall { .. })
        ));
    }

    // ----- configuration -----

    #[test]
    fn test_vrf_setters_flow_into_requests() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.set_key_hash(H256::repeat_byte(0x11)).unwrap();
        registry.set_request_confirmations(10).unwrap();
        registry.set_callback_gas_limit(750_000).unwrap();
        registry.set_num_words(2).unwrap();
        registry.set_native_payment(true).unwrap();

        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        let (_, request) = coordinator.requests().pop().unwrap();
        assert_eq!(request.key_hash, H256::repeat_byte(0x11));
        assert_eq!(request.request_confirmations, 10);
        assert_eq!(request.callback_gas_limit, 750_000);
        assert_eq!(request.num_words, 2);
        assert!(request.native_payment);

        let updates = registry
            .events()
            .iter()
            .filter(|e| matches!(e, RoundEvent::ConfigUpdated { .. }))
            .count();
        assert_eq!(updates, 5);
    }

    #[test]
    fn test_invalid_setter_keeps_config() {
        let (mut registry, _, _) = vrf_registry();
        assert!(matches!(
            registry.set_request_confirmations(0),
            Err(FairdrawError::Config(_))
        ));
        assert_eq!(registry.config(), EngineConfig::vrf(VrfConfig::default()));
    }

    #[test]
    fn test_setters_for_other_mode_fail() {
        let (mut vrf, _, _) = vrf_registry();
        assert!(matches!(vrf.set_block_wait(3), Err(FairdrawError::WrongMode(_))));

        let (mut block_hash, _) = block_hash_registry(3);
        assert!(matches!(
            block_hash.set_native_payment(true),
            Err(FairdrawError::WrongMode(_))
        ));
        assert!(matches!(
            block_hash.set_needs_secret_combination(false),
            Err(FairdrawError::WrongMode(_))
        ));
    }

    #[test]
    fn test_set_block_wait_applies_to_pending_rounds() {
        let (mut registry, chain) = block_hash_registry(10);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        chain.mine(3);
        assert!(registry.finalize(1, b"abc").is_err());

        assert!(matches!(registry.set_block_wait(0), Err(FairdrawError::Config(_))));
        registry.set_block_wait(3).unwrap();
        assert!(registry.finalize(1, b"abc").is_ok());
        assert_eq!(registry.config(), EngineConfig::block_hash(3));
    }

    #[test]
    fn test_toggle_secret_combination_at_runtime() {
        let (mut registry, _, coordinator) = vrf_registry();
        registry.set_needs_secret_combination(false).unwrap();
        assert!(!registry.config().needs_secret_combination);

        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        let request_id = coordinator.last_request_id().unwrap();
        let words = coordinator.random_words_for(request_id).unwrap();
        registry.fulfill_random_words(request_id, &words).unwrap();
        assert_eq!(registry.final_result(1), Ok(words[0]));
    }

    #[test]
    fn test_from_config() {
        let chain: Box<dyn ChainView> = Box::new(MockChain::new(1));
        assert!(matches!(
            RoundRegistry::from_config(EngineConfig::default(), chain, None),
            Err(FairdrawError::Config(_))
        ));

        let chain: Box<dyn ChainView> = Box::new(MockChain::new(1));
        let registry = RoundRegistry::from_config(EngineConfig::block_hash(4), chain, None).unwrap();
        assert_eq!(registry.mode(), EntropyMode::BlockHash);

        let chain: Box<dyn ChainView> = Box::new(MockChain::new(1));
        let config = EngineConfig::default().with_secret_combination(false);
        let registry = RoundRegistry::from_config(
            config.clone(),
            chain,
            Some(Box::new(MockVrfCoordinator::new())),
        )
        .unwrap();
        assert_eq!(registry.mode(), EntropyMode::Vrf);
        assert_eq!(registry.config(), config);
    }

    #[test]
    fn test_pending_round_serializes() {
        let (mut registry, _) = block_hash_registry(3);
        registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
        let json = serde_json::to_string(registry.pending_round(1).unwrap()).unwrap();
        let parsed: PendingRound = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, registry.pending_round(1).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_block_hash_reveal_window(block_wait in 1u64..=255, elapsed in 0u64..400) {
            let (mut registry, chain) = block_hash_registry(block_wait);
            registry.open_next_round(Commitment::from_secret(b"abc")).unwrap();
            chain.mine(elapsed);

            let result = registry.finalize(1, b"abc");
            if elapsed < block_wait {
                prop_assert!(
                    matches!(result, Err(FairdrawError::RevealTooEarly { .. })),
                    "expected RevealTooEarly"
                );
            } else if elapsed > MAX_BLOCK_HASH_AGE {
                prop_assert!(
                    matches!(result, Err(FairdrawError::RevealWindowExpired { .. })),
                    "expected RevealWindowExpired"
                );
            } else {
                prop_assert!(result.is_ok());
                prop_assert!(registry.is_finalized(1));
            }
        }
    }
}
