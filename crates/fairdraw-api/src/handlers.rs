use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use fairdraw_rounds::Commitment;
use fairdraw_types::{EngineConfig, RequestId, RoundEvent, RoundId, U256};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct CurrentRoundResponse {
    pub current_round: RoundId,
    pub block_number: u64,
    pub mode: String,
}

#[derive(Deserialize)]
pub struct AdvanceRequest {
    #[serde(default)]
    pub by: Option<u64>,
}

#[derive(Serialize)]
pub struct AdvanceResponse {
    pub current_round: RoundId,
}

#[derive(Deserialize)]
pub struct OpenRequest {
    /// SHA256 of the operator secret, hex
    pub commitment: String,
    /// Advance to the next round id before opening
    #[serde(default)]
    pub advance: bool,
}

#[derive(Serialize)]
pub struct OpenResponse {
    pub round: RoundId,
    pub request_id: Option<u64>,
    pub anchor_block: u64,
}

#[derive(Serialize)]
pub struct RoundView {
    pub round: RoundId,
    pub state: String,
    pub commitment: Option<String>,
    pub anchor_block: Option<u64>,
    pub request_id: Option<u64>,
    pub fulfillment_block: Option<u64>,
    pub result: Option<String>,
}

#[derive(Serialize)]
pub struct ResultResponse {
    pub round: RoundId,
    pub result: String,
}

#[derive(Deserialize)]
pub struct FinalizeRequest {
    /// Operator secret, hex
    pub secret: String,
}

#[derive(Deserialize)]
pub struct SampleQuery {
    pub tag: String,
    pub min: u32,
    pub max: u32,
    pub count: u32,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Serialize)]
pub struct SampleResponse {
    pub round: RoundId,
    pub values: Vec<u32>,
}

#[derive(Deserialize)]
pub struct CallbackRequest {
    pub request_id: u64,
    pub random_words: Vec<String>,
}

#[derive(Serialize)]
pub struct CallbackResponse {
    pub round: RoundId,
    pub finalized: bool,
}

#[derive(Serialize)]
pub struct RequestLookupResponse {
    pub request_id: u64,
    pub round: RoundId,
}

/// 32-byte big-endian hex with `0x` prefix
pub(crate) fn word_hex(word: U256) -> String {
    let mut bytes = [0u8; 32];
    word.to_big_endian(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, ApiError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).map_err(|e| ApiError::BadRequest(format!("{field}: {e}")))
}

/// Hex word with optional `0x` prefix, leading zeros optional
fn parse_word(value: &str) -> Result<U256, ApiError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() || digits.len() > 64 {
        return Err(ApiError::BadRequest(format!(
            "random_words: expected 1 to 64 hex digits, got {}",
            digits.len()
        )));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| ApiError::BadRequest(format!("random_words: {e:?}")))
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn current_round(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry();
    Json(CurrentRoundResponse {
        current_round: registry.current_round(),
        block_number: registry.block_number(),
        mode: registry.mode().to_string(),
    })
}

pub async fn advance(
    State(state): State<AppState>,
    Json(req): Json<AdvanceRequest>,
) -> ApiResult<AdvanceResponse> {
    let current_round = state.registry().advance_by(req.by.unwrap_or(1))?;
    Ok(Json(AdvanceResponse { current_round }))
}

pub async fn open_round(
    State(state): State<AppState>,
    Json(req): Json<OpenRequest>,
) -> ApiResult<OpenResponse> {
    let commitment = Commitment::from_hex(&req.commitment)?;
    let mut registry = state.registry();
    let round = if req.advance {
        registry.open_next_round(commitment)?
    } else {
        registry.open_round(commitment)?
    };
    let pending = registry.pending_round(round);
    Ok(Json(OpenResponse {
        round,
        request_id: pending.and_then(|p| p.request_id).map(|id| id.0),
        anchor_block: pending.map_or_else(|| registry.block_number(), |p| p.anchor_block),
    }))
}

pub async fn get_round(
    State(state): State<AppState>,
    Path(round): Path<RoundId>,
) -> impl IntoResponse {
    let registry = state.registry();
    let pending = registry.pending_round(round);
    Json(RoundView {
        round,
        state: registry.round_state(round).to_string(),
        commitment: pending.map(|p| p.commitment.to_hex()),
        anchor_block: pending.map(|p| p.anchor_block),
        request_id: pending.and_then(|p| p.request_id).map(|id| id.0),
        fulfillment_block: registry.fulfillment_block(round),
        result: registry.final_result(round).ok().map(word_hex),
    })
}

pub async fn get_result(
    State(state): State<AppState>,
    Path(round): Path<RoundId>,
) -> ApiResult<ResultResponse> {
    let result = state.registry().final_result(round)?;
    Ok(Json(ResultResponse {
        round,
        result: word_hex(result),
    }))
}

pub async fn finalize(
    State(state): State<AppState>,
    Path(round): Path<RoundId>,
    Json(req): Json<FinalizeRequest>,
) -> ApiResult<ResultResponse> {
    let secret = decode_hex("secret", &req.secret)?;
    let result = state.registry().finalize(round, &secret)?;
    Ok(Json(ResultResponse {
        round,
        result: word_hex(result),
    }))
}

pub async fn sample(
    State(state): State<AppState>,
    Path(round): Path<RoundId>,
    Query(query): Query<SampleQuery>,
) -> ApiResult<SampleResponse> {
    let values = state.registry().sample(
        query.tag.as_bytes(),
        round,
        query.min,
        query.max,
        query.count,
        query.offset,
    )?;
    Ok(Json(SampleResponse { round, values }))
}

/// Oracle delivery endpoint
pub async fn vrf_callback(
    State(state): State<AppState>,
    Json(req): Json<CallbackRequest>,
) -> ApiResult<CallbackResponse> {
    let words = req
        .random_words
        .iter()
        .map(|w| parse_word(w))
        .collect::<Result<Vec<_>, _>>()?;
    let mut registry = state.registry();
    let round = registry.fulfill_random_words(RequestId(req.request_id), &words)?;
    Ok(Json(CallbackResponse {
        round,
        finalized: registry.is_finalized(round),
    }))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<u64>,
) -> ApiResult<RequestLookupResponse> {
    let id = RequestId(request_id);
    let round = state
        .registry()
        .round_for_request(id)
        .ok_or(fairdraw_types::FairdrawError::UnknownRequest(id))?;
    Ok(Json(RequestLookupResponse { request_id, round }))
}

pub async fn get_config(State(state): State<AppState>) -> Json<EngineConfig> {
    Json(state.registry().config())
}

/// Registry event log, oldest first
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<RoundEvent>> {
    Json(state.registry().events().to_vec())
}
