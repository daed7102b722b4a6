mod sampler;

pub use sampler::{sample, SampleRequest, MAX_ATTEMPTS, MAX_SAMPLE_COUNT};
