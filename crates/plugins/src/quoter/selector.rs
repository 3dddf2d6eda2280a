use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use sentinel_core::{Responses, TransientError};

/// Derives the PRNG seed from a Slack timestamp: microseconds since epoch, truncated.
///
/// Edits keep the original timestamp, so every decision seeded from it is stable across edits.
pub fn timestamp_seed(timestamp: &str) -> Result<i64, TransientError> {
    let seconds = timestamp
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite())
        .ok_or_else(|| TransientError::MalformedTimestamp(timestamp.to_owned()))?;
    Ok((seconds * 1_000_000.0) as i64)
}

// ChaCha12 streams are fixed per seed across platforms and rand_chacha releases.
fn seeded_rng(seed: i64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed as u64)
}

/// One uniform draw in `[0, 1)`.
pub fn unit_draw(seed: i64) -> f64 {
    seeded_rng(seed).gen::<f64>()
}

/// Picks one response for `seed`.
pub fn select(responses: &Responses, seed: i64) -> &str {
    let index = seeded_rng(seed).gen_range(0..responses.len());
    &responses.as_slice()[index]
}
