//! Segment sizing for chunked delivery

/// Default target duration of one segment
pub const DEFAULT_SEGMENT_DURATION_MS: u64 = 15_000;

/// Bytes covering `duration_ms` of audio at `byte_rate_per_second`
///
/// Rounds down. Advisory only: nothing here splits a container.
#[must_use]
pub fn size_for(byte_rate_per_second: u64, duration_ms: u64) -> u64 {
    let bytes = u128::from(byte_rate_per_second) * u128::from(duration_ms) / 1000;
    u64::try_from(bytes).unwrap_or(u64::MAX)
}
