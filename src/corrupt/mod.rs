//! Randomized byte-range corruption of an in-memory media buffer.
//!
//! Operates on the intermediate container's raw bytes. A guard band keeps the
//! corruption away from the start of the file so the container header survives
//! and the downstream re-encode can still open it.

use moshforge_av::{Error, Result};
use rand::Rng;
use serde::Serialize;

/// Fraction of the buffer reserved at the front for container headers,
/// expressed as a divisor (1/20 = 5%).
const GUARD_BAND_DIVISOR: usize = 20;

/// Parameters for a corruption job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlitchParams {
    /// Number of corruption passes to apply.
    pub passes: u32,
    /// Bytes overwritten per pass.
    pub strength: usize,
}

/// A byte range `[start, end)` that was overwritten by one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlitchRegion {
    pub start: usize,
    pub end: usize,
}

/// Compute the first byte offset eligible for corruption.
///
/// 5% of the buffer is skipped to protect the container header. When the
/// buffer is too small for the requested strength to respect the band, the
/// band collapses to zero rather than shrinking the writable range to nothing.
pub(crate) fn guard_band_offset(len: usize, strength: usize) -> usize {
    let band = len / GUARD_BAND_DIVISOR;
    if band > len - strength - 1 {
        0
    } else {
        band
    }
}

/// Apply `params.passes` passes of random corruption to `data` in place.
///
/// Each pass picks a start offset uniformly from the eligible range and
/// overwrites `params.strength` bytes with independently drawn random values.
/// Passes may overlap; overlapped bytes are simply re-randomized.
///
/// Returns the applied regions in pass order for diagnostic reporting.
///
/// # Errors
///
/// Fails with [`Error::InvalidInput`] before touching the buffer when it is
/// too small for the requested strength (`len <= strength + 1`), so a
/// misconfigured job never silently corrupts out of range.
pub fn corrupt_buffer<R: Rng>(
    data: &mut [u8],
    params: &GlitchParams,
    rng: &mut R,
) -> Result<Vec<GlitchRegion>> {
    let len = data.len();

    if len == 0 || len - 1 <= params.strength {
        return Err(Error::InvalidInput(format!(
            "buffer of {} bytes is too small for glitch strength {}",
            len, params.strength
        )));
    }

    let min_offset = guard_band_offset(len, params.strength);
    let max_start = len - params.strength - 1;

    let total = params.passes as u64 * params.strength as u64;
    if total > len as u64 {
        tracing::warn!(
            total_bytes = total,
            buffer_bytes = len,
            "requested corruption exceeds buffer size; output may be undecodable"
        );
    }

    let mut regions = Vec::with_capacity(params.passes as usize);
    for _ in 0..params.passes {
        let start = rng.gen_range(min_offset..=max_start);
        let end = (start + params.strength).min(len);

        for byte in &mut data[start..end] {
            *byte = rng.gen();
        }

        tracing::debug!(start, end, "applied corruption region");
        regions.push(GlitchRegion { start, end });
    }

    Ok(regions)
}
