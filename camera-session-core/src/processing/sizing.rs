//! Output size selection.
//!
//! Picks the resolution a session binds for each surface: big enough for
//! the request without wasting sensor bandwidth, and close enough in
//! aspect ratio that the host does not have to letterbox aggressively.

use crate::models::device::SizePx;

/// Maximum absolute difference between width/height ratios for a
/// candidate to count as matching the requested aspect.
const ASPECT_TOLERANCE: f32 = 0.1;

/// Selects an output size for a request.
///
/// Candidates within the aspect tolerance are partitioned into "at least
/// as large as requested" and "smaller". The smallest large-enough
/// candidate by area wins, then the largest smaller one, then the first
/// supported size when nothing matches the aspect. `None` only when
/// `supported` is empty.
pub fn select_output_size(supported: &[SizePx], request: SizePx) -> Option<SizePx> {
    let target_ratio = request.aspect_ratio();

    let matching: Vec<SizePx> = supported
        .iter()
        .filter(|s| (s.aspect_ratio() - target_ratio).abs() <= ASPECT_TOLERANCE)
        .copied()
        .collect();

    let (big_enough, smaller): (Vec<SizePx>, Vec<SizePx>) = matching
        .into_iter()
        .partition(|s| s.width >= request.width && s.height >= request.height);

    big_enough
        .into_iter()
        .min_by_key(|s| s.area())
        .or_else(|| smaller.into_iter().max_by_key(|s| s.area()))
        .or_else(|| supported.first().copied())
}

/// Selects the still-capture target size: the largest supported size by
/// area. `None` only when `supported` is empty.
pub fn select_still_size(supported: &[SizePx]) -> Option<SizePx> {
    supported.iter().copied().max_by_key(|s| s.area())
}

/// Bounds a resolution request by an optional cap, per axis.
pub fn cap_request(request: SizePx, cap: Option<SizePx>) -> SizePx {
    match cap {
        Some(cap) => SizePx::new(request.width.min(cap.width), request.height.min(cap.height)),
        None => request,
    }
}
