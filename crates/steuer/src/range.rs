//! Gross income sampling.

/// Distance between two consecutive income samples.
pub const INCOME_STEP: usize = 1000;

/// Income samples from `start` up to and including `stop`, in steps of [`INCOME_STEP`].
///
/// Yields nothing when `start > stop`.
pub fn income_range(start: u32, stop: u32) -> impl Iterator<Item = u32> {
    (start..=stop).step_by(INCOME_STEP)
}
