use rand::Rng;

use crate::error::ProbabilityError;

/// Rolls a percentage check that succeeds with probability `p`.
///
/// `p` is truncated to whole percent, so `0.005` never succeeds and `1.0`
/// always does.
///
/// ### Errors
/// Returns [`ProbabilityError`] when `p` is outside `0..=1` (including NaN).
pub fn chance(p: f64, rng: &mut impl Rng) -> Result<bool, ProbabilityError> {
    check(p)?;
    let percent = (p * 100.0) as u32;
    Ok(rng.random_range(1..=100) <= percent)
}

/// Validates a probability without rolling.
pub fn check(p: f64) -> Result<f64, ProbabilityError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(ProbabilityError(p))
    }
}
