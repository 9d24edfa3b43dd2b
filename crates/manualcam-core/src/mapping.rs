//! Slider-to-physical value mapping.
//!
//! A UI slider position in `[0, 1]` is shaped by a power curve and then
//! stretched across a control axis' physical bounds:
//!
//! ```text
//! forward: physical   = normalized^gamma × (max − min) + min
//! inverse: normalized = ((physical − min) / (max − min))^(1 / gamma)
//! ```
//!
//! `gamma > 1` gives the low end of the slider finer resolution, which is
//! what exposure duration needs: most of the travel covers fast shutter
//! speeds, and only the last part of it reaches long exposures.
//!
//! None of these functions clamp or validate. Use [`ControlDomain`] to
//! validate bounds once, and [`clamp_normalized`] / [`ControlDomain::clamp`]
//! when inputs may stray outside their range.
//!
//! [`ControlDomain`]: crate::domain::ControlDomain
//! [`ControlDomain::clamp`]: crate::domain::ControlDomain::clamp

/// Map a normalized slider position to a physical control value.
///
/// `normalized = 0` yields `domain_min` and `normalized = 1` yields
/// `domain_max` for any positive `gamma`. `gamma = 1` is plain linear
/// interpolation.
pub fn forward(normalized: f64, domain_min: f64, domain_max: f64, gamma: f64) -> f64 {
    normalized.powf(gamma) * (domain_max - domain_min) + domain_min
}

/// Map a physical control value back to a normalized slider position.
///
/// Inverse of [`forward`] when called with the same exponent. Dividing by
/// `domain_max - domain_min` means a degenerate domain produces a
/// non-finite result; callers validate the domain first.
pub fn inverse(physical: f64, domain_min: f64, domain_max: f64, inverse_gamma: f64) -> f64 {
    ((physical - domain_min) / (domain_max - domain_min)).powf(1.0 / inverse_gamma)
}

/// Build a linear remapping from `[value_min, value_max]` onto
/// `[new_min, new_max]`.
///
/// Used to narrow or widen a slider's effective working range without
/// touching the underlying physical domain. Every call returns an
/// independent closure.
///
/// ```text
/// value' = (new_max − new_min) × (value − value_min) / (value_max − value_min) + new_min
/// ```
pub fn rescale(
    value_min: f64,
    value_max: f64,
    new_min: f64,
    new_max: f64,
) -> impl Fn(f64) -> f64 + Copy + Send + Sync {
    move |value| (new_max - new_min) * (value - value_min) / (value_max - value_min) + new_min
}

/// Clamp a slider position into `[0, 1]`. NaN maps to 0.
pub fn clamp_normalized(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
