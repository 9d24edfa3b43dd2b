//! Validated physical bounds and shaping exponents for one control axis.

use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// Physical bounds `[min, max]` of a control axis.
///
/// Construction guarantees `min < max` with both finite, so mapping through
/// a `ControlDomain` never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDomain", into = "RawDomain")]
pub struct ControlDomain {
    min: f64,
    max: f64,
}

#[derive(Serialize, Deserialize)]
struct RawDomain {
    min: f64,
    max: f64,
}

impl ControlDomain {
    /// `[0, 1]`.
    pub const UNIT: Self = Self { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Result<Self, MappingError> {
        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(MappingError::InvalidDomain { min, max });
        }
        Ok(Self { min, max })
    }

    pub const fn min(&self) -> f64 {
        self.min
    }

    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Width of the domain, always positive.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Clamp a physical value into the domain. NaN maps to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

impl TryFrom<RawDomain> for ControlDomain {
    type Error = MappingError;

    fn try_from(raw: RawDomain) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl From<ControlDomain> for RawDomain {
    fn from(domain: ControlDomain) -> Self {
        Self {
            min: domain.min,
            max: domain.max,
        }
    }
}

/// Shaping exponent of a slider response curve. `1.0` is linear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Gamma(f64);

impl Gamma {
    pub const LINEAR: Self = Self(1.0);

    pub fn new(value: f64) -> Result<Self, MappingError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(MappingError::InvalidGamma(value));
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for Gamma {
    fn default() -> Self {
        Self::LINEAR
    }
}

impl TryFrom<f64> for Gamma {
    type Error = MappingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Gamma> for f64 {
    fn from(gamma: Gamma) -> Self {
        gamma.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_rejects_degenerate_bounds() {
        assert!(matches!(
            ControlDomain::new(5.0, 5.0),
            Err(MappingError::InvalidDomain { .. })
        ));
        assert!(ControlDomain::new(8000.0, 3000.0).is_err());
        assert!(ControlDomain::new(f64::NAN, 1.0).is_err());
        assert!(ControlDomain::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_domain_clamp() {
        let domain = ControlDomain::new(-150.0, 150.0).unwrap();
        assert_eq!(domain.clamp(-200.0), -150.0);
        assert_eq!(domain.clamp(200.0), 150.0);
        assert_eq!(domain.clamp(12.5), 12.5);
        assert_eq!(domain.clamp(f64::NAN), -150.0);
        assert_eq!(domain.span(), 300.0);
    }

    #[test]
    fn test_gamma_rejects_non_positive() {
        assert!(Gamma::new(0.0).is_err());
        assert!(Gamma::new(-1.0).is_err());
        assert!(Gamma::new(f64::NAN).is_err());
        assert_eq!(Gamma::new(3.333).unwrap().get(), 3.333);
    }

    #[test]
    fn test_domain_deserialize_validates() {
        let ok: ControlDomain = serde_json::from_str(r#"{"min": 3000, "max": 8000}"#).unwrap();
        assert_eq!(ok.min(), 3000.0);
        assert!(serde_json::from_str::<ControlDomain>(r#"{"min": 1, "max": 1}"#).is_err());
        assert!(serde_json::from_str::<Gamma>("-2.0").is_err());
    }
}
