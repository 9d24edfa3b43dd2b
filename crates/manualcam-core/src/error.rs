/// Errors raised while building control domains and profiles.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("invalid control domain [{min}, {max}]: max must be finite and greater than min")]
    InvalidDomain { min: f64, max: f64 },
    #[error("invalid shaping exponent {0}: must be finite and greater than zero")]
    InvalidGamma(f64),
    #[error("malformed control profile: {0}")]
    Profile(#[from] serde_json::Error),
}

/// Failures reported by the capture device collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("could not lock device for configuration: {0}")]
    LockFailed(String),
    #[error("{0} is not supported by this device")]
    Unsupported(&'static str),
    #[error("capture device is unavailable")]
    Unavailable,
}
