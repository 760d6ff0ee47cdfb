use thiserror::Error;

/// Main error type for the eth-fee-oracle library.
#[derive(Error, Debug)]
pub enum FeeModelError {
    /// Invalid estimator configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A fee history sample violates one of its structural invariants.
    #[error("Invalid fee history sample: {0}")]
    InvalidSample(String),

    /// Insufficient data for fee estimation.
    #[error("Insufficient data for estimation: {0}")]
    InsufficientData(String),

    /// Invalid input parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A hex-encoded quantity could not be parsed.
    #[error("Malformed quantity {value:?}: {reason}")]
    MalformedQuantity { value: String, reason: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Results in this library.
pub type Result<T> = std::result::Result<T, FeeModelError>;

impl FeeModelError {
    /// Creates an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates an InvalidSample error.
    pub fn invalid_sample(msg: impl Into<String>) -> Self {
        Self::InvalidSample(msg.into())
    }

    /// Creates an InsufficientData error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Creates an InvalidParameter error.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates a MalformedQuantity error.
    pub fn malformed_quantity(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedQuantity {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
