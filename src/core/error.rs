use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a set of circumstances is rejected before any element is computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    #[error("invalid claimant type: {0} (expected single or joint)")]
    UnknownArrangement(String),

    #[error("partner age is required for a joint claim")]
    MissingPartnerAge,

    #[error("{field} must be at least {min}, got {found}")]
    AgeTooLow {
        field: &'static str,
        min: u32,
        found: u32,
    },

    #[error("dependent {index} age must be between 0 and {max}, got {found}")]
    DependentAge { index: usize, max: u32, found: u32 },

    #[error("{0} must be >= 0")]
    NegativeAmount(&'static str),

    #[error("{field} must be at most {max}")]
    AmountTooLarge { field: &'static str, max: Decimal },

    #[error("invalid rate schedule: {0}")]
    InvalidRateSchedule(String),
}
