//! Error types for the salvage-economy crate.
//!
//! The economy rules never panic. Arithmetic that could overflow is checked
//! and surfaces as [`EconomyError::ArithmeticOverflow`]; balance violations
//! surface as [`EconomyError::InsufficientResource`].

use salvage_types::ResourceTypeId;

/// Errors that can occur while applying economy rules.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// Attempted to remove more of a resource than the balance holds.
    #[error("insufficient resource: wanted {requested} of {resource} but only have {available}")]
    InsufficientResource {
        /// The resource being removed.
        resource: ResourceTypeId,
        /// The quantity the caller attempted to remove.
        requested: u64,
        /// The quantity actually held.
        available: u64,
    },

    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// An economy tuning value is out of range.
    #[error("invalid economy config: {0}")]
    InvalidConfig(String),
}
