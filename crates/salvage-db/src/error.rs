//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors. [`GameError`] conversion lives here too: a guarded debit
//! that finds too little becomes a business rejection, everything else is
//! an infrastructure fault.

use salvage_core::{GameError, Rejection};
use salvage_types::{ResourceTypeId, Shortfall};

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A guarded debit found fewer units than requested.
    #[error("insufficient balance of {resource_type_id}: requested {requested}, available {available}")]
    InsufficientBalance {
        /// The resource being debited.
        resource_type_id: ResourceTypeId,
        /// Units requested.
        requested: u64,
        /// Units held.
        available: u64,
    },

    /// A stored value does not fit the domain type.
    #[error("invalid stored value for {field}: {value}")]
    InvalidData {
        /// Column that held the value.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// The shared harvest RNG was poisoned by a panicking holder.
    #[error("harvest RNG unavailable")]
    RngPoisoned,

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for GameError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InsufficientBalance {
                resource_type_id,
                requested,
                available,
            } => Self::Rejected(Rejection::InsufficientResources {
                shortfalls: vec![Shortfall {
                    resource_type_id,
                    required: requested,
                    available,
                }],
            }),
            other => Self::Infrastructure(other.to_string()),
        }
    }
}

/// Read a non-negative `BIGINT` column as `u64`.
pub(crate) fn to_u64(field: &'static str, value: i64) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::InvalidData {
        field,
        value: value.to_string(),
    })
}

/// Prepare a `u64` for a `BIGINT` column.
pub(crate) fn to_i64(field: &'static str, value: u64) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|_| DbError::InvalidData {
        field,
        value: value.to_string(),
    })
}

/// Read a non-negative `INTEGER` column as `u32`.
pub(crate) fn to_u32(field: &'static str, value: i32) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|_| DbError::InvalidData {
        field,
        value: value.to_string(),
    })
}

/// Prepare a `u32` for an `INTEGER` column.
pub(crate) fn to_i32(field: &'static str, value: u32) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::InvalidData {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_reject_out_of_range() {
        assert!(to_u64("quantity", -1).is_err());
        assert_eq!(to_u64("quantity", 7).ok(), Some(7));
        assert!(to_i64("quantity", u64::MAX).is_err());
        assert!(to_u32("tier", -3).is_err());
        assert!(to_i32("tier", u32::MAX).is_err());
    }

    #[test]
    fn insufficient_balance_is_a_rejection() {
        let err: GameError = DbError::InsufficientBalance {
            resource_type_id: ResourceTypeId::new(),
            requested: 20,
            available: 3,
        }
        .into();
        assert!(matches!(
            err,
            GameError::Rejected(Rejection::InsufficientResources { .. })
        ));
    }

    #[test]
    fn other_errors_are_infrastructure() {
        let err: GameError = DbError::Config("bad url".to_owned()).into();
        assert!(matches!(err, GameError::Infrastructure(_)));
    }
}
