//! Shared error helpers for Diesel repository implementations.

use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Extract a readable message from a Diesel error and emit debug context.
pub fn map_diesel_error_message(error: diesel::result::Error, operation: &str) -> String {
    let error_message = format!("{operation}: {error}");
    debug!(%error_message, %operation, "diesel operation failed");
    error_message
}

/// Whether a Diesel error means the connection itself went away.
pub fn is_connection_error(error: &diesel::result::Error) -> bool {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
            | DieselError::BrokenTransactionManager
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn diesel_messages_carry_the_operation() {
        let message = map_diesel_error_message(diesel::result::Error::NotFound, "load zone");
        assert_eq!(message, "load zone: Record not found");
    }

    #[rstest]
    fn pool_messages_are_unwrapped() {
        assert_eq!(
            map_pool_error_message(PoolError::Checkout {
                message: "timed out".to_owned(),
            }),
            "timed out"
        );
    }

    #[rstest]
    fn not_found_is_not_a_connection_error() {
        assert!(!is_connection_error(&diesel::result::Error::NotFound));
        assert!(is_connection_error(
            &diesel::result::Error::BrokenTransactionManager
        ));
    }
}
