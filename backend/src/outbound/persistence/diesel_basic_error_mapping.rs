//! Translation of pool and Diesel failures into repository errors.

use tracing::debug;

use super::pool::PoolError;
use crate::domain::ports::EmployeeRepositoryError;

/// Pool failures mean the store could not be reached.
pub(crate) fn map_pool_error(error: PoolError) -> EmployeeRepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    EmployeeRepositoryError::connection(message)
}

/// Lost connections count as connection failures and serialization
/// conflicts as retryable query failures. Any other database error, and any
/// statement that cannot be built or decoded, is a rejection that no retry
/// would fix. Database messages are logged at `debug` and never surfaced.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> EmployeeRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        ) => EmployeeRepositoryError::connection("database connection error"),
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            EmployeeRepositoryError::query("serialization conflict")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            EmployeeRepositoryError::rejected("duplicate employee record")
        }
        DieselError::DatabaseError(_, _) => {
            EmployeeRepositoryError::rejected("statement violates a store constraint")
        }
        DieselError::QueryBuilderError(_) | DieselError::SerializationError(_) => {
            EmployeeRepositoryError::rejected("database query error")
        }
        DieselError::DeserializationError(_) => {
            EmployeeRepositoryError::rejected("stored employee could not be decoded")
        }
        _ => EmployeeRepositoryError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resilience::TransientError;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    #[case(PoolError::checkout("timed out"))]
    #[case(PoolError::build("bad url"))]
    fn pool_errors_become_connection_errors(#[case] error: PoolError) {
        assert!(matches!(
            map_pool_error(error),
            EmployeeRepositoryError::Connection { .. }
        ));
    }

    #[rstest]
    #[case(DatabaseErrorKind::ClosedConnection)]
    #[case(DatabaseErrorKind::UnableToSendCommand)]
    fn lost_connections_are_connection_errors(#[case] kind: DatabaseErrorKind) {
        let error = DieselError::DatabaseError(kind, Box::new("server closed the connection".to_owned()));
        assert_eq!(
            map_diesel_error(error),
            EmployeeRepositoryError::connection("database connection error")
        );
    }

    #[rstest]
    #[case(DieselError::NotFound, "database error")]
    #[case(DieselError::RollbackTransaction, "database error")]
    #[case(
        DieselError::DatabaseError(
            DatabaseErrorKind::SerializationFailure,
            Box::new("could not serialize access".to_owned())
        ),
        "serialization conflict"
    )]
    fn retryable_failures_are_query_errors(#[case] error: DieselError, #[case] message: &str) {
        let mapped = map_diesel_error(error);
        assert!(mapped.is_transient());
        assert_eq!(mapped, EmployeeRepositoryError::query(message));
    }

    #[rstest]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new("dup".to_owned())),
        "duplicate employee record"
    )]
    #[case(
        DieselError::DatabaseError(
            DatabaseErrorKind::Unknown,
            Box::new("value too long for type character varying(255)".to_owned())
        ),
        "statement violates a store constraint"
    )]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, Box::new("salario".to_owned())),
        "statement violates a store constraint"
    )]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, Box::new("puesto".to_owned())),
        "statement violates a store constraint"
    )]
    fn refused_statements_are_not_retried(#[case] error: DieselError, #[case] message: &str) {
        let mapped = map_diesel_error(error);
        assert!(!mapped.is_transient());
        assert_eq!(mapped, EmployeeRepositoryError::rejected(message));
    }
}
