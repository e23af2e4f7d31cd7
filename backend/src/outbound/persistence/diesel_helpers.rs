//! Shared error classification for the Diesel repositories.
//!
//! Each repository maps a [`DieselFailure`] onto its own port error so
//! unique-constraint violations surface as domain conflicts instead of
//! opaque query failures.

use tracing::debug;

use super::pool::PoolError;

/// Coarse classification of a Diesel error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Anything else.
    Query(String),
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error and emit debug context for `operation`.
pub(crate) fn classify(error: diesel::result::Error, operation: &str) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        other => debug!(error = %other, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error".to_owned()),
        _ => DieselFailure::Query("database error".to_owned()),
    }
}

/// Convert stored rows, reporting the first row that no longer validates.
pub(crate) fn collect_rows<R, T, E>(
    rows: Vec<R>,
    convert: impl Fn(R) -> Result<T, String>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    rows.into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct Info(Option<&'static str>);

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[rstest]
    fn unique_violations_keep_the_constraint_name() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Info(Some("users_username_key"))),
        );
        assert_eq!(
            classify(error, "insert user"),
            DieselFailure::UniqueViolation {
                constraint: Some("users_username_key".to_owned())
            }
        );
    }

    #[rstest]
    fn closed_connections_are_connection_failures() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new(Info(None)),
        );
        assert!(matches!(classify(error, "load"), DieselFailure::Connection(_)));
    }

    #[rstest]
    fn other_errors_are_query_failures() {
        assert_eq!(
            classify(DieselError::NotFound, "load"),
            DieselFailure::Query("record not found".to_owned())
        );
    }

    #[rstest]
    fn pool_messages_are_unwrapped() {
        assert_eq!(pool_message(PoolError::checkout("timed out")), "timed out");
    }

    #[rstest]
    fn collect_rows_reports_first_failure() {
        let result: Result<Vec<u8>, String> = collect_rows(
            vec!["1", "x", "y"],
            |raw| raw.parse::<u8>().map_err(|_| format!("bad row {raw}")),
            |message| message,
        );
        assert_eq!(result, Err("bad row x".to_owned()));
    }
}
