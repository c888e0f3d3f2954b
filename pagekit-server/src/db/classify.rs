//! sqlx error classification
//!
//! The only place driver errors are inspected. Everything above the
//! repositories sees [`Error`] and its [`ErrorKind`](crate::error::ErrorKind).

use sqlx::error::DatabaseError;

use crate::error::Error;
use crate::models::ValidationError;

/// Postgres SQLSTATE codes this crate reacts to
mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const NOT_NULL_VIOLATION: &str = "23502";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const INVALID_TEXT_REPRESENTATION: &str = "22P02";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
    pub const QUERY_CANCELED: &str = "57014";
    pub const ADMIN_SHUTDOWN: &str = "57P01";
    pub const CANNOT_CONNECT_NOW: &str = "57P03";
    pub const TOO_MANY_CONNECTIONS: &str = "53300";
    /// Class 08: connection exceptions
    pub const CONNECTION_EXCEPTION_CLASS: &str = "08";
}

/// Human-readable rule for a unique constraint.
fn unique_rule(constraint: Option<&str>) -> String {
    match constraint {
        Some("stores_slug_key") => "store slug already exists".to_owned(),
        Some("pages_store_id_route_key") => "page route already exists for this store".to_owned(),
        Some("pages_one_home_per_store") => "store already has a home page".to_owned(),
        Some("widgets_page_id_position_key") => {
            "widget position already taken on this page".to_owned()
        }
        Some(other) => format!("unique constraint {other} violated"),
        None => "unique constraint violated".to_owned(),
    }
}

fn missing_parent(constraint: Option<&str>) -> Error {
    match constraint {
        Some("pages_store_id_fkey") => Error::not_found("store", "referenced by page"),
        Some("widgets_page_id_fkey") => Error::not_found("page", "referenced by widget"),
        _ => Error::not_found("referenced record", "unknown"),
    }
}

fn rejected_value(constraint: Option<&str>) -> ValidationError {
    match constraint {
        Some("widgets_type_check") => ValidationError::InvalidFormat {
            field: "widget type",
            reason: "must be one of: banner, product_grid, text, image, spacer",
        },
        Some("widgets_position_check") => ValidationError::InvalidFormat {
            field: "position",
            reason: "must not be negative",
        },
        _ => ValidationError::InvalidFormat {
            field: "request",
            reason: "rejected by storage constraint",
        },
    }
}

fn classify_database(db: &dyn DatabaseError) -> Error {
    let code = db.code();
    let constraint = db.constraint();

    match code.as_deref() {
        Some(sqlstate::UNIQUE_VIOLATION) => Error::conflict(unique_rule(constraint)),
        Some(sqlstate::FOREIGN_KEY_VIOLATION) => missing_parent(constraint),
        Some(
            sqlstate::CHECK_VIOLATION
            | sqlstate::NOT_NULL_VIOLATION
            | sqlstate::INVALID_TEXT_REPRESENTATION,
        ) => Error::Validation(rejected_value(constraint)),
        Some(sqlstate::QUERY_CANCELED) => Error::StatementTimeout(db.message().to_owned()),
        Some(
            sqlstate::SERIALIZATION_FAILURE
            | sqlstate::DEADLOCK_DETECTED
            | sqlstate::ADMIN_SHUTDOWN
            | sqlstate::CANNOT_CONNECT_NOW
            | sqlstate::TOO_MANY_CONNECTIONS,
        ) => Error::Unavailable(db.message().to_owned()),
        Some(code) if code.starts_with(sqlstate::CONNECTION_EXCEPTION_CLASS) => {
            Error::Unavailable(db.message().to_owned())
        }
        _ => Error::Internal(db.message().to_owned()),
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => classify_database(db.as_ref()),
            sqlx::Error::RowNotFound => Error::not_found("record", "unknown"),
            sqlx::Error::PoolTimedOut => {
                Error::Unavailable("timed out waiting for a database connection".to_owned())
            }
            sqlx::Error::PoolClosed => Error::Unavailable("connection pool closed".to_owned()),
            sqlx::Error::WorkerCrashed => {
                Error::Unavailable("database connection worker crashed".to_owned())
            }
            sqlx::Error::Io(e) => Error::Unavailable(format!("database i/o: {e}")),
            sqlx::Error::Tls(e) => Error::Unavailable(format!("database tls: {e}")),
            other => Error::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    /// Stand-in for a Postgres error response
    #[derive(Debug)]
    struct FakePgError {
        code: &'static str,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for FakePgError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake error {}", self.code)
        }
    }

    impl StdError for FakePgError {}

    impl DatabaseError for FakePgError {
        fn message(&self) -> &str {
            "fake postgres failure"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }
    }

    fn pg(code: &'static str, constraint: Option<&'static str>) -> Error {
        Error::from(sqlx::Error::Database(Box::new(FakePgError { code, constraint })))
    }

    #[test]
    fn unique_violations_name_the_rule() {
        let err = pg("23505", Some("pages_store_id_route_key"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "page route already exists for this store");

        let err = pg("23505", Some("stores_slug_key"));
        assert_eq!(err.to_string(), "store slug already exists");

        let err = pg("23505", Some("pages_one_home_per_store"));
        assert_eq!(err.to_string(), "store already has a home page");

        let err = pg("23505", Some("something_else"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("something_else"));
    }

    #[test]
    fn foreign_key_violation_is_missing_parent() {
        let err = pg("23503", Some("widgets_page_id_fkey"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "page not found");

        let err = pg("23503", Some("pages_store_id_fkey"));
        assert_eq!(err.to_string(), "store not found");
    }

    #[test]
    fn check_violation_is_validation() {
        let err = pg("23514", Some("widgets_type_check"));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("product_grid"));
    }

    #[test]
    fn contention_and_connectivity_are_transient() {
        for code in ["40001", "40P01", "57014", "53300", "08006", "08001"] {
            assert_eq!(pg(code, None).kind(), ErrorKind::Transient, "{code}");
        }
    }

    #[test]
    fn statement_timeout_is_reported_as_timeout() {
        let err = pg("57014", None);
        assert!(matches!(err, Error::StatementTimeout(_)));
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert_eq!(err.to_string(), "storage statement timed out: fake postgres failure");
    }

    #[test]
    fn unknown_database_errors_are_internal() {
        assert_eq!(pg("42P01", None).kind(), ErrorKind::Internal);
    }

    #[test]
    fn pool_errors_are_transient() {
        assert_eq!(Error::from(sqlx::Error::PoolTimedOut).kind(), ErrorKind::Transient);
        assert_eq!(Error::from(sqlx::Error::PoolClosed).kind(), ErrorKind::Transient);
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert_eq!(Error::from(sqlx::Error::Io(io)).kind(), ErrorKind::Transient);
    }

    #[test]
    fn decode_failures_are_internal() {
        let err = Error::from(sqlx::Error::ColumnNotFound("position".into()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
