use diesel::result::{DatabaseErrorKind, Error as DieselError};

use spark_shared::errors::{AppError, ErrorCode};

/// What a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Match,
    User,
    /// A row the statement expected to exist, other than a user or a match.
    Record,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Match => write!(f, "match"),
            Resource::User => write!(f, "user"),
            Resource::Record => write!(f, "record"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    /// Malformed or self-referential identifier, rejected before any query.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The caller is not a party to the relation being queried.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("{0} not found")]
    NotFound(Resource),

    /// Transient storage failure.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored row or statement that can never succeed as written.
    #[error("internal relations error: {0}")]
    Internal(String),
}

impl RelationError {
    /// Whether repeating the same call may succeed. Only meaningful for reads and
    /// for the idempotent writes (`block`, `create_match`).
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelationError::StorageUnavailable(_))
    }
}

impl From<DieselError> for RelationError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RelationError::NotFound(Resource::Record),
            // Every foreign key in the schema points at `users`.
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                RelationError::NotFound(Resource::User)
            }
            DieselError::DatabaseError(
                kind @ (DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::CheckViolation
                | DatabaseErrorKind::NotNullViolation),
                info,
            ) => {
                tracing::warn!(?kind, error = %info.message(), "relations write rejected by constraint");
                RelationError::InvalidIdentifier(format!(
                    "rejected by constraint {}",
                    info.constraint_name().unwrap_or("unknown")
                ))
            }
            DieselError::DatabaseError(_, info) => RelationError::StorageUnavailable(info.message().to_string()),
            DieselError::BrokenTransactionManager => {
                RelationError::StorageUnavailable("broken transaction manager".into())
            }
            other => RelationError::Internal(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for RelationError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RelationError::StorageUnavailable(err.to_string())
    }
}

impl From<RelationError> for AppError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::InvalidIdentifier(msg) => {
                AppError::new(ErrorCode::InvalidIdentifier, format!("invalid identifier: {msg}"))
            }
            RelationError::NotAuthorized(msg) => AppError::new(ErrorCode::NotRelationParticipant, msg),
            RelationError::NotFound(Resource::Match) => AppError::new(ErrorCode::MatchNotFound, "match not found"),
            RelationError::NotFound(Resource::User) => AppError::new(ErrorCode::ProfileNotFound, "profile not found"),
            RelationError::NotFound(Resource::Record) => AppError::new(ErrorCode::NotFound, "record not found"),
            RelationError::StorageUnavailable(msg) => {
                tracing::error!(error = %msg, "relations storage unavailable");
                AppError::unavailable("storage unavailable")
            }
            RelationError::Internal(msg) => {
                tracing::error!(error = %msg, "relations internal error");
                AppError::internal("internal server error")
            }
        }
    }
}

pub type RelationResult<T> = Result<T, RelationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_failures_are_retryable() {
        assert!(RelationError::StorageUnavailable("timeout".into()).is_retryable());
        assert!(!RelationError::InvalidIdentifier("0".into()).is_retryable());
        assert!(!RelationError::NotAuthorized("viewer".into()).is_retryable());
        assert!(!RelationError::NotFound(Resource::Match).is_retryable());
    }

    fn db_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_string()))
    }

    #[test]
    fn connection_failures_are_storage_unavailable() {
        for err in [
            DieselError::BrokenTransactionManager,
            db_error(DatabaseErrorKind::ClosedConnection, "server closed the connection"),
            db_error(DatabaseErrorKind::UnableToSendCommand, "broken pipe"),
            db_error(DatabaseErrorKind::SerializationFailure, "could not serialize access"),
        ] {
            let err = RelationError::from(err);
            assert!(matches!(err, RelationError::StorageUnavailable(_)), "{err:?}");
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn missing_referenced_user_is_not_found() {
        let err = RelationError::from(db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "insert or update on table \"matches\" violates foreign key",
        ));
        assert!(matches!(err, RelationError::NotFound(Resource::User)));
        assert!(!err.is_retryable());
        assert_eq!(AppError::from(err).error_code(), ErrorCode::ProfileNotFound);
    }

    #[test]
    fn missing_row_is_not_found() {
        let err = RelationError::from(DieselError::NotFound);
        assert!(matches!(err, RelationError::NotFound(Resource::Record)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn constraint_violations_are_not_retryable() {
        for kind in [
            DatabaseErrorKind::UniqueViolation,
            DatabaseErrorKind::CheckViolation,
            DatabaseErrorKind::NotNullViolation,
        ] {
            let err = RelationError::from(db_error(kind, "violates constraint"));
            assert!(matches!(err, RelationError::InvalidIdentifier(_)), "{err:?}");
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn query_bugs_are_internal() {
        let err = RelationError::from(DieselError::RollbackTransaction);
        assert!(matches!(err, RelationError::Internal(_)));
        assert!(!err.is_retryable());
        assert_eq!(AppError::from(err).error_code(), ErrorCode::InternalError);
    }

    #[test]
    fn maps_onto_service_error_codes() {
        let cases = [
            (RelationError::InvalidIdentifier("-1".into()), ErrorCode::InvalidIdentifier),
            (RelationError::NotAuthorized("no".into()), ErrorCode::NotRelationParticipant),
            (RelationError::NotFound(Resource::Match), ErrorCode::MatchNotFound),
            (RelationError::NotFound(Resource::User), ErrorCode::ProfileNotFound),
            (RelationError::NotFound(Resource::Record), ErrorCode::NotFound),
            (RelationError::StorageUnavailable("down".into()), ErrorCode::ServiceUnavailable),
            (RelationError::Internal("bad row".into()), ErrorCode::InternalError),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).error_code(), expected);
        }
    }

    #[test]
    fn storage_detail_is_not_exposed() {
        let app = AppError::from(RelationError::StorageUnavailable("password=hunter2".into()));
        assert!(!app.to_string().contains("hunter2"));
    }
}
