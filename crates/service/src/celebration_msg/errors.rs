use thiserror::Error;

/// Errors surfaced by the celebration message workflows.
///
/// `Validation` is the only client-fault variant. Store failures carry the
/// operation, its identifying parameters and the underlying error text.
#[derive(Debug, Error)]
pub enum CelebrationMsgError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(String),
}

impl CelebrationMsgError {
    pub fn store(err: impl std::fmt::Display) -> Self { Self::Store(err.to_string()) }

    /// Prefix a store failure with the operation that hit it.
    /// Validation and not-found errors pass through unchanged.
    pub fn context(self, op: impl FnOnce() -> String) -> Self {
        match self {
            Self::Store(inner) => Self::Store(format!("{}: {}", op(), inner)),
            other => other,
        }
    }

    /// Whether the caller, not the system, is at fault.
    pub fn is_client_error(&self) -> bool { matches!(self, Self::Validation(_)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation(_) => 2001,
            Self::NotFound(_) => 2003,
            Self::Store(_) => 2200,
        }
    }
}

impl From<models::errors::ModelError> for CelebrationMsgError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => Self::Validation(msg),
            other => Self::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn context_only_wraps_store_failures() {
        let e = CelebrationMsgError::store("connection reset").context(|| "failed to load messages for user 3".into());
        assert_eq!(e.to_string(), "store error: failed to load messages for user 3: connection reset");

        let v = CelebrationMsgError::Validation("too many images".into()).context(|| "ignored".into());
        assert_eq!(v.to_string(), "validation failed: too many images");
    }

    #[test]
    fn model_errors_keep_their_class() {
        assert!(CelebrationMsgError::from(ModelError::Validation("name required".into())).is_client_error());
        let db: CelebrationMsgError = ModelError::Db("timeout".into()).into();
        assert!(!db.is_client_error());
        assert_eq!(db.code(), 2200);
        assert!(db.to_string().contains("timeout"));
    }
}
