use std::sync::Arc;

use async_graphql::{Error, ErrorExtensions};
use hr::HrError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("login required")]
    Unauthenticated,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("{0}")]
    Unavailable(String),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::Unavailable(_) => "UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

impl From<DbErr> for ApiError {
    fn from(value: DbErr) -> Self {
        Self::internal(value.into())
    }
}

/// Collaborator failures keep their headline but hide the underlying cause.
impl From<HrError> for ApiError {
    fn from(value: HrError) -> Self {
        tracing::warn!(error = ?value, "hr lookup failed");
        Self::Unavailable(value.to_string())
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        if let ApiError::Internal(cause) = self {
            tracing::error!(error = %cause, "internal error");
        }
        Error::new(self.to_string()).extend_with(|_err, e| e.set("code", self.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;

    fn code_of(err: &Error) -> Option<Value> {
        err.extensions
            .as_ref()
            .and_then(|map| map.get("code"))
            .cloned()
    }

    #[test]
    fn internal_errors_are_masked() {
        let err = ApiError::internal(anyhow::anyhow!("boom")).extend();
        assert_eq!(err.message, "internal server error");
        assert_eq!(code_of(&err), Some(Value::from("INTERNAL")));
    }

    #[test]
    fn hr_failures_map_to_unavailable() {
        let err = ApiError::from(HrError::EmployeeUnavailable {
            id: 3,
            source: anyhow::anyhow!("connection reset"),
        })
        .extend();
        assert_eq!(err.message, "employee 3 unavailable");
        assert_eq!(code_of(&err), Some(Value::from("UNAVAILABLE")));
    }
}
