//! # Reconcile Errors
//!
//! Two layers of errors live here. [`ApiError`] is what the vendor SDK contract
//! ([`ErsApi`](crate::api::ErsApi)) reports for a single remote call.
//! [`ReconcileError`] is what the create/read/update/delete entry points surface
//! to the caller once the protocol has decided a failure is fatal.

use crate::handle::HandleError;
use crate::schema::SchemaError;

/// Errors reported by a single remote call.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("remote object not found")]
    NotFound,
    #[error("remote returned status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: Option<String>,
    },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("remote client closed")]
    Closed,
}

impl ApiError {
    /// Raw response body, when the remote sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::Status { status: 404, .. })
    }
}

/// Remote operation that failed, used in [`ReconcileError::Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Resolve,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Resolve => "resolve",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the reconcile entry points.
///
/// # Propagation
/// Existence-probe failures never reach the caller during create (they are
/// logged and treated as "not found"). Mutating calls that fail always end up
/// here as [`ReconcileError::Transport`], with the raw response body attached.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("{kind} {op} failed: {source}{}", body_suffix(.source))]
    Transport {
        kind: &'static str,
        op: Operation,
        #[source]
        source: ApiError,
    },

    #[error("{kind}: no lookup strategy satisfied by the supplied fields {supplied:?}")]
    AmbiguousIdentity {
        kind: &'static str,
        supplied: Vec<String>,
    },

    #[error("{kind}: invalid configuration: {source}")]
    Validation {
        kind: &'static str,
        #[source]
        source: SchemaError,
    },

    #[error("{kind}: {source}")]
    Handle {
        kind: &'static str,
        #[source]
        source: HandleError,
    },

    #[error("{kind}: remote did not return any identity field for the new object")]
    MissingIdentity { kind: &'static str },
}

impl ReconcileError {
    /// Raw remote response body attached to a transport failure.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Transport { source, .. } => source.body(),
            _ => None,
        }
    }
}

fn body_suffix(err: &ApiError) -> String {
    match err.body() {
        Some(body) if !body.is_empty() => format!(" (response body: {body})"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display_carries_body() {
        let err = ReconcileError::Transport {
            kind: "ise_internal_user",
            op: Operation::Create,
            source: ApiError::Status {
                status: 400,
                message: "Bad Request".into(),
                body: Some(r#"{"message":"password policy"}"#.into()),
            },
        };
        let text = err.to_string();
        assert!(text.contains("ise_internal_user create failed"));
        assert!(text.contains("password policy"));
        assert_eq!(err.response_body(), Some(r#"{"message":"password policy"}"#));
    }

    #[test]
    fn operations_render_as_verbs() {
        let names: Vec<String> = [
            Operation::Create,
            Operation::Update,
            Operation::Delete,
            Operation::Resolve,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(names, ["create", "update", "delete", "resolve"]);
    }

    #[test]
    fn status_404_counts_as_not_found() {
        let err = ApiError::Status {
            status: 404,
            message: "Not Found".into(),
            body: None,
        };
        assert!(err.is_not_found());
        assert!(ApiError::NotFound.is_not_found());
        assert!(!ApiError::Transport("reset".into()).is_not_found());
    }
}
