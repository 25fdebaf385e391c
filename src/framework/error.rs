//! # Framework Errors
//!
//! Every fallible operation in the crate returns [`ResourceError`]. Remote validation
//! failures are *not* errors: `save` folds them into the instance's
//! [`Errors`](crate::framework::Errors) and reports `false`.

use crate::framework::association::RelationKind;

/// Errors raised by association resolution, persistence and transport.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// A `:token` in a path template, or a required id / foreign key, has no value yet.
    ///
    /// The resolver treats this as "not yet fetchable" and never surfaces it from a getter.
    #[error("Unresolved path token: {token}")]
    UnresolvedToken { token: String },

    /// A `foreign_key` was declared on a relation kind that cannot use one.
    #[error("Association {association} is {kind}; foreign_key only applies to many-to-one")]
    MissingForeignKey {
        association: String,
        kind: RelationKind,
    },

    /// Access to a relation name that was never declared on the model.
    #[error("Unknown association {association} on {model}")]
    UnknownAssociation { model: String, association: String },

    /// A response matched the configured auth-exception signature.
    #[error("Authentication failed (status {status})")]
    Authentication { status: u16 },

    /// The remote service answered with a status the operation cannot use.
    #[error("Unexpected status {status} from {uri}")]
    Status { status: u16, uri: String },

    /// The operation needs an id but the instance has never been persisted.
    #[error("{model} has no id")]
    NewRecord { model: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-HTTP [`Connection`](crate::clients::Connection).
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ResourceError {
    /// True for the internal "not yet fetchable" condition.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ResourceError::UnresolvedToken { .. })
    }
}
