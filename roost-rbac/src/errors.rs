use roost_core::{ErrorKind, RoostError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionParseError {
    #[error("unknown verb `{0}`")]
    UnknownVerb(String),
    #[error("unknown scope `{0}`")]
    UnknownScope(String),
}

/// Failures while building a grant table. All of them abort startup.
#[derive(Debug, Error)]
pub enum GrantLoadError {
    #[error("failed to read grant file `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("grant file `{path}` is not valid JSON")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("role `{role}`: {what} must be a JSON object")]
    NotAnObject { role: String, what: String },

    #[error("role `{role}`, resource `{resource}`: attributes of `{key}` must be an array of strings")]
    InvalidAttributes {
        role: String,
        resource: String,
        key: String,
    },

    #[error("role `{role}`, resource `{resource}`: invalid permission key `{key}`")]
    InvalidPermission {
        role: String,
        resource: String,
        key: String,
        #[source]
        source: PermissionParseError,
    },

    #[error("role `{role}`, resource `{resource}`: verb `{verb}` is declared more than once")]
    DuplicateVerb {
        role: String,
        resource: String,
        verb: String,
    },

    #[error("role `{0}` is defined twice")]
    DuplicateRole(String),

    #[error("grants directory `{0}` does not exist or is not a directory")]
    MissingDirectory(String),
}

/// Outcome of a denied authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RbacError {
    #[error("role `{0}` is not configured")]
    InvalidRole(String),

    #[error("role `{role}` has no grants on `{resource}`")]
    ForbiddenResource { role: String, resource: String },

    #[error("role `{role}` may not `{action}` on `{resource}`")]
    Forbidden {
        role: String,
        resource: String,
        action: String,
    },

    #[error("record owned by hotel `{owner}` is outside the caller's scope")]
    OutOfScope { owner: String },
}

impl From<RbacError> for RoostError {
    fn from(err: RbacError) -> Self {
        let kind = match &err {
            RbacError::InvalidRole(_) => ErrorKind::InvalidRole,
            RbacError::ForbiddenResource { .. } => ErrorKind::ForbiddenResource,
            RbacError::Forbidden { .. } | RbacError::OutOfScope { .. } => ErrorKind::Forbidden,
        };
        RoostError::of(kind).with_source(err)
    }
}
