// SPDX-FileCopyrightText: 2026 pkgmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for pkgmux.
//!
//! Every error carries a classification ([`ErrorCode`]) so that a failure
//! reported by a backend plugin keeps its code when it is re-signaled to the
//! caller with added context.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// What a failed plugin call was about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendTarget {
    /// A single package, by identifier.
    Package(String),
    /// A listing over a cluster and namespace.
    Context { cluster: String, namespace: String },
}

impl std::fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Package(identifier) => write!(f, "the package {identifier:?}"),
            Self::Context { cluster, namespace } => {
                write!(f, "the context \"{cluster}/{namespace}\"")
            }
        }
    }
}

/// Classification of a failure, independent of the message text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Unauthenticated,
    FailedPrecondition,
    Unavailable,
    Unimplemented,
    Cancelled,
    DeadlineExceeded,
    Internal,
    Unknown,
}

/// The primary error type used by the plugin contract and the core.
#[derive(Debug, Error)]
pub enum PkgmuxError {
    /// The caller's request is malformed or misses a required field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The plugin named in a request is not part of the registry snapshot.
    #[error("unable to get the plugin {name:?}")]
    PluginNotFound { name: String },

    /// A classified failure reported by a plugin.
    #[error("{code}: {message}")]
    Status { code: ErrorCode, message: String },

    /// A plugin call failed; the source keeps the plugin's classification.
    #[error("unable to {operation} for {target} using the plugin {plugin:?}: {source}")]
    Backend {
        operation: &'static str,
        target: BackendTarget,
        plugin: String,
        #[source]
        source: Box<PkgmuxError>,
    },

    /// A plugin response does not satisfy the minimal shape of its operation.
    #[error("invalid {operation} response from the plugin {plugin:?}: {detail}")]
    ContractViolation {
        operation: &'static str,
        plugin: String,
        detail: String,
    },

    /// A plugin echoed pagination state that does not match the tracked offset.
    #[error("inconsistent item offset from the plugin {plugin:?}: got {got:?}, expected {expected}")]
    Inconsistency {
        plugin: String,
        got: String,
        expected: u64,
    },

    /// A page token could not be parsed.
    #[error("invalid page token {token:?}: {reason}")]
    InvalidPageToken { token: String, reason: String },

    /// The call was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// The call exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Configuration or bootstrap errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PkgmuxError {
    /// Build a classified error, as a plugin would report it.
    pub fn status(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::status(ErrorCode::NotFound, message)
    }

    /// The classification of this error.
    ///
    /// Wrapped backend errors report the code of the error they wrap.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) | Self::InvalidPageToken { .. } => ErrorCode::InvalidArgument,
            Self::Status { code, .. } => *code,
            Self::Backend { source, .. } => source.code(),
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Timeout { .. } => ErrorCode::DeadlineExceeded,
            Self::PluginNotFound { .. }
            | Self::ContractViolation { .. }
            | Self::Inconsistency { .. }
            | Self::Config(_)
            | Self::Internal(_) => ErrorCode::Internal,
        }
    }
}
