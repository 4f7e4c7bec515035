//! Error types for salvo-sandboxes.

use std::fmt;
use thiserror::Error;

/// Result type alias for salvo-sandboxes operations.
pub type Result<T> = std::result::Result<T, SandboxError>;

/// Errors produced while decoding a build ID to IP address map.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not a JSON object of string lists.
    #[error("malformed build IP map: {0}")]
    Json(#[from] serde_json::Error),

    /// A key is not a base-10 integer.
    #[error("unable to convert build ID {key:?} to an integer: {source}")]
    InvalidKey {
        /// The offending key
        key: String,
        /// Integer parse failure
        source: std::num::ParseIntError,
    },

    /// A key parsed to zero or a negative number.
    #[error("parsed invalid build ID {0}, expected a positive integer")]
    NonPositiveId(i64),

    /// A build ID is present but lists no addresses.
    #[error("build ID {0} has no IP addresses")]
    NoAddresses(i64),

    /// A list entry is not an IPv4 or IPv6 address.
    #[error("in build ID {id}, unable to parse {value:?} as an IP address")]
    InvalidAddress {
        /// Build ID the address was listed under
        id: i64,
        /// The offending string
        value: String,
    },
}

/// The external tool stage an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    /// `terraform init` while starting sandboxes
    Init,
    /// `terraform apply` with the requested variables
    Apply,
    /// `terraform output`
    Output,
    /// `terraform init` while tearing down
    TeardownInit,
    /// `terraform apply` without variables
    TeardownApply,
}

impl fmt::Display for ToolStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Apply => write!(f, "apply"),
            Self::Output => write!(f, "output fetch"),
            Self::TeardownInit => write!(f, "teardown init"),
            Self::TeardownApply => write!(f, "teardown apply"),
        }
    }
}

/// Errors that can occur while starting, parsing or stopping sandboxes.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The sandbox request is malformed.
    #[error("invalid sandbox request: {0}")]
    Validation(String),

    /// A Terraform output variable holds an invalid build IP map.
    #[error("decoding Terraform output {variable:?}: {source}, raw json: {raw:?}")]
    Decode {
        /// Name of the Terraform output variable
        variable: String,
        /// Raw JSON payload of the variable
        raw: String,
        /// Underlying decode failure
        source: DecodeError,
    },

    /// The Terraform output does not describe the requested instances.
    #[error("parsing sandbox instances: {0}")]
    Parse(String),

    /// Terraform itself failed.
    #[error("{stage} failed: {message}")]
    Tool {
        /// Stage that failed
        stage: ToolStage,
        /// Message from the tool
        message: String,
    },

    /// An external command exited unsuccessfully.
    #[error("{0}")]
    Command(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SandboxError {
    /// Wrap a tool failure with the stage it happened in.
    pub fn tool(stage: ToolStage, err: impl fmt::Display) -> Self {
        Self::Tool {
            stage,
            message: err.to_string(),
        }
    }

    /// Check if this error was raised before any external call was made.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Config(_))
    }

    /// Check if this error came from the external tool.
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, Self::Tool { .. })
    }

    /// Stage of a tool failure, if this is one.
    pub fn stage(&self) -> Option<ToolStage> {
        match self {
            Self::Tool { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
