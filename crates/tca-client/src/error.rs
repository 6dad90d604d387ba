//! TCA client errors
//!
//! Every failure surfaced by the library is a variant of [`TcaError`]. Variants carry
//! the inputs that produced them so the rendered message always names the offending
//! entity.

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TcaError>;

/// Entity families the resolver and transport can fail to find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Cluster,
    NodePool,
    ClusterTemplate,
    Vim,
    Catalog,
    Vdu,
    Repository,
    Extension,
    Instance,
    Task,
    VmTemplate,
    /// Generic HTTP 404 on a path
    Resource,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Cluster => "cluster",
            EntityKind::NodePool => "node pool",
            EntityKind::ClusterTemplate => "cluster template",
            EntityKind::Vim => "vim",
            EntityKind::Catalog => "catalog entry",
            EntityKind::Vdu => "vdu",
            EntityKind::Repository => "repository",
            EntityKind::Extension => "extension",
            EntityKind::Instance => "instance",
            EntityKind::Task => "task",
            EntityKind::VmTemplate => "vm template",
            EntityKind::Resource => "resource",
        };
        f.write_str(s)
    }
}

/// A near-miss candidate reported alongside a `NotFound` error.
///
/// The score is a Jaro-Winkler similarity in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub name: String,
    pub score: f64,
}

/// Ranked near-miss candidates, rendered as a "did you mean" suffix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions(pub Vec<FuzzyMatch>);

impl Suggestions {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FuzzyMatch> {
        self.0.iter()
    }
}

impl fmt::Display for Suggestions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|m| format!("{} ({:.2})", m.name, m.score))
            .collect();
        write!(f, " (did you mean: {})", rendered.join(", "))
    }
}

/// Errors that can occur when talking to TCA or preparing a request for it
#[derive(Debug, Error)]
pub enum TcaError {
    /// Session could not be established
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Name or identifier did not resolve, or the server answered 404
    #[error("{kind} not found: {query}{suggestions}")]
    NotFound {
        kind: EntityKind,
        query: String,
        suggestions: Suggestions,
    },

    /// Server returned a non-2xx status other than 404
    #[error("server rejected request to {path} (status {status}): {}", .messages.join("; "))]
    ServerRejected {
        messages: Vec<String>,
        path: String,
        status: u16,
    },

    /// Spec failed structural or cross-reference validation
    #[error("invalid spec: {reason}")]
    InvalidSpec { reason: String },

    #[error("cluster template type mismatch: expected {expected}, template is {actual}")]
    TemplateTypeMismatch { expected: String, actual: String },

    /// Operation requires a VMware VIM
    #[error("unsupported vim {name}: operation requires a VC vim")]
    UnsupportedVim { name: String },

    #[error("cloud provider not found: {name}")]
    CloudProviderNotFound { name: String },

    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// A task (or one of its children) reached FAILED
    #[error("task failed during {phase}: {message}")]
    TaskFailed { phase: String, message: String },

    /// Caller tripped the cancellation token
    #[error("operation cancelled")]
    TaskCancelled,

    /// CNF lifecycle operation landed in FAILED_TEMP
    #[error("lcm operation {operation} failed for instance {instance}")]
    LcmFailed { instance: String, operation: String },

    /// Wait budget exhausted
    #[error("deadline exceeded after {attempts} attempts")]
    DeadlineExceeded { attempts: u32 },

    /// Synthetic failure injected by the transport test hook
    #[error("simulated failure for {path}")]
    SimulatedFailure { path: String },

    /// One of the concurrent inventory queries failed
    #[error("inventory unavailable for vim {vim}: {reason}")]
    InventoryUnavailable { vim: String, reason: String },

    #[error("network not found in inventory: {name}")]
    NetworkNotFound { name: String },

    /// HTTP request/response error
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TcaError {
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        TcaError::InvalidSpec {
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: EntityKind, query: impl Into<String>) -> Self {
        TcaError::NotFound {
            kind,
            query: query.into(),
            suggestions: Suggestions::none(),
        }
    }

    /// True when the error is a `NotFound` of the given kind
    pub fn is_not_found(&self, kind: EntityKind) -> bool {
        matches!(self, TcaError::NotFound { kind: k, .. } if *k == kind)
    }

    /// Process exit code for the CLI, one per variant family
    pub fn exit_code(&self) -> i32 {
        match self {
            TcaError::AuthFailed(_) => 2,
            TcaError::NotFound { .. } => 3,
            TcaError::ServerRejected { .. } => 4,
            TcaError::InvalidSpec { .. } => 5,
            TcaError::TemplateTypeMismatch { .. } => 6,
            TcaError::UnsupportedVim { .. } => 7,
            TcaError::CloudProviderNotFound { .. } => 8,
            TcaError::TaskNotFound { .. } => 9,
            TcaError::TaskFailed { .. } => 10,
            TcaError::TaskCancelled => 11,
            TcaError::LcmFailed { .. } => 12,
            TcaError::DeadlineExceeded { .. } => 13,
            TcaError::SimulatedFailure { .. } => 14,
            TcaError::Transport(_) => 15,
            TcaError::InventoryUnavailable { .. } => 16,
            TcaError::NetworkNotFound { .. } => 17,
            TcaError::Serialization(_) | TcaError::Yaml(_) => 18,
            TcaError::Io { .. } => 19,
        }
    }
}
