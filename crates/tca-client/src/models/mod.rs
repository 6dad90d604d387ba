//! TCA API models
//!
//! These models match the JSON bodies exchanged with the TCA hybridity and telco
//! endpoints. Types that double as declarative specs (cluster, node pool, template,
//! instance, provider, extension) carry an optional `kind` discriminator and a
//! passthrough map so unknown fields survive a parse/serialize round trip.

mod catalog;
mod cluster;
mod extension;
mod inventory;
mod lcm;
mod nodepool;
mod task;
mod template;
mod vim;

pub use catalog::*;
pub use cluster::*;
pub use extension::*;
pub use inventory::*;
pub use lcm::*;
pub use nodepool::*;
pub use task::*;
pub use template::*;
pub use vim::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator carried by every spec document in its top-level `kind` field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    Provider,
    Extensions,
    NodePool,
    Cluster,
    Template,
    Instance,
}

impl SpecKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecKind::Provider => "provider",
            SpecKind::Extensions => "extensions",
            SpecKind::NodePool => "node_pool",
            SpecKind::Cluster => "cluster",
            SpecKind::Template => "template",
            SpecKind::Instance => "instance",
        }
    }

    /// Parse a raw `kind` value
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "provider" => Some(SpecKind::Provider),
            "extensions" | "extension" => Some(SpecKind::Extensions),
            "node_pool" | "nodepool" => Some(SpecKind::NodePool),
            "cluster" => Some(SpecKind::Cluster),
            "template" => Some(SpecKind::Template),
            "instance" => Some(SpecKind::Instance),
            _ => None,
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic `{"items": [...]}` envelope used by most hybridity list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// List body that is either a bare array or an `items` envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Plain(Vec<T>),
    Items(ItemsResponse<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Plain(items) => items,
            ListEnvelope::Items(envelope) => envelope.items,
        }
    }
}

/// Identifier-shaped check: 36 characters in 8-4-4-4-12 hyphenated hex.
///
/// Anything else is treated as a name by the resolver.
pub fn is_well_formed_id(value: &str) -> bool {
    value.len() == 36 && uuid::Uuid::try_parse(value).is_ok()
}
