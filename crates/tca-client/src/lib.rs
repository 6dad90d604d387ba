//! Telco Cloud Automation REST API Client
//!
//! A Rust client library for driving a VMware Telco Cloud Automation (TCA) service:
//! Kubernetes management and workload clusters, node pools, CNF catalog entries and
//! CNF lifecycle operations across registered VIMs.
//!
//! # Example
//!
//! ```no_run
//! use tca_client::{CancellationToken, ClientConfig, ClusterOrchestrator, TaskWaiter, TcaClient, TcaClientTrait, TaskStatus};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://tca.example", "admin", "secret").allow_self_signed(true);
//! let client = TcaClient::new(config)?;
//! let cancel = CancellationToken::new();
//!
//! // Establish a session
//! client.authenticate(&cancel).await?;
//!
//! // Parse and submit a cluster spec, then block until its task tree completes
//! let spec = tca_client::spec::read_spec_file("mgmt1.yaml")?;
//! let orchestrator = ClusterOrchestrator::new(&client);
//! let handle = orchestrator.create_cluster(spec, &cancel).await?;
//! TaskWaiter::new(&client)
//!     .wait_task_tree(&handle, TaskStatus::Success, 360, false, &cancel)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Spec Codec**: JSON/YAML specs with `kind` dispatch and structural checks
//! - **Validation**: placement, network, CSI and harbor references checked against live inventory
//! - **Name Resolution**: names or ids for every entity, with ranked suggestions on a miss
//! - **Lifecycle**: cluster, node pool and CNF operations guarded by server policy links
//! - **Task Waiting**: fixed-cadence polling with cancellation

pub mod catalog;
pub mod client;
pub mod cluster;
pub mod common;
pub mod error;
pub mod inventory;
pub mod lcm;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod spec;
#[path = "trait.rs"]
pub mod tca_trait;
pub mod validator;
pub mod waiter;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
#[cfg(test)]
mod test_utils;

pub use catalog::CatalogRegistry;
pub use client::TcaClient;
pub use cluster::ClusterOrchestrator;
pub use common::{ClientConfig, HttpTransport};
pub use error::{EntityKind, Result, TcaError};
pub use inventory::InventorySnapshot;
pub use lcm::LcmEngine;
pub use models::*;
pub use provider::VimRegistry;
pub use resolver::Resolver;
pub use spec::{AnySpec, SpecFormat, StructuralValidation};
pub use tca_trait::TcaClientTrait;
pub use tokio_util::sync::CancellationToken;
pub use validator::SpecValidator;
pub use waiter::TaskWaiter;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockCall, MockInventory, MockTcaClient};
