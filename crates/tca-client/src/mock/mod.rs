//! Mock TcaClient for unit testing
//!
//! This module provides an in-memory implementation of [`TcaClientTrait`] that can be
//! used in tests without a running TCA service. Every call is recorded with the
//! method and path the HTTP client would have used, so tests can assert on what
//! would have gone over the wire.
//!
//! The mock is organized into domain-specific modules:
//! - `vim.rs` - VIM tenants and per-VIM inventory
//! - `infra.rs` - clusters, node pools, cluster tasks and templates
//! - `lcm.rs` - catalog, extensions, repositories and CNF instances

mod infra;
mod lcm;
mod vim;

use crate::error::{EntityKind, Result, TcaError};
use crate::models::*;
use crate::tca_trait::TcaClientTrait;
use reqwest::Method;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub use lcm::policy_links;

/// A request the mock received, expressed as the HTTP call it stands for
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl MockCall {
    /// True for calls that change server state. Query endpoints that use POST are
    /// excluded.
    pub fn is_mutating(&self) -> bool {
        const QUERY_PATHS: [&str; 6] = [
            crate::common::paths::SESSIONS,
            crate::common::paths::CLUSTER_TASKS,
            crate::common::paths::REPOSITORIES_QUERY,
            crate::common::paths::NETWORKS,
            crate::common::paths::INVENTORY_CONTAINERS,
            crate::common::paths::VM_TEMPLATES,
        ];
        self.method != Method::GET && !QUERY_PATHS.contains(&self.path.as_str())
    }
}

/// Inventory served for one VIM
#[derive(Debug, Clone, Default)]
pub struct MockInventory {
    pub compute_clusters: Vec<InventoryContainer>,
    pub folders: Vec<InventoryContainer>,
    pub resource_pools: Vec<InventoryContainer>,
    pub networks: Vec<VimNetwork>,
    pub vm_templates: Vec<VmTemplate>,
}

/// Mock TcaClient for testing
///
/// Stores resources in memory. Task trees and LCM info can be scripted per poll so
/// waiter behavior is deterministic.
#[derive(Debug, Clone)]
pub struct MockTcaClient {
    pub(crate) base_url: String,
    pub(crate) calls: Arc<Mutex<Vec<MockCall>>>,
    pub(crate) failures: Arc<Mutex<Vec<String>>>,
    pub(crate) authenticated: Arc<Mutex<bool>>,
    // In-memory storage for resources
    pub(crate) vims: Arc<Mutex<Vec<VimTenant>>>,
    pub(crate) inventories: Arc<Mutex<HashMap<String, MockInventory>>>,
    pub(crate) clusters: Arc<Mutex<Vec<Cluster>>>,
    pub(crate) node_pools: Arc<Mutex<HashMap<String, Vec<NodePool>>>>,
    pub(crate) task_polls: Arc<Mutex<HashMap<String, VecDeque<Vec<ClusterTask>>>>>,
    pub(crate) templates: Arc<Mutex<Vec<ClusterTemplate>>>,
    pub(crate) extensions: Arc<Mutex<Vec<Extension>>>,
    pub(crate) repositories: Arc<Mutex<HashMap<String, Vec<Repository>>>>,
    pub(crate) packages: Arc<Mutex<Vec<VnfPackage>>>,
    pub(crate) descriptors: Arc<Mutex<HashMap<String, VnfDescriptor>>>,
    pub(crate) instances: Arc<Mutex<Vec<LcmInfo>>>,
    pub(crate) instance_polls: Arc<Mutex<HashMap<String, VecDeque<LcmInfo>>>>,
}

impl MockTcaClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
            authenticated: Arc::new(Mutex::new(false)),
            vims: Arc::new(Mutex::new(Vec::new())),
            inventories: Arc::new(Mutex::new(HashMap::new())),
            clusters: Arc::new(Mutex::new(Vec::new())),
            node_pools: Arc::new(Mutex::new(HashMap::new())),
            task_polls: Arc::new(Mutex::new(HashMap::new())),
            templates: Arc::new(Mutex::new(Vec::new())),
            extensions: Arc::new(Mutex::new(Vec::new())),
            repositories: Arc::new(Mutex::new(HashMap::new())),
            packages: Arc::new(Mutex::new(Vec::new())),
            descriptors: Arc::new(Mutex::new(HashMap::new())),
            instances: Arc::new(Mutex::new(Vec::new())),
            instance_polls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a VIM tenant (for test setup)
    pub fn add_vim(&self, tenant: VimTenant) {
        self.vims.lock().unwrap().push(tenant);
    }

    /// Serve `inventory` for `vim_id`; VIMs without one answer inventory queries with 404
    pub fn set_inventory(&self, vim_id: impl Into<String>, inventory: MockInventory) {
        self.inventories.lock().unwrap().insert(vim_id.into(), inventory);
    }

    /// Add a cluster (for test setup)
    pub fn add_cluster(&self, cluster: Cluster) {
        self.clusters.lock().unwrap().push(cluster);
    }

    /// Add a node pool to a cluster (for test setup)
    pub fn add_node_pool(&self, cluster_id: impl Into<String>, pool: NodePool) {
        self.node_pools
            .lock()
            .unwrap()
            .entry(cluster_id.into())
            .or_default()
            .push(pool);
    }

    /// Add a cluster template (for test setup)
    pub fn add_template(&self, template: ClusterTemplate) {
        self.templates.lock().unwrap().push(template);
    }

    /// Add an extension (for test setup)
    pub fn add_extension(&self, extension: Extension) {
        self.extensions.lock().unwrap().push(extension);
    }

    /// Link a repository to a VIM (for test setup)
    pub fn add_repository(&self, vim_id: impl Into<String>, repo: Repository) {
        self.repositories
            .lock()
            .unwrap()
            .entry(vim_id.into())
            .or_default()
            .push(repo);
    }

    /// Add a catalog package and optionally its descriptor (for test setup)
    pub fn add_package(&self, package: VnfPackage, descriptor: Option<VnfDescriptor>) {
        if let Some(descriptor) = descriptor {
            self.descriptors
                .lock()
                .unwrap()
                .insert(package.id.clone(), descriptor);
        }
        self.packages.lock().unwrap().push(package);
    }

    /// Add a CNF instance (for test setup)
    pub fn add_instance(&self, info: LcmInfo) {
        self.instances.lock().unwrap().push(info);
    }

    /// Script successive task-query responses for an operation, task or cluster id.
    /// The last response repeats once the script is exhausted.
    pub fn script_task_polls(&self, key: impl Into<String>, polls: Vec<Vec<ClusterTask>>) {
        self.task_polls
            .lock()
            .unwrap()
            .insert(key.into(), polls.into_iter().collect());
    }

    /// Script successive LCM-info responses for an instance.
    /// The last response repeats once the script is exhausted.
    pub fn script_instance_polls(&self, instance_id: impl Into<String>, polls: Vec<LcmInfo>) {
        self.instance_polls
            .lock()
            .unwrap()
            .insert(instance_id.into(), polls.into_iter().collect());
    }

    /// Fail every call whose path contains `fragment` with `SimulatedFailure`
    pub fn fail_on(&self, fragment: impl Into<String>) {
        self.failures.lock().unwrap().push(fragment.into());
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.lock().unwrap()
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that would have changed server state
    pub fn mutating_calls(&self) -> Vec<MockCall> {
        self.calls().into_iter().filter(MockCall::is_mutating).collect()
    }

    /// Calls with the given method whose path contains `fragment`
    pub fn calls_to(&self, method: Method, fragment: &str) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path.contains(fragment))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Current stored state of an instance, bypassing scripts
    pub fn instance(&self, instance_id: &str) -> Option<LcmInfo> {
        self.instances
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == instance_id)
            .cloned()
    }

    /// Record a call, honoring cancellation and injected failures
    pub(crate) fn record(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(TcaError::TaskCancelled);
        }
        if self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|f| path.contains(f.as_str()))
        {
            return Err(TcaError::SimulatedFailure {
                path: path.to_string(),
            });
        }
        self.calls.lock().unwrap().push(MockCall {
            method,
            path: path.to_string(),
            body,
        });
        Ok(())
    }

    pub(crate) fn not_found(path: &str) -> TcaError {
        TcaError::not_found(EntityKind::Resource, path)
    }

    pub(crate) fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub(crate) fn new_handle(entity_id: &str) -> TaskHandle {
        TaskHandle {
            id: Self::new_id(),
            operation_id: Some(Self::new_id()),
            entity_id: Some(entity_id.to_string()),
        }
    }
}

fn body_of<T: serde::Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

#[async_trait::async_trait]
impl TcaClientTrait for MockTcaClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn authenticate(&self, cancel: &CancellationToken) -> Result<()> {
        self.record(Method::POST, crate::common::paths::SESSIONS, None, cancel)?;
        *self.authenticated.lock().unwrap() = true;
        Ok(())
    }

    // VIM operations - delegated to vim module
    async fn list_vims(&self, cancel: &CancellationToken) -> Result<Vec<VimTenant>> {
        vim::list_vims(self, cancel).await
    }

    async fn get_vim(&self, vim_id: &str, cancel: &CancellationToken) -> Result<VimTenant> {
        vim::get_vim(self, vim_id, cancel).await
    }

    async fn register_vim(&self, spec: &CloudProviderSpec, cancel: &CancellationToken) -> Result<VimTenant> {
        vim::register_vim(self, spec, cancel).await
    }

    async fn delete_vim(&self, tenant_id: &str, cancel: &CancellationToken) -> Result<()> {
        vim::delete_vim(self, tenant_id, cancel).await
    }

    async fn query_containers(&self, query: &ContainerQuery, cancel: &CancellationToken) -> Result<Vec<InventoryContainer>> {
        vim::query_containers(self, query, cancel).await
    }

    async fn query_networks(&self, query: &NetworkQuery, cancel: &CancellationToken) -> Result<Vec<VimNetwork>> {
        vim::query_networks(self, query, cancel).await
    }

    async fn query_vm_templates(&self, query: &VmTemplateQuery, cancel: &CancellationToken) -> Result<Vec<VmTemplate>> {
        vim::query_vm_templates(self, query, cancel).await
    }

    // Cluster operations - delegated to infra module
    async fn list_clusters(&self, cancel: &CancellationToken) -> Result<Vec<Cluster>> {
        infra::list_clusters(self, cancel).await
    }

    async fn get_cluster(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<Cluster> {
        infra::get_cluster(self, cluster_id, cancel).await
    }

    async fn create_cluster(&self, spec: &ClusterSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
        infra::create_cluster(self, spec, cancel).await
    }

    async fn delete_cluster(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        infra::delete_cluster(self, cluster_id, cancel).await
    }

    async fn change_cluster_password(&self, cluster_id: &str, change: &ClusterPasswordChange, cancel: &CancellationToken) -> Result<TaskHandle> {
        infra::change_cluster_password(self, cluster_id, change, cancel).await
    }

    async fn list_node_pools(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<Vec<NodePool>> {
        infra::list_node_pools(self, cluster_id, cancel).await
    }

    async fn get_node_pool(&self, cluster_id: &str, pool_id: &str, cancel: &CancellationToken) -> Result<NodePool> {
        infra::get_node_pool(self, cluster_id, pool_id, cancel).await
    }

    async fn create_node_pool(&self, cluster_id: &str, spec: &NodePoolSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
        infra::create_node_pool(self, cluster_id, spec, cancel).await
    }

    async fn update_node_pool(&self, cluster_id: &str, pool_id: &str, spec: &NodePoolSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
        infra::update_node_pool(self, cluster_id, pool_id, spec, cancel).await
    }

    async fn delete_node_pool(&self, cluster_id: &str, pool_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        infra::delete_node_pool(self, cluster_id, pool_id, cancel).await
    }

    async fn query_tasks(&self, query: &TaskQuery, cancel: &CancellationToken) -> Result<Vec<ClusterTask>> {
        infra::query_tasks(self, query, cancel).await
    }

    async fn retry_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        infra::task_action(self, &crate::common::paths::task_retry(task_id), task_id, cancel).await
    }

    async fn abort_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        infra::task_action(self, &crate::common::paths::task_abort(task_id), task_id, cancel).await
    }

    async fn list_cluster_templates(&self, cancel: &CancellationToken) -> Result<Vec<ClusterTemplate>> {
        infra::list_cluster_templates(self, cancel).await
    }

    async fn get_cluster_template(&self, template_id: &str, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        infra::get_cluster_template(self, template_id, cancel).await
    }

    async fn create_cluster_template(&self, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        infra::create_cluster_template(self, template, cancel).await
    }

    async fn update_cluster_template(&self, template_id: &str, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        infra::update_cluster_template(self, template_id, template, cancel).await
    }

    async fn delete_cluster_template(&self, template_id: &str, cancel: &CancellationToken) -> Result<()> {
        infra::delete_cluster_template(self, template_id, cancel).await
    }

    // Catalog, extension and lifecycle operations - delegated to lcm module
    async fn list_extensions(&self, cancel: &CancellationToken) -> Result<Vec<Extension>> {
        lcm::list_extensions(self, cancel).await
    }

    async fn get_extension(&self, extension_id: &str, cancel: &CancellationToken) -> Result<Extension> {
        lcm::get_extension(self, extension_id, cancel).await
    }

    async fn create_extension(&self, registration: &ExtensionRegistration, cancel: &CancellationToken) -> Result<ExtensionCreated> {
        lcm::create_extension(self, registration, cancel).await
    }

    async fn delete_extension(&self, extension_id: &str, cancel: &CancellationToken) -> Result<()> {
        lcm::delete_extension(self, extension_id, cancel).await
    }

    async fn query_repositories(&self, query: &RepositoryQuery, cancel: &CancellationToken) -> Result<Vec<Repository>> {
        lcm::query_repositories(self, query, cancel).await
    }

    async fn list_vnf_packages(&self, cancel: &CancellationToken) -> Result<Vec<VnfPackage>> {
        lcm::list_vnf_packages(self, cancel).await
    }

    async fn get_vnf_package(&self, package_id: &str, cancel: &CancellationToken) -> Result<VnfPackage> {
        lcm::get_vnf_package(self, package_id, cancel).await
    }

    async fn get_vnf_descriptor(&self, package_id: &str, cancel: &CancellationToken) -> Result<VnfDescriptor> {
        lcm::get_vnf_descriptor(self, package_id, cancel).await
    }

    async fn list_vnf_instances(&self, cancel: &CancellationToken) -> Result<Vec<LcmInfo>> {
        lcm::list_vnf_instances(self, crate::common::paths::VNF_INSTANCES, cancel).await
    }

    async fn list_vnf_instances_extended(&self, cancel: &CancellationToken) -> Result<Vec<LcmInfo>> {
        lcm::list_vnf_instances(self, crate::common::paths::VNF_INSTANCES_EXTENDED, cancel).await
    }

    async fn get_vnf_instance(&self, instance_id: &str, cancel: &CancellationToken) -> Result<LcmInfo> {
        lcm::get_vnf_instance(self, instance_id, cancel).await
    }

    async fn create_vnf_instance(&self, request: &CreateVnfRequest, cancel: &CancellationToken) -> Result<LcmInfo> {
        lcm::create_vnf_instance(self, request, cancel).await
    }

    async fn delete_vnf_instance(&self, instance_id: &str, cancel: &CancellationToken) -> Result<()> {
        lcm::delete_vnf_instance(self, instance_id, cancel).await
    }

    async fn invoke_lcm_operation(&self, href: &str, body: &serde_json::Value, cancel: &CancellationToken) -> Result<LcmResponse> {
        lcm::invoke_lcm_operation(self, href, body, cancel).await
    }
}
