//! TcaClient trait for mocking
//!
//! This trait abstracts the TCA REST surface so the engines (validator, orchestrator,
//! LCM engine, waiter) can run against either the HTTP client or the in-memory mock.

use crate::error::Result;
use crate::models::*;
use tokio_util::sync::CancellationToken;

/// Trait for TCA API client operations
///
/// Every operation takes a cancellation token; a tripped token aborts the call with
/// `TaskCancelled`. All async methods must be `Send` to work with Tokio's
/// work-stealing runtime.
#[async_trait::async_trait]
pub trait TcaClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Establish a session; re-authentication is never automatic
    async fn authenticate(&self, cancel: &CancellationToken) -> Result<()>;

    // VIM tenants
    async fn list_vims(&self, cancel: &CancellationToken) -> Result<Vec<VimTenant>>;
    async fn get_vim(&self, vim_id: &str, cancel: &CancellationToken) -> Result<VimTenant>;
    async fn register_vim(&self, spec: &CloudProviderSpec, cancel: &CancellationToken) -> Result<VimTenant>;
    async fn delete_vim(&self, tenant_id: &str, cancel: &CancellationToken) -> Result<()>;

    // VIM inventory
    async fn query_containers(&self, query: &ContainerQuery, cancel: &CancellationToken) -> Result<Vec<InventoryContainer>>;
    async fn query_networks(&self, query: &NetworkQuery, cancel: &CancellationToken) -> Result<Vec<VimNetwork>>;
    async fn query_vm_templates(&self, query: &VmTemplateQuery, cancel: &CancellationToken) -> Result<Vec<VmTemplate>>;

    // Clusters
    async fn list_clusters(&self, cancel: &CancellationToken) -> Result<Vec<Cluster>>;
    async fn get_cluster(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<Cluster>;
    async fn create_cluster(&self, spec: &ClusterSpec, cancel: &CancellationToken) -> Result<TaskHandle>;
    async fn delete_cluster(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<TaskHandle>;
    async fn change_cluster_password(&self, cluster_id: &str, change: &ClusterPasswordChange, cancel: &CancellationToken) -> Result<TaskHandle>;

    // Node pools
    async fn list_node_pools(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<Vec<NodePool>>;
    async fn get_node_pool(&self, cluster_id: &str, pool_id: &str, cancel: &CancellationToken) -> Result<NodePool>;
    async fn create_node_pool(&self, cluster_id: &str, spec: &NodePoolSpec, cancel: &CancellationToken) -> Result<TaskHandle>;
    async fn update_node_pool(&self, cluster_id: &str, pool_id: &str, spec: &NodePoolSpec, cancel: &CancellationToken) -> Result<TaskHandle>;
    async fn delete_node_pool(&self, cluster_id: &str, pool_id: &str, cancel: &CancellationToken) -> Result<TaskHandle>;

    // Cluster tasks
    async fn query_tasks(&self, query: &TaskQuery, cancel: &CancellationToken) -> Result<Vec<ClusterTask>>;
    async fn retry_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle>;
    async fn abort_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle>;

    // Cluster templates
    async fn list_cluster_templates(&self, cancel: &CancellationToken) -> Result<Vec<ClusterTemplate>>;
    async fn get_cluster_template(&self, template_id: &str, cancel: &CancellationToken) -> Result<ClusterTemplate>;
    async fn create_cluster_template(&self, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate>;
    async fn update_cluster_template(&self, template_id: &str, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate>;
    async fn delete_cluster_template(&self, template_id: &str, cancel: &CancellationToken) -> Result<()>;

    // Extensions and repositories
    async fn list_extensions(&self, cancel: &CancellationToken) -> Result<Vec<Extension>>;
    async fn get_extension(&self, extension_id: &str, cancel: &CancellationToken) -> Result<Extension>;
    async fn create_extension(&self, registration: &ExtensionRegistration, cancel: &CancellationToken) -> Result<ExtensionCreated>;
    async fn delete_extension(&self, extension_id: &str, cancel: &CancellationToken) -> Result<()>;
    async fn query_repositories(&self, query: &RepositoryQuery, cancel: &CancellationToken) -> Result<Vec<Repository>>;

    // VNF catalog
    async fn list_vnf_packages(&self, cancel: &CancellationToken) -> Result<Vec<VnfPackage>>;
    async fn get_vnf_package(&self, package_id: &str, cancel: &CancellationToken) -> Result<VnfPackage>;
    async fn get_vnf_descriptor(&self, package_id: &str, cancel: &CancellationToken) -> Result<VnfDescriptor>;

    // VNF lifecycle
    async fn list_vnf_instances(&self, cancel: &CancellationToken) -> Result<Vec<LcmInfo>>;
    async fn list_vnf_instances_extended(&self, cancel: &CancellationToken) -> Result<Vec<LcmInfo>>;
    async fn get_vnf_instance(&self, instance_id: &str, cancel: &CancellationToken) -> Result<LcmInfo>;
    async fn create_vnf_instance(&self, request: &CreateVnfRequest, cancel: &CancellationToken) -> Result<LcmInfo>;
    async fn delete_vnf_instance(&self, instance_id: &str, cancel: &CancellationToken) -> Result<()>;

    /// POST `body` to a server-supplied policy-link href
    async fn invoke_lcm_operation(&self, href: &str, body: &serde_json::Value, cancel: &CancellationToken) -> Result<LcmResponse>;
}
