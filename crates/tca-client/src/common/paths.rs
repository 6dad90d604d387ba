//! TCA endpoint paths
//!
//! All paths are relative to the client base URL.

pub const SESSIONS: &str = "/hybridity/api/sessions";

pub const VIM_TENANTS: &str = "/hybridity/api/vims/v1/tenants";

pub const CLUSTERS: &str = "/hybridity/api/infra/k8s/clusters";
pub const CLUSTER_TASKS: &str = "/hybridity/api/infra/k8s/tasks";
pub const CLUSTER_TEMPLATES: &str = "/hybridity/api/infra/k8s/clusterTemplates";

pub const EXTENSIONS: &str = "/hybridity/api/extensions";
pub const REPOSITORIES_QUERY: &str = "/hybridity/api/repositories/query";
pub const NETWORKS: &str = "/hybridity/api/nfv/networks";
pub const INVENTORY_CONTAINERS: &str = "/hybridity/api/service/inventory/containers";
pub const VM_TEMPLATES: &str = "/hybridity/api/infra/inventory/vc/templates";

pub const VNF_PACKAGES: &str = "/telco/api/vnfpkgm/v2/vnf_packages";
pub const VNF_INSTANCES: &str = "/telco/api/vnflcm/v2/vnf_instances";
pub const VNF_INSTANCES_EXTENDED: &str = "/telco/api/vnflcm/v2/extension/vnf_instances";
pub const VNF_INSTANCES_V1: &str = "/hybridity/api/vnflcm/v1/vnf_instances";

fn seg(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

pub fn vim_tenant(vim_id: &str) -> String {
    format!("/hybridity/api/vims/v1/{}/tenants", seg(vim_id))
}

pub fn vim_tenant_delete(tenant_id: &str) -> String {
    format!("{}/{}", VIM_TENANTS, seg(tenant_id))
}

pub fn cluster(cluster_id: &str) -> String {
    format!("{}/{}", CLUSTERS, seg(cluster_id))
}

pub fn cluster_password(cluster_id: &str) -> String {
    format!("{}/{}/clusterpassword", CLUSTERS, seg(cluster_id))
}

pub fn node_pools(cluster_id: &str) -> String {
    format!("/hybridity/api/infra/k8s/cluster/{}/nodepools", seg(cluster_id))
}

pub fn node_pool_create(cluster_id: &str) -> String {
    format!("/hybridity/api/infra/k8s/cluster/{}/nodepool", seg(cluster_id))
}

pub fn node_pool(cluster_id: &str, pool_id: &str) -> String {
    format!(
        "/hybridity/api/infra/k8s/cluster/{}/nodepool/{}",
        seg(cluster_id),
        seg(pool_id)
    )
}

pub fn task_retry(task_id: &str) -> String {
    format!("/hybridity/api/infra/k8s/operations/{}/retry", seg(task_id))
}

pub fn task_abort(task_id: &str) -> String {
    format!("/hybridity/api/infra/k8s/operations/{}/abort", seg(task_id))
}

pub fn cluster_template(template_id: &str) -> String {
    format!("{}/{}", CLUSTER_TEMPLATES, seg(template_id))
}

pub fn extension(extension_id: &str) -> String {
    format!("{}/{}", EXTENSIONS, seg(extension_id))
}

pub fn vnf_package(package_id: &str) -> String {
    format!("{}/{}", VNF_PACKAGES, seg(package_id))
}

pub fn vnf_descriptor(package_id: &str) -> String {
    format!("{}/{}/vnfd", VNF_PACKAGES, seg(package_id))
}

pub fn vnf_instance(instance_id: &str) -> String {
    format!("{}/{}", VNF_INSTANCES, seg(instance_id))
}

pub fn vnf_instantiate(instance_id: &str) -> String {
    format!("{}/{}/instantiate", VNF_INSTANCES, seg(instance_id))
}

pub fn vnf_update_state(instance_id: &str) -> String {
    format!("{}/{}/update_state", VNF_INSTANCES_V1, seg(instance_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_pool_paths() {
        assert_eq!(
            node_pools("c1"),
            "/hybridity/api/infra/k8s/cluster/c1/nodepools"
        );
        assert_eq!(
            node_pool("c1", "p1"),
            "/hybridity/api/infra/k8s/cluster/c1/nodepool/p1"
        );
        assert_eq!(
            node_pool_create("c1"),
            "/hybridity/api/infra/k8s/cluster/c1/nodepool"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        assert_eq!(cluster("a b"), "/hybridity/api/infra/k8s/clusters/a%20b");
        assert_eq!(
            task_abort("t/1"),
            "/hybridity/api/infra/k8s/operations/t%2F1/abort"
        );
    }

    #[test]
    fn test_update_state_uses_v1_api() {
        assert_eq!(
            vnf_update_state("I1"),
            "/hybridity/api/vnflcm/v1/vnf_instances/I1/update_state"
        );
    }
}
