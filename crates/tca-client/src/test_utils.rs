//! Test utilities for unit testing the engines
//!
//! This module provides helpers for creating test data and a pre-populated
//! [`MockTcaClient`] that models one vCenter VIM with a management cluster, a
//! workload cluster registered as a Kubernetes VIM, a linked Harbor repository and a
//! one-VDU catalog entry.

use crate::mock::{MockInventory, MockTcaClient};
use crate::models::*;

pub const HCX_URL: &str = "https://hcx.example";
pub const VC_VIM_ID: &str = "vmware_6f2b7c0e9d8a4b1c8e3f5a7d9b2c4e6f";
pub const VC_TENANT_ID: &str = "a1b2c3d4-0000-4000-8000-000000000001";
pub const K8S_VIM_ID: &str = "vmware_0d1e2f3a4b5c6d7e8f9a0b1c2d3e4f5a";
pub const K8S_TENANT_ID: &str = "a1b2c3d4-0000-4000-8000-000000000002";
pub const MGMT_CLUSTER_ID: &str = "c0000000-0000-4000-8000-000000000001";
pub const EDGE_CLUSTER_ID: &str = "c0000000-0000-4000-8000-000000000002";
pub const POOL_ID: &str = "d0000000-0000-4000-8000-000000000001";
pub const MGMT_TEMPLATE_ID: &str = "b0000000-0000-4000-8000-000000000001";
pub const WORKLOAD_TEMPLATE_ID: &str = "b0000000-0000-4000-8000-000000000002";
pub const PACKAGE_ID: &str = "e0000000-0000-4000-8000-000000000001";
pub const VNFD_ID: &str = "vnfd-app-0001";
pub const REPO_ID: &str = "f0000000-0000-4000-8000-000000000001";
pub const REPO_URL: &str = "https://harbor/example";
pub const DATASTORE_URL: &str = "ds:///vmfs/volumes/vsan:52d7a1b0c3e4f5a6/";

/// Helper to create a test VIM tenant
pub fn create_test_vim(tenant_id: &str, vim_id: &str, name: &str, vim_type: VimType) -> VimTenant {
    VimTenant {
        tenant_id: tenant_id.to_string(),
        vim_id: vim_id.to_string(),
        vim_name: name.to_string(),
        tenant_name: format!("{}-tenant", name),
        vim_type,
        hcx_cloud_url: if vim_type == VimType::Vc {
            HCX_URL.to_string()
        } else {
            String::new()
        },
        hcx_uuid: format!("{}-hcx", tenant_id),
        username: "administrator@vsphere.local".to_string(),
        vim_conn: Some(VimConnection {
            status: "ok".to_string(),
            remarks: None,
        }),
        ..Default::default()
    }
}

fn container(id: &str, name: &str, entity_type: &str, path: &str) -> InventoryContainer {
    InventoryContainer {
        entity_id: id.to_string(),
        name: name.to_string(),
        entity_type: entity_type.to_string(),
        full_path: path.to_string(),
        datastores: Vec::new(),
    }
}

fn network(id: &str, name: &str) -> VimNetwork {
    VimNetwork {
        id: id.to_string(),
        name: name.to_string(),
        full_network_path: format!("/Datacenter/network/{}", name),
        network_type: "DistributedVirtualPortgroup".to_string(),
        status: "green".to_string(),
        ..Default::default()
    }
}

/// Helper to create the inventory of the test vCenter
pub fn create_test_inventory() -> MockInventory {
    let mut core = container("domain-c8", "core", "ClusterComputeResource", "/Datacenter/host/core");
    core.datastores = vec![
        Datastore {
            entity_id: "datastore-41".to_string(),
            name: "vsanDatastore".to_string(),
            url: DATASTORE_URL.to_string(),
            summary: None,
        },
        Datastore {
            entity_id: "datastore-42".to_string(),
            name: "nfs01".to_string(),
            url: "ds:///vmfs/volumes/nfs01/".to_string(),
            summary: None,
        },
    ];
    MockInventory {
        compute_clusters: vec![core],
        folders: vec![container("group-v60", "tkg", "Folder", "/Datacenter/vm/tkg")],
        resource_pools: vec![container("resgroup-9", "k8s", "ResourcePool", "/Datacenter/host/core/Resources/k8s")],
        networks: vec![
            network("dvportgroup-1", "tkg-dhcp"),
            network("dvportgroup-2", "sriov-n3"),
        ],
        vm_templates: vec![VmTemplate {
            entity_id: "vm-100".to_string(),
            name: "photon-3-kube-v1.20.4".to_string(),
            full_path: "/Datacenter/vm/templates/photon-3-kube-v1.20.4".to_string(),
            guest_os: "Photon".to_string(),
            k8s_version: "v1.20.4".to_string(),
        }],
    }
}

/// Helper to create a node entry that passes inventory validation
pub fn create_test_node_spec(name: &str) -> NodePoolSpec {
    NodePoolSpec {
        name: name.to_string(),
        cpu: 4,
        memory: 16384,
        storage: 50,
        replica: 1,
        labels: vec![format!("type={}", name)],
        networks: vec![NodeNetwork {
            label: "MANAGEMENT".to_string(),
            network_name: "tkg-dhcp".to_string(),
            nameservers: vec!["10.0.0.2".to_string()],
        }],
        placement_params: vec![
            PlacementParam::new("tkg", PlacementType::Folder),
            PlacementParam::new("vsanDatastore", PlacementType::Datastore),
            PlacementParam::new("k8s", PlacementType::ResourcePool),
        ],
        clone_mode: Some(CloneMode::LinkedClone),
        ..Default::default()
    }
}

/// Helper to create a cluster spec that passes validation against the test world
pub fn create_test_cluster_spec(name: &str, cluster_type: ClusterType) -> ClusterSpec {
    let (template, management) = match cluster_type {
        ClusterType::Management => ("mgmt-template", None),
        ClusterType::Workload => ("workload-template", Some("mgmt1".to_string())),
    };
    ClusterSpec {
        kind: Some(SpecKind::Cluster),
        name: name.to_string(),
        cluster_password: "VMware1!".to_string(),
        cluster_template_id: template.to_string(),
        cluster_type: Some(cluster_type),
        hcx_cloud_url: HCX_URL.to_string(),
        endpoint_ip: "10.1.1.1".to_string(),
        management_cluster_id: management,
        vm_template: "photon-3-kube-v1.20.4".to_string(),
        master_nodes: vec![create_test_node_spec("master")],
        worker_nodes: vec![create_test_node_spec("default-pool01")],
        placement_params: vec![
            PlacementParam::new("core", PlacementType::ClusterComputeResource),
            PlacementParam::new("vsanDatastore", PlacementType::Datastore),
        ],
        ..Default::default()
    }
}

/// Helper to create a cluster record
pub fn create_test_cluster(id: &str, name: &str, cluster_type: ClusterType) -> Cluster {
    Cluster {
        id: id.to_string(),
        cluster_name: name.to_string(),
        cluster_type: Some(cluster_type),
        vim_id: VC_VIM_ID.to_string(),
        hcx_cloud_url: HCX_URL.to_string(),
        endpoint_ip: "10.1.1.1".to_string(),
        status: "ACTIVE".to_string(),
        management_cluster_id: match cluster_type {
            ClusterType::Management => None,
            ClusterType::Workload => Some(MGMT_CLUSTER_ID.to_string()),
        },
        ..Default::default()
    }
}

/// Helper to create a node pool record
pub fn create_test_node_pool(id: &str, name: &str) -> NodePool {
    let spec = create_test_node_spec(name);
    NodePool {
        id: id.to_string(),
        name: name.to_string(),
        cpu: spec.cpu,
        memory: spec.memory,
        storage: spec.storage,
        replica: spec.replica,
        labels: spec.labels,
        networks: spec.networks,
        placement_params: spec.placement_params,
        status: "ACTIVE".to_string(),
        ..Default::default()
    }
}

/// Helper to create a cluster template declaring the given pools
pub fn create_test_template(id: &str, name: &str, cluster_type: ClusterType, pools: &[&str]) -> ClusterTemplate {
    let node = |name: &str| TemplateNode {
        name: name.to_string(),
        cpu: 4,
        memory: 16384,
        storage: 50,
        replica: 1,
        networks: vec![TemplateNetwork {
            label: "MANAGEMENT".to_string(),
        }],
        ..Default::default()
    };
    ClusterTemplate {
        id: Some(id.to_string()),
        name: name.to_string(),
        cluster_type: Some(cluster_type),
        cluster_config: TemplateClusterConfig {
            kubernetes_version: Some("v1.20.4+vmware.1".to_string()),
            ..Default::default()
        },
        master_nodes: vec![node("master")],
        worker_nodes: pools.iter().map(|p| node(*p)).collect(),
        ..Default::default()
    }
}

/// Helper to create a catalog package
pub fn create_test_package(id: &str, vnfd_id: &str, name: &str) -> VnfPackage {
    VnfPackage {
        id: id.to_string(),
        vnfd_id: vnfd_id.to_string(),
        vnf_provider: "Acme".to_string(),
        vnf_product_name: format!("{}-product", name),
        vnf_software_version: "1.0.0".to_string(),
        vnfd_version: "1.0".to_string(),
        onboarding_state: "ONBOARDED".to_string(),
        operational_state: "ENABLED".to_string(),
        usage_state: "NOT_IN_USE".to_string(),
        user_defined_data: Some(UserDefinedData {
            name: Some(name.to_string()),
            nf_type: Some("CNF".to_string()),
            ..Default::default()
        }),
    }
}

/// Helper to create a descriptor with one VDU per name
pub fn create_test_descriptor(vnfd_id: &str, vdus: &[(&str, Option<&str>)]) -> VnfDescriptor {
    VnfDescriptor {
        vnfd_id: vnfd_id.to_string(),
        vdus: vdus
            .iter()
            .map(|(name, flavour)| Vdu {
                vdu_id: name.to_string(),
                name: name.to_string(),
                flavour_id: flavour.map(str::to_string),
                chart_name: Some(name.to_string()),
                chart_version: Some("1.0.0".to_string()),
                ..Default::default()
            })
            .collect(),
    }
}

/// Helper to create a Harbor repository with its TCA-side credentials
pub fn create_test_repository(id: &str, name: &str, url: &str) -> Repository {
    Repository {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        repo_type: "Harbor".to_string(),
        username: "robot$tca".to_string(),
        password: "linked-secret".to_string(),
        state: "ENABLED".to_string(),
    }
}

/// Helper to create an extension attached to one VIM
pub fn create_test_extension(id: &str, name: &str, vim_id: &str) -> Extension {
    Extension {
        extension_id: id.to_string(),
        name: name.to_string(),
        extension_type: ExtensionType::Repository,
        extension_subtype: "Harbor".to_string(),
        state: "ENABLED".to_string(),
        version: "2.x".to_string(),
        interface_info: InterfaceInfo {
            url: REPO_URL.to_string(),
            ..Default::default()
        },
        access_info: AccessInfo {
            username: "admin".to_string(),
            password: "c2VjcmV0".to_string(),
        },
        vim_info: vec![ExtensionVim {
            vim_id: vim_id.to_string(),
            vim_name: "edge-test01".to_string(),
            vim_system_uuid: K8S_TENANT_ID.to_string(),
        }],
    }
}

/// Helper to create an LCM info record that permits `ops`
pub fn create_test_instance(
    id: &str,
    name: &str,
    state: InstantiationState,
    op_state: Option<LcmOperationState>,
    ops: &[LcmOperation],
) -> LcmInfo {
    LcmInfo {
        id: id.to_string(),
        vnf_instance_name: name.to_string(),
        vnfd_id: VNFD_ID.to_string(),
        vnf_pkg_id: Some(PACKAGE_ID.to_string()),
        instantiation_state: state.to_string(),
        metadata: LcmMetadata {
            lcm_operation: op_state.map(|_| "INSTANTIATE".to_string()),
            lcm_operation_state: op_state,
            vnf_catalog_name: Some("app".to_string()),
            vnf_pkg_id: Some(PACKAGE_ID.to_string()),
            ..Default::default()
        },
        links: crate::mock::policy_links(id, ops),
        ..Default::default()
    }
}

/// Helper to create a cluster task node
pub fn create_test_task(task_id: &str, task_type: &str, status: TaskStatus, children: Vec<ClusterTask>) -> ClusterTask {
    ClusterTask {
        task_id: task_id.to_string(),
        operation_id: "Op1".to_string(),
        task_type: task_type.to_string(),
        status,
        progress: if status == TaskStatus::Success { 100 } else { 50 },
        child_tasks: children,
        ..Default::default()
    }
}

/// Mock client populated with the standard test world
pub fn create_test_client() -> MockTcaClient {
    let client = MockTcaClient::new("https://tca.example");
    client.add_vim(create_test_vim(VC_TENANT_ID, VC_VIM_ID, "core", VimType::Vc));
    client.add_vim(create_test_vim(K8S_TENANT_ID, K8S_VIM_ID, "edge-test01", VimType::Kubernetes));
    client.set_inventory(VC_VIM_ID, create_test_inventory());

    client.add_cluster(create_test_cluster(MGMT_CLUSTER_ID, "mgmt1", ClusterType::Management));
    client.add_cluster(create_test_cluster(EDGE_CLUSTER_ID, "edge-test01", ClusterType::Workload));
    client.add_node_pool(EDGE_CLUSTER_ID, create_test_node_pool(POOL_ID, "default-pool01"));

    client.add_template(create_test_template(
        MGMT_TEMPLATE_ID,
        "mgmt-template",
        ClusterType::Management,
        &["default-pool01"],
    ));
    client.add_template(create_test_template(
        WORKLOAD_TEMPLATE_ID,
        "workload-template",
        ClusterType::Workload,
        &["default-pool01"],
    ));

    client.add_repository(K8S_VIM_ID, create_test_repository(REPO_ID, "harbor-1", REPO_URL));
    client.add_extension(create_test_extension("x0000001", "harbor-1", K8S_VIM_ID));
    client.add_package(
        create_test_package(PACKAGE_ID, VNFD_ID, "app"),
        Some(create_test_descriptor(VNFD_ID, &[("app", None)])),
    );
    client
}
