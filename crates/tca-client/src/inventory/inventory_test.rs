//! Unit tests for the inventory snapshot

#[cfg(test)]
mod tests {
    use crate::error::TcaError;
    use crate::inventory::*;
    use crate::models::*;
    use crate::test_utils::*;
    use reqwest::Method;
    use tokio_util::sync::CancellationToken;

    fn vc_vim() -> VimTenant {
        create_test_vim(VC_TENANT_ID, VC_VIM_ID, "core", VimType::Vc)
    }

    #[tokio::test]
    async fn test_fetch_issues_five_queries() {
        let client = create_test_client();
        let cancel = CancellationToken::new();

        let snapshot = InventorySnapshot::fetch(&client, &vc_vim(), &cancel).await.unwrap();

        assert_eq!(snapshot.compute_clusters.len(), 1);
        assert_eq!(snapshot.networks.len(), 2);
        assert_eq!(snapshot.vm_templates.len(), 1);
        let posts = client.calls_to(Method::POST, "/hybridity/api/");
        assert_eq!(posts.len(), 5);
        assert!(client.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_without_inventory_is_unavailable() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let vim = create_test_vim(
            "a1b2c3d4-0000-4000-8000-000000000009",
            "vmware_99999999999999999999999999999999",
            "lab",
            VimType::Vc,
        );
        client.add_vim(vim.clone());

        let err = InventorySnapshot::fetch(&client, &vim, &cancel).await.unwrap_err();
        match err {
            TcaError::InventoryUnavailable { vim, .. } => assert_eq!(vim, "lab"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_kubernetes_vim_rejected_before_any_query() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let vim = create_test_vim(K8S_TENANT_ID, K8S_VIM_ID, "edge-test01", VimType::Kubernetes);

        let err = list_vm_templates(&client, &vim, &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::UnsupportedVim { ref name } if name == "edge-test01"));
        let err = InventorySnapshot::fetch(&client, &vim, &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::UnsupportedVim { .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_vm_templates_for_vc() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let templates = list_vm_templates(&client, &vc_vim(), &cancel).await.unwrap();
        assert_eq!(templates[0].name, "photon-3-kube-v1.20.4");
    }

    fn snapshot() -> InventorySnapshot {
        let inventory = create_test_inventory();
        InventorySnapshot {
            vim_id: VC_VIM_ID.to_string(),
            vim_name: "core".to_string(),
            compute_clusters: inventory.compute_clusters,
            folders: inventory.folders,
            resource_pools: inventory.resource_pools,
            networks: inventory.networks,
            vm_templates: inventory.vm_templates,
        }
    }

    #[test]
    fn test_placement_lookups() {
        let snapshot = snapshot();
        assert!(snapshot.is_valid_folder("tkg"));
        assert!(snapshot.is_valid_folder("/Datacenter/vm/tkg"));
        assert!(!snapshot.is_valid_folder("other"));
        assert!(snapshot.is_valid_resource("k8s"));
        assert!(snapshot.is_valid_cluster_compute("core"));
        assert!(snapshot.is_valid_datastore("vsanDatastore"));
        assert!(!snapshot.is_valid_datastore("localDatastore"));

        assert!(snapshot.is_valid_placement(&PlacementParam::new("k8s", PlacementType::ResourcePool)));
        assert!(!snapshot.is_valid_placement(&PlacementParam::new("k8s", PlacementType::Folder)));
        let unchecked = PlacementParam {
            name: "Datacenter".into(),
            param_type: "Datacenter".into(),
        };
        assert!(snapshot.is_valid_placement(&unchecked));
    }

    #[test]
    fn test_datastore_url_maps_to_exactly_one() {
        let mut snapshot = snapshot();
        let ds = snapshot.get_datastore_by_url(DATASTORE_URL).unwrap();
        assert_eq!(ds.name, "vsanDatastore");
        // Trailing slash is not significant
        assert!(snapshot.is_valid_datastore_url(DATASTORE_URL.trim_end_matches('/')));
        assert!(!snapshot.is_valid_datastore_url("ds:///vmfs/volumes/missing/"));

        // Same datastore seen through a second compute cluster still counts once
        let mut second = snapshot.compute_clusters[0].clone();
        second.entity_id = "domain-c9".into();
        second.name = "edge".into();
        snapshot.compute_clusters.push(second.clone());
        assert!(snapshot.get_datastore_by_url(DATASTORE_URL).is_ok());

        // Two distinct datastores behind one URL are ambiguous
        second.datastores[0].entity_id = "datastore-99".into();
        snapshot.compute_clusters.push(second);
        let err = snapshot.get_datastore_by_url(DATASTORE_URL).unwrap_err();
        assert!(matches!(err, TcaError::InvalidSpec { .. }));
    }

    #[test]
    fn test_network_normalization() {
        let mut snapshot = snapshot();
        assert_eq!(
            snapshot.normalize_network_name("tkg-dhcp").unwrap(),
            "/Datacenter/network/tkg-dhcp"
        );
        assert_eq!(
            snapshot.normalize_network_name("/Datacenter/network/sriov-n3").unwrap(),
            "/Datacenter/network/sriov-n3"
        );
        let err = snapshot.normalize_network_name("/Datacenter/network/absent").unwrap_err();
        assert!(matches!(err, TcaError::NetworkNotFound { .. }));
        let err = snapshot.normalize_network_name("absent").unwrap_err();
        assert!(matches!(err, TcaError::NetworkNotFound { ref name } if name == "absent"));

        snapshot.networks.push(VimNetwork {
            name: "tkg-dhcp".into(),
            full_network_path: "/Datacenter2/network/tkg-dhcp".into(),
            ..Default::default()
        });
        let err = snapshot.normalize_network_name("tkg-dhcp").unwrap_err();
        assert!(matches!(err, TcaError::InvalidSpec { .. }));
    }

    #[test]
    fn test_find_template() {
        let snapshot = snapshot();
        assert!(snapshot.find_template("photon-3-kube-v1.20.4").is_some());
        assert!(snapshot.find_template("ubuntu").is_none());
    }
}
