//! Unit tests for spec validation

#[cfg(test)]
mod tests {
    use crate::error::TcaError;
    use crate::models::*;
    use crate::test_utils::*;
    use crate::validator::*;
    use tokio_util::sync::CancellationToken;

    fn reason(err: TcaError) -> String {
        match err {
            TcaError::InvalidSpec { reason } => reason,
            other => panic!("expected InvalidSpec, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_management_cluster_spec_is_normalized() {
        // Setup: standard world and a management cluster spec
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);

        // Execute: Validate
        let vim = SpecValidator::new(&client)
            .validate_cluster(&mut spec, &cancel)
            .await
            .unwrap();

        // Assert: references rewritten, nothing mutated on the server
        assert_eq!(vim.vim_id, VC_VIM_ID);
        assert_eq!(spec.cluster_template_id, MGMT_TEMPLATE_ID);
        for node in spec.all_nodes() {
            assert_eq!(node.networks[0].network_name, "/Datacenter/network/tkg-dhcp");
        }
        assert!(client.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_structural_failure_contacts_nothing() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        // Label without a networkName
        spec.master_nodes[0].networks[0].network_name.clear();

        let err = SpecValidator::new(&client)
            .validate_cluster(&mut spec, &cancel)
            .await
            .unwrap_err();
        assert!(reason(err).contains("networkName"));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_workload_management_reference_resolved() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let validator = SpecValidator::new(&client);

        let mut spec = create_test_cluster_spec("edge-test02", ClusterType::Workload);
        validator.validate_cluster(&mut spec, &cancel).await.unwrap();
        assert_eq!(spec.management_cluster_id.as_deref(), Some(MGMT_CLUSTER_ID));
        assert_eq!(spec.cluster_template_id, WORKLOAD_TEMPLATE_ID);

        // A workload cluster cannot manage another
        let mut spec = create_test_cluster_spec("edge-test03", ClusterType::Workload);
        spec.management_cluster_id = Some("edge-test01".to_string());
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        assert!(reason(err).contains("not a MANAGEMENT cluster"));

        let mut spec = create_test_cluster_spec("edge-test04", ClusterType::Workload);
        spec.management_cluster_id = Some("mgmt9".to_string());
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        assert!(reason(err).starts_with("management cluster"));
    }

    #[tokio::test]
    async fn test_placement_rejection_names_category() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let validator = SpecValidator::new(&client);

        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.worker_nodes[0].placement_params[0].name = "tkg-missing".to_string();
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        let msg = reason(err);
        assert!(msg.starts_with("folder tkg-missing"), "{}", msg);

        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.placement_params[0].name = "edge-compute".to_string();
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        assert!(reason(err).starts_with("compute edge-compute"));

        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.master_nodes[0].networks[0].network_name = "vlan-404".to_string();
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::NetworkNotFound { ref name } if name == "vlan-404"));
    }

    #[tokio::test]
    async fn test_template_checks() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let validator = SpecValidator::new(&client);

        // Type mismatch
        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.cluster_template_id = "workload-template".to_string();
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::TemplateTypeMismatch { .. }));

        // Template pool missing from the spec
        client.add_template(create_test_template(
            "b0000000-0000-4000-8000-000000000003",
            "accel-template",
            ClusterType::Management,
            &["default-pool01", "hwaccel"],
        ));
        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.cluster_template_id = "accel-template".to_string();
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        assert!(reason(err).ends_with("hwaccel"));
    }

    #[tokio::test]
    async fn test_provider_resolution() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let validator = SpecValidator::new(&client);

        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.hcx_cloud_url = "https://nowhere.example".to_string();
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::CloudProviderNotFound { .. }));

        let mut k8s = create_test_vim(
            "a1b2c3d4-0000-4000-8000-000000000007",
            "vmware_77777777777777777777777777777777",
            "k8s-only",
            VimType::Kubernetes,
        );
        k8s.hcx_cloud_url = "https://k8s.example".to_string();
        client.add_vim(k8s);
        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.hcx_cloud_url = "https://k8s.example".to_string();
        let err = validator.validate_cluster(&mut spec, &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::UnsupportedVim { ref name } if name == "k8s-only"));
    }

    #[tokio::test]
    async fn test_csi_and_harbor_normalization() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let validator = SpecValidator::new(&client);

        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.cluster_config = Some(ClusterConfigSpec {
            csi: vec![
                CsiEntry {
                    name: CSI_VSPHERE.to_string(),
                    properties: CsiProperties {
                        datastore_url: Some(DATASTORE_URL.to_string()),
                        datastore_name: Some("stale".to_string()),
                        ..Default::default()
                    },
                },
                CsiEntry {
                    name: CSI_NFS_CLIENT.to_string(),
                    properties: CsiProperties {
                        server_ip: Some("10.0.0.9".to_string()),
                        mount_path: Some("/export".to_string()),
                        ..Default::default()
                    },
                },
            ],
            tools: vec![ToolEntry {
                name: "harbor".to_string(),
                version: Some("2.x".to_string()),
                properties: Some(ToolProperties {
                    extension_id: Some("harbor-1".to_string()),
                    ..Default::default()
                }),
            }],
            ..Default::default()
        });

        validator.validate_cluster(&mut spec, &cancel).await.unwrap();
        let config = spec.cluster_config.as_ref().unwrap();
        assert_eq!(config.csi[0].properties.datastore_name.as_deref(), Some("vsanDatastore"));
        let harbor = config.tools[0].properties.as_ref().unwrap();
        assert_eq!(harbor.extension_id.as_deref(), Some(REPO_ID));
        assert_eq!(harbor.tool_type.as_deref(), Some("extension"));

        // nfs_client without a mount path
        let mut broken = spec.clone();
        broken.cluster_config.as_mut().unwrap().csi[1].properties.mount_path = None;
        let err = validator.validate_cluster(&mut broken, &cancel).await.unwrap_err();
        assert_eq!(reason(err), "nfs_client requires mountPath");

        // vsphere-csi pointing at an unknown datastore
        let mut broken = spec.clone();
        broken.cluster_config.as_mut().unwrap().csi[0].properties.datastore_url =
            Some("ds:///vmfs/volumes/unknown/".to_string());
        let err = validator.validate_cluster(&mut broken, &cancel).await.unwrap_err();
        assert!(reason(err).starts_with("datastore url"));
    }

    #[tokio::test]
    async fn test_node_pool_short_network_name_rewritten() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let cluster = create_test_cluster(EDGE_CLUSTER_ID, "edge-test01", ClusterType::Workload);

        let mut pool = create_test_node_spec("hwaccel");
        pool.networks.push(NodeNetwork {
            label: "N3".to_string(),
            network_name: "sriov-n3".to_string(),
            nameservers: vec![],
        });
        SpecValidator::new(&client)
            .validate_node_pool(&cluster, &mut pool, &cancel)
            .await
            .unwrap();

        let names: Vec<&str> = pool.networks.iter().map(|n| n.network_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["/Datacenter/network/tkg-dhcp", "/Datacenter/network/sriov-n3"]
        );
    }

    #[tokio::test]
    async fn test_node_pool_unknown_network_is_invalid_spec() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let cluster = create_test_cluster(EDGE_CLUSTER_ID, "edge-test01", ClusterType::Workload);

        let mut pool = create_test_node_spec("hwaccel");
        pool.networks.push(NodeNetwork {
            label: "N3".to_string(),
            network_name: "no-such-pg".to_string(),
            nameservers: vec![],
        });
        let err = SpecValidator::new(&client)
            .validate_node_pool(&cluster, &mut pool, &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 5);
        let reason = reason(err);
        assert!(reason.contains("network no-such-pg on node hwaccel"));
        assert!(client.mutating_calls().is_empty());
    }

    #[test]
    fn test_provider_spec_rules() {
        let client = create_test_client();
        let validator = SpecValidator::new(&client);
        let spec = CloudProviderSpec {
            hcx_cloud_url: "hcx.example".to_string(),
            vim_name: "core2".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        assert!(validator.validate_provider(&spec).is_ok());

        let spec = CloudProviderSpec {
            hcx_cloud_url: "http://hcx.example".to_string(),
            ..spec
        };
        assert!(validator.validate_provider(&spec).is_err());
    }

    #[tokio::test]
    async fn test_extension_vims_resolved() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let spec = ExtensionSpec {
            name: "harbor-2".to_string(),
            extension_type: ExtensionType::Repository,
            extension_subtype: "Harbor".to_string(),
            interface_info: InterfaceInfo {
                url: "https://harbor2.example".to_string(),
                ..Default::default()
            },
            access_info: AccessInfo {
                username: "admin".to_string(),
                password: "secret".to_string(),
            },
            vim_info: vec![ExtensionVimRef {
                vim_name: "edge-test01".to_string(),
            }],
            ..Default::default()
        };

        let vims = SpecValidator::new(&client)
            .validate_extension(&spec, &cancel)
            .await
            .unwrap();
        assert_eq!(vims.len(), 1);
        assert_eq!(vims[0].vim_id, K8S_VIM_ID);
        assert_eq!(vims[0].vim_system_uuid, format!("{}-hcx", K8S_TENANT_ID));

        let mut unknown = spec.clone();
        unknown.vim_info[0].vim_name = "nowhere".to_string();
        let err = SpecValidator::new(&client)
            .validate_extension(&unknown, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, TcaError::CloudProviderNotFound { .. }));
    }

    fn instance_spec(repo_url: &str) -> InstanceSpec {
        InstanceSpec {
            kind: Some(SpecKind::Instance),
            instance_name: "app-1".to_string(),
            catalog_name: "app".to_string(),
            cluster_name: "edge-test01".to_string(),
            node_pool: "default-pool01".to_string(),
            namespace: "app".to_string(),
            repo_url: repo_url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_instance_requires_linked_repository() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let validator = SpecValidator::new(&client);

        let resolved = validator
            .validate_instance(&instance_spec(REPO_URL), &cancel)
            .await
            .unwrap();
        assert_eq!(resolved.package.id, PACKAGE_ID);
        assert_eq!(resolved.cluster.id, EDGE_CLUSTER_ID);
        assert_eq!(resolved.pool.id, POOL_ID);
        assert_eq!(resolved.vim.vim_id, K8S_VIM_ID);
        assert_eq!(resolved.repository.id, REPO_ID);

        let err = validator
            .validate_instance(&instance_spec("https://nexus.example"), &cancel)
            .await
            .unwrap_err();
        assert!(reason(err).contains("not linked"));
        assert!(client.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_instance_url_under_linked_repository_is_not_linked() {
        let client = create_test_client();
        let cancel = CancellationToken::new();

        let err = SpecValidator::new(&client)
            .validate_instance(&instance_spec(&format!("{}/other-project", REPO_URL)), &cancel)
            .await
            .unwrap_err();

        assert!(reason(err).contains("not linked"));
    }
}
