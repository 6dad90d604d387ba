//! Unit tests for the cluster orchestrator

#[cfg(test)]
mod tests {
    use crate::cluster::ClusterOrchestrator;
    use crate::error::{EntityKind, TcaError};
    use crate::models::*;
    use crate::test_utils::*;
    use reqwest::Method;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_create_cluster_submits_normalized_spec() {
        // Setup
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let spec = create_test_cluster_spec("mgmt2", ClusterType::Management);

        // Execute
        let handle = ClusterOrchestrator::new(&client)
            .create_cluster(spec, &cancel)
            .await
            .unwrap();

        // Assert: one create request carrying ids and full network paths
        assert!(!handle.is_empty());
        let posts = client.calls_to(Method::POST, "/hybridity/api/infra/k8s/clusters");
        assert_eq!(posts.len(), 1);
        let body = posts[0].body.as_ref().unwrap();
        assert_eq!(body["clusterTemplateId"], MGMT_TEMPLATE_ID);
        assert_eq!(
            body["workerNodes"][0]["networks"][0]["networkName"],
            "/Datacenter/network/tkg-dhcp"
        );
        assert!(body.get("kind").is_none());
    }

    #[tokio::test]
    async fn test_create_cluster_rejected_spec_is_never_submitted() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let mut spec = create_test_cluster_spec("mgmt2", ClusterType::Management);
        spec.vm_template = "ubuntu-2004".to_string();

        let err = ClusterOrchestrator::new(&client)
            .create_cluster(spec, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TcaError::InvalidSpec { .. }));
        assert!(client.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cluster_by_name() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let orchestrator = ClusterOrchestrator::new(&client);

        // Management cluster with a workload child is refused by the server
        let err = orchestrator.delete_cluster("mgmt1", &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::ServerRejected { status: 400, .. }));

        let handle = orchestrator.delete_cluster("edge-test01", &cancel).await.unwrap();
        assert_eq!(handle.entity_id.as_deref(), Some(EDGE_CLUSTER_ID));
        assert_eq!(
            client
                .calls_to(Method::DELETE, &format!("/clusters/{}", EDGE_CLUSTER_ID))
                .len(),
            1
        );

        let err = orchestrator.delete_cluster("edge-test01", &cancel).await.unwrap_err();
        assert!(err.is_not_found(EntityKind::Cluster));
    }

    #[tokio::test]
    async fn test_node_pool_dry_run_makes_no_mutation() {
        // Setup
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let spec = create_test_node_spec("pool02");

        // Execute
        let handle = ClusterOrchestrator::new(&client)
            .create_node_pool("edge-test01", spec, true, &cancel)
            .await
            .unwrap();

        // Assert: validation ran against the inventory, nothing was submitted
        assert!(handle.is_empty());
        assert!(!client.calls_to(Method::POST, "/hybridity/api/nfv/networks").is_empty());
        assert!(client.calls_to(Method::POST, "/nodepool").is_empty());
        assert!(client.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_node_pool_dry_run_still_validates() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let mut spec = create_test_node_spec("pool02");
        spec.networks[0].network_name = "vlan-404".to_string();

        let err = ClusterOrchestrator::new(&client)
            .create_node_pool("edge-test01", spec, true, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TcaError::NetworkNotFound { .. }));
        assert!(client.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_node_pool_submits() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let orchestrator = ClusterOrchestrator::new(&client);

        let handle = orchestrator
            .create_node_pool(EDGE_CLUSTER_ID, create_test_node_spec("pool02"), false, &cancel)
            .await
            .unwrap();

        assert!(!handle.is_empty());
        let posts = client.calls_to(
            Method::POST,
            &format!("/cluster/{}/nodepool", EDGE_CLUSTER_ID),
        );
        assert_eq!(posts.len(), 1);
        assert_eq!(
            posts[0].body.as_ref().unwrap()["networks"][0]["networkName"],
            "/Datacenter/network/tkg-dhcp"
        );
        let pools = orchestrator.list_node_pools("edge-test01", &cancel).await.unwrap();
        assert_eq!(pools.len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_node_pool_by_name() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let orchestrator = ClusterOrchestrator::new(&client);
        let mut spec = create_test_node_spec("default-pool01");
        spec.replica = 3;

        orchestrator
            .update_node_pool("edge-test01", "default-pool01", spec, &cancel)
            .await
            .unwrap();
        let puts = client.calls_to(Method::PUT, &format!("/nodepool/{}", POOL_ID));
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].body.as_ref().unwrap()["replica"], 3);
        assert_eq!(puts[0].body.as_ref().unwrap()["id"], POOL_ID);

        let pool = orchestrator
            .get_node_pool("edge-test01", "default-pool01", &cancel)
            .await
            .unwrap();
        assert_eq!(pool.replica, 3);

        orchestrator
            .delete_node_pool("edge-test01", POOL_ID, &cancel)
            .await
            .unwrap();
        assert_eq!(client.calls_to(Method::DELETE, &format!("/nodepool/{}", POOL_ID)).len(), 1);
        let err = orchestrator
            .get_node_pool("edge-test01", "default-pool01", &cancel)
            .await
            .unwrap_err();
        assert!(err.is_not_found(EntityKind::NodePool));
    }

    #[tokio::test]
    async fn test_get_kubeconfig_decodes_blob() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let mut cluster = create_test_cluster("c0000000-0000-4000-8000-000000000003", "edge-kc", ClusterType::Workload);
        cluster.cluster_config = Some(ClusterConfigSpec {
            kube_config: Some("YXBpVmVyc2lvbjogdjE=".to_string()),
            ..Default::default()
        });
        client.add_cluster(cluster);
        let orchestrator = ClusterOrchestrator::new(&client);

        let kubeconfig = orchestrator.get_kubeconfig("edge-kc", &cancel).await.unwrap();
        assert_eq!(kubeconfig, "apiVersion: v1");

        let err = orchestrator.get_kubeconfig("mgmt1", &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::InvalidSpec { .. }));
    }

    #[tokio::test]
    async fn test_change_cluster_password() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let orchestrator = ClusterOrchestrator::new(&client);

        let err = orchestrator
            .change_cluster_password("mgmt1", "old", " ", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, TcaError::InvalidSpec { .. }));
        assert!(client.calls().is_empty());

        orchestrator
            .change_cluster_password("mgmt1", "old", "new", &cancel)
            .await
            .unwrap();
        let puts = client.calls_to(Method::PUT, "/clusterpassword");
        assert_eq!(puts.len(), 1);
        let body = puts[0].body.as_ref().unwrap();
        assert_eq!(body["existingClusterPassword"], "old");
        assert_eq!(body["clusterPassword"], "new");
    }

    #[tokio::test]
    async fn test_tasks_for_cluster_and_task_actions() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_task_polls(
            EDGE_CLUSTER_ID,
            vec![vec![create_test_task("T1", "CREATE_CLUSTER", TaskStatus::Failed, vec![])]],
        );
        let orchestrator = ClusterOrchestrator::new(&client);

        let tasks = orchestrator.list_tasks("edge-test01", &cancel).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Failed);

        orchestrator.retry_task("T1", &cancel).await.unwrap();
        orchestrator.abort_task("T1", &cancel).await.unwrap();
        assert_eq!(client.calls_to(Method::POST, "/operations/T1/retry").len(), 1);
        assert_eq!(client.calls_to(Method::POST, "/operations/T1/abort").len(), 1);
    }

    #[tokio::test]
    async fn test_template_lifecycle() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let orchestrator = ClusterOrchestrator::new(&client);

        let duplicate = create_test_template("", "mgmt-template", ClusterType::Management, &[]);
        let err = orchestrator.create_template(&duplicate, &cancel).await.unwrap_err();
        assert!(matches!(err, TcaError::InvalidSpec { .. }));

        let mut template = create_test_template("", "edge-template", ClusterType::Workload, &["pool-a"]);
        template.id = None;
        let created = orchestrator.create_template(&template, &cancel).await.unwrap();
        assert!(!created.id().is_empty());
        assert_eq!(
            orchestrator.get_template("edge-template", &cancel).await.unwrap().id(),
            created.id()
        );

        template.description = Some("edge pools".to_string());
        let updated = orchestrator
            .update_template("edge-template", &template, &cancel)
            .await
            .unwrap();
        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.description.as_deref(), Some("edge pools"));

        orchestrator.delete_template(created.id(), &cancel).await.unwrap();
        assert_eq!(orchestrator.list_templates(&cancel).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_template_in_use_is_refused() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let mut cluster = create_test_cluster("c0000000-0000-4000-8000-000000000004", "mgmt3", ClusterType::Management);
        cluster.cluster_template_id = MGMT_TEMPLATE_ID.to_string();
        client.add_cluster(cluster);

        let err = ClusterOrchestrator::new(&client)
            .delete_template("mgmt-template", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TcaError::InvalidSpec { ref reason } if reason.contains("mgmt3")));
        assert!(client.calls_to(Method::DELETE, "/clusterTemplates").is_empty());
    }
}
