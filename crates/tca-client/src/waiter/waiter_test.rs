//! Unit tests for the task waiter
//!
//! All tests run on a paused clock so the ten-second cadence costs nothing.

#[cfg(test)]
mod tests {
    use crate::cluster::ClusterOrchestrator;
    use crate::error::TcaError;
    use crate::models::*;
    use crate::test_utils::*;
    use crate::waiter::{TaskWaiter, POLL_INTERVAL};
    use reqwest::Method;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn handle() -> TaskHandle {
        TaskHandle {
            id: "T1".to_string(),
            operation_id: Some("Op1".to_string()),
            entity_id: None,
        }
    }

    fn tree(root: TaskStatus, children: &[(&str, TaskStatus)]) -> Vec<ClusterTask> {
        let children = children
            .iter()
            .enumerate()
            .map(|(i, (kind, status))| create_test_task(&format!("T1.{}", i), kind, *status, vec![]))
            .collect();
        vec![create_test_task("T1", "CREATE_CLUSTER", root, children)]
    }

    fn task_polls(client: &crate::MockTcaClient) -> usize {
        client.calls_to(Method::POST, "/hybridity/api/infra/k8s/tasks").len()
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_tree_waits_for_every_child() {
        // Setup
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_task_polls(
            "Op1",
            vec![
                tree(TaskStatus::InProgress, &[("DEPLOY_MASTER", TaskStatus::Success), ("DEPLOY_NODES", TaskStatus::InProgress)]),
                tree(TaskStatus::InProgress, &[("DEPLOY_MASTER", TaskStatus::Success), ("DEPLOY_NODES", TaskStatus::Success)]),
                tree(TaskStatus::Success, &[("DEPLOY_MASTER", TaskStatus::Success), ("DEPLOY_NODES", TaskStatus::Success)]),
            ],
        );
        let start = Instant::now();

        // Execute
        let tasks = TaskWaiter::new(&client)
            .wait_task_tree(&handle(), TaskStatus::Success, 10, false, &cancel)
            .await
            .unwrap();

        // Assert: three polls, two sleeps
        assert_eq!(tasks[0].status, TaskStatus::Success);
        assert_eq!(task_polls(&client), 3);
        assert_eq!(start.elapsed(), POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_child_ends_wait_on_that_poll() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let mut failing = tree(TaskStatus::InProgress, &[("DEPLOY_MASTER", TaskStatus::Success), ("DEPLOY_NODES", TaskStatus::Failed)]);
        failing[0].child_tasks[1].message = Some("no IP available".to_string());
        client.script_task_polls(
            "Op1",
            vec![
                tree(TaskStatus::InProgress, &[("DEPLOY_MASTER", TaskStatus::InProgress)]),
                failing,
            ],
        );
        let start = Instant::now();

        let err = TaskWaiter::new(&client)
            .wait_task_tree(&handle(), TaskStatus::Success, 10, true, &cancel)
            .await
            .unwrap_err();

        match err {
            TcaError::TaskFailed { phase, message } => {
                assert_eq!(phase, "DEPLOY_NODES");
                assert_eq!(message, "no IP available");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(task_polls(&client), 2);
        assert!(start.elapsed() <= POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_task_is_not_found() {
        let client = create_test_client();
        let cancel = CancellationToken::new();

        let err = TaskWaiter::new(&client)
            .wait_task_tree(&handle(), TaskStatus::Success, 10, false, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TcaError::TaskNotFound { ref id } if id == "Op1"));
        assert_eq!(task_polls(&client), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_not_yet_listed_is_polled_again() {
        // Setup
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_task_polls(
            "Op1",
            vec![vec![], vec![], tree(TaskStatus::Success, &[("DEPLOY_MASTER", TaskStatus::Success)])],
        );
        let start = Instant::now();

        // Execute
        let tasks = TaskWaiter::new(&client)
            .wait_task_tree(&handle(), TaskStatus::Success, 10, false, &cancel)
            .await
            .unwrap();

        // Assert
        assert_eq!(tasks[0].status, TaskStatus::Success);
        assert_eq!(task_polls(&client), 3);
        assert_eq!(start.elapsed(), POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_reports_unlisted_task() {
        let client = create_test_client();
        let cancel = CancellationToken::new();

        let err = TaskWaiter::new(&client)
            .wait_task_tree(&handle(), TaskStatus::Success, 1, false, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TcaError::TaskNotFound { .. }));
        assert_eq!(task_polls(&client), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_tree_deadline() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_task_polls("Op1", vec![tree(TaskStatus::InProgress, &[])]);
        let start = Instant::now();

        let err = TaskWaiter::new(&client)
            .wait_task_tree(&handle(), TaskStatus::Success, 3, false, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TcaError::DeadlineExceeded { attempts: 3 }));
        assert_eq!(task_polls(&client), 3);
        // No sleep after the final attempt
        assert_eq!(start.elapsed(), POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep() {
        // Setup: a task that never finishes and a cancel mid-interval
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_task_polls("Op1", vec![tree(TaskStatus::InProgress, &[])]);
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            trigger.cancel();
        });
        let start = Instant::now();

        // Execute
        let err = TaskWaiter::new(&client)
            .wait_task_tree(&handle(), TaskStatus::Success, 100, false, &cancel)
            .await
            .unwrap_err();

        // Assert: returned at the cancel, not at the next poll
        assert!(matches!(err, TcaError::TaskCancelled));
        assert_eq!(start.elapsed(), Duration::from_secs(25));
        assert_eq!(task_polls(&client), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_makes_no_calls() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = TaskWaiter::new(&client)
            .wait_task_tree(&handle(), TaskStatus::Success, 10, false, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, TcaError::TaskCancelled));

        let err = TaskWaiter::new(&client)
            .wait_instance_state("I1", "INSTANTIATED", 10, false, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, TcaError::TaskCancelled));
        assert!(client.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_handle_has_nothing_to_wait_for() {
        let client = create_test_client();
        let cancel = CancellationToken::new();

        let tasks = TaskWaiter::new(&client)
            .wait_task_tree(&TaskHandle::empty(), TaskStatus::Success, 10, false, &cancel)
            .await
            .unwrap();

        assert!(tasks.is_empty());
        assert!(client.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entity_only_handle_tracks_cluster_tasks() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_task_polls(EDGE_CLUSTER_ID, vec![tree(TaskStatus::Success, &[])]);
        let handle = TaskHandle {
            entity_id: Some(EDGE_CLUSTER_ID.to_string()),
            ..TaskHandle::default()
        };

        TaskWaiter::new(&client)
            .wait_task_tree(&handle, TaskStatus::Success, 10, false, &cancel)
            .await
            .unwrap();

        let polls = client.calls_to(Method::POST, "/hybridity/api/infra/k8s/tasks");
        assert_eq!(
            polls[0].body.as_ref().unwrap()["filter"]["clusterIds"][0],
            EDGE_CLUSTER_ID
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_management_cluster_and_wait() {
        // Setup
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let handle = ClusterOrchestrator::new(&client)
            .create_cluster(create_test_cluster_spec("mgmt2", ClusterType::Management), &cancel)
            .await
            .unwrap();
        let operation = handle.operation_id.clone().unwrap();
        client.script_task_polls(
            operation,
            vec![
                tree(TaskStatus::InProgress, &[("DEPLOY_MASTER", TaskStatus::InProgress)]),
                tree(TaskStatus::Success, &[("DEPLOY_MASTER", TaskStatus::Success), ("DEPLOY_NODES", TaskStatus::Success)]),
            ],
        );

        // Execute
        let tasks = TaskWaiter::new(&client)
            .wait_task_tree(&handle, TaskStatus::Success, 360, false, &cancel)
            .await
            .unwrap();

        // Assert
        assert_eq!(tasks[0].child_tasks.len(), 2);
        assert_eq!(task_polls(&client), 2);
    }

    fn instance(state: InstantiationState, op_state: Option<LcmOperationState>) -> LcmInfo {
        create_test_instance("I1", "app-1", state, op_state, &[])
    }

    #[tokio::test(start_paused = true)]
    async fn test_instance_state_prefix_match() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_instance_polls(
            "I1",
            vec![
                instance(InstantiationState::NotInstantiated, Some(LcmOperationState::Processing)),
                instance(InstantiationState::NotInstantiated, Some(LcmOperationState::Processing)),
                instance(InstantiationState::Instantiated, Some(LcmOperationState::Completed)),
            ],
        );
        let start = Instant::now();

        let info = TaskWaiter::new(&client)
            .wait_instance_state("I1", "INSTANTIATED", 10, true, &cancel)
            .await
            .unwrap();

        assert_eq!(info.state(), Some(InstantiationState::Instantiated));
        assert_eq!(start.elapsed(), POLL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_instance_failed_temp_is_lcm_failure() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_instance_polls(
            "I1",
            vec![
                instance(InstantiationState::NotInstantiated, Some(LcmOperationState::Processing)),
                instance(InstantiationState::NotInstantiated, Some(LcmOperationState::FailedTemp)),
            ],
        );

        let err = TaskWaiter::new(&client)
            .wait_instance_state("I1", "INSTANTIATED", 10, false, &cancel)
            .await
            .unwrap_err();

        match err {
            TcaError::LcmFailed { instance, operation } => {
                assert_eq!(instance, "app-1");
                assert_eq!(operation, "INSTANTIATE");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_instance_wait_deadline() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        client.script_instance_polls(
            "I1",
            vec![instance(InstantiationState::NotInstantiated, Some(LcmOperationState::Processing))],
        );

        let err = TaskWaiter::new(&client)
            .wait_instance_state("I1", "INSTANTIATED", 2, false, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TcaError::DeadlineExceeded { attempts: 2 }));
        assert_eq!(client.calls_to(Method::GET, "/vnf_instances/I1").len(), 2);
    }
}
