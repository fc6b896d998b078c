//! Inventory, plan and cleanup against a mock server.

use super::authenticated_client;
use crate::{
    ApiError, CleanupOptions, CleanupService, DeletionRequest, InventoryService, PlanPolicy,
    PlannerService, ResourceKind, Risk,
};
use serde_json::json;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const DAY: u64 = 86_400;

fn no_pause() -> CleanupOptions {
    CleanupOptions {
        pacing: Duration::ZERO,
        watched_storage: None,
        settle: Duration::ZERO,
    }
}

fn days_ago(days: u64) -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        - days * DAY
}

async fn mount_get(mock_server: &MockServer, api_path: &str, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api2/json/{api_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(mock_server)
        .await;
}

fn task(upid: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": upid }))
}

#[tokio::test]
async fn test_plan_and_execute_against_inventory() {
    let mock_server = MockServer::start().await;
    let api = authenticated_client(&mock_server);

    mount_get(
        &mock_server,
        "nodes/pve/qemu",
        json!([{"vmid": 100, "name": "web", "status": "running"}]),
    )
    .await;
    mount_get(
        &mock_server,
        "nodes/pve/lxc",
        json!([{"vmid": "101", "name": "dns", "status": "stopped"}]),
    )
    .await;
    mount_get(&mock_server, "nodes/pve/storage", json!([])).await;
    mount_get(
        &mock_server,
        "nodes/pve/qemu/100/snapshot",
        json!([
            {"name": "pre-upgrade", "snaptime": days_ago(40), "description": "before 8.2"},
            {"name": "weekly", "snaptime": days_ago(10)},
            {"name": "current", "description": "You are here!"}
        ]),
    )
    .await;
    mount_get(
        &mock_server,
        "nodes/pve/lxc/101/snapshot",
        json!([
            {"name": "nightly", "snaptime": days_ago(1)},
            {"name": "current"}
        ]),
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve/qemu/100/snapshot/pre-upgrade"))
        .respond_with(task("UPID:pve:0001"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve/qemu/100/snapshot/weekly"))
        .respond_with(task("UPID:pve:0002"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let inventory = InventoryService::new(&api).build("pve").await;
    assert_eq!(inventory.snapshot_count(), 3);
    // Only the guest and storage listings are mounted.
    assert!(inventory.unavailable.contains(&"nodes/pve/status".to_string()));
    assert!(!inventory.unavailable.iter().any(|p| p.ends_with("qemu") || p.ends_with("lxc")));

    let plan = PlannerService::new(PlanPolicy {
        min_age_days: 0,
        max_risk: Risk::Medium,
        resources: Vec::new(),
    })
    .plan(&inventory, SystemTime::now());
    let chosen: Vec<(&str, Risk)> = plan
        .candidates
        .iter()
        .map(|c| (c.snapshot.as_str(), c.risk))
        .collect();
    assert_eq!(
        chosen,
        vec![("pre-upgrade", Risk::Low), ("weekly", Risk::Medium)]
    );

    let summary = CleanupService::new(&api, no_pause())
        .execute(plan.requests().unwrap())
        .await;
    assert_eq!(summary.success_count(), 2);
    let tasks: Vec<Option<&str>> = summary
        .outcomes
        .iter()
        .map(|o| o.task.as_deref())
        .collect();
    assert_eq!(tasks, vec![Some("UPID:pve:0001"), Some("UPID:pve:0002")]);
}

#[tokio::test]
async fn test_failed_deletion_does_not_stop_the_batch() {
    let mock_server = MockServer::start().await;
    let api = authenticated_client(&mock_server);

    for (vmid, status) in [(100, 200), (101, 500), (102, 200)] {
        Mock::given(method("DELETE"))
            .and(path(format!("/api2/json/nodes/pve/lxc/{vmid}/snapshot/nightly")))
            .respond_with(if status == 200 {
                task("UPID:pve:ok")
            } else {
                ResponseTemplate::new(status).set_body_string("CT is locked (backup)")
            })
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let requests: Vec<DeletionRequest> = (100..103)
        .map(|vmid| {
            DeletionRequest::new(
                ResourceKind::Container,
                "pve",
                vmid,
                "nightly",
                format!("CT {vmid}"),
            )
            .unwrap()
        })
        .collect();
    let summary = CleanupService::new(&api, no_pause()).execute(requests).await;

    assert_eq!(summary.success_count(), 2);
    assert_eq!(summary.failed_count(), 1);
    let flags: Vec<bool> = summary.outcomes.iter().map(|o| o.success).collect();
    assert_eq!(flags, vec![true, false, true]);

    let failure = summary.failures().next().unwrap();
    assert_eq!(failure.request.vmid(), 101);
    assert_eq!(
        failure.error,
        Some(ApiError::Status {
            status: 500,
            body: "CT is locked (backup)".to_string()
        })
    );
}

#[tokio::test]
async fn test_second_run_of_same_request_reports_failure() {
    let mock_server = MockServer::start().await;
    let api = authenticated_client(&mock_server);

    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve/qemu/114/snapshot/weekly"))
        .respond_with(task("UPID:pve:0003"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api2/json/nodes/pve/qemu/114/snapshot/weekly"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("snapshot 'weekly' does not exist"),
        )
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let request =
        DeletionRequest::new(ResourceKind::Vm, "pve", 114, "weekly", "VM 114 (ha)").unwrap();
    let service = CleanupService::new(&api, no_pause());

    let first = service.execute(vec![request.clone()]).await;
    assert_eq!(first.success_count(), 1);
    assert_eq!(first.outcomes[0].task.as_deref(), Some("UPID:pve:0003"));

    let second = service.execute(vec![request]).await;
    assert_eq!(second.outcomes.len(), 1);
    assert_eq!(second.failed_count(), 1);
    assert_eq!(
        second.outcomes[0].error.as_ref().and_then(ApiError::status),
        Some(500)
    );
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}
