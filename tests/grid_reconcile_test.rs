//! Grid orchestrator lifecycle: reconcile, expand, sweep, teardown.

mod support;

use fleetcam::stream::{RetryPolicy, SessionOptions, StreamSession};
use fleetcam::types::CameraSource;
use fleetcam::views::layout::ColumnMode;
use fleetcam::views::GridOrchestrator;
use fleetcam::StreamError;
use std::time::Duration;
use support::MockGateway;

fn cameras(ids: &[&str]) -> Vec<CameraSource> {
    ids.iter()
        .map(|id| CameraSource::new(*id, format!("Camera {}", id)))
        .collect()
}

fn offline_options() -> SessionOptions {
    SessionOptions {
        ice_servers: Vec::new(),
    }
}

async fn grid_with(gateway: &MockGateway, retry: RetryPolicy) -> GridOrchestrator {
    GridOrchestrator::new(gateway.client(), offline_options(), retry)
}

#[tokio::test]
async fn three_cameras_yield_three_sessions_and_two_columns() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "down").await;
    let mut grid = grid_with(&gateway, RetryPolicy::None).await;

    grid.sync_cameras(&cameras(&["1", "2", "3"])).await;

    assert_eq!(grid.len(), 3);
    assert_eq!(grid.columns(), 2); // ceil(sqrt(3)) = 2

    let statuses = grid.statuses();
    assert_eq!(statuses.len(), 3);
    let ids: Vec<&str> = statuses.iter().map(|s| s.camera_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    grid.close_all().await;
}

#[tokio::test]
async fn removing_a_camera_closes_its_session_and_keeps_the_rest() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "down").await;
    let mut grid = grid_with(&gateway, RetryPolicy::None).await;

    grid.sync_cameras(&cameras(&["1", "2", "3"])).await;
    let dropped = grid.session("2").unwrap().clone();
    let kept = grid.session("1").unwrap().clone();
    let kept_id = kept.id();

    grid.sync_cameras(&cameras(&["1", "3"])).await;

    assert!(dropped.is_closed());
    assert!(!kept.is_closed());
    // Survivors keep their session instance; no churn on reconcile.
    assert_eq!(grid.session("1").unwrap().id(), kept_id);
    assert_eq!(grid.len(), 2);

    grid.close_all().await;
}

#[tokio::test]
async fn close_all_closes_every_session_exactly_once() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "down").await;
    let mut grid = grid_with(&gateway, RetryPolicy::None).await;

    grid.sync_cameras(&cameras(&["1", "2", "3", "4"])).await;
    let handles: Vec<StreamSession> = ["1", "2", "3", "4"]
        .iter()
        .map(|id| grid.session(id).unwrap().clone())
        .collect();

    grid.close_all().await;

    assert!(grid.is_empty());
    for handle in &handles {
        assert!(handle.is_closed());
    }

    // A second pass over the handles is a no-op, not a double close.
    for handle in &handles {
        handle.close().await;
        assert!(handle.is_closed());
    }
}

#[tokio::test]
async fn column_preference_never_touches_sessions() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "down").await;
    let mut grid = grid_with(&gateway, RetryPolicy::None).await;

    grid.sync_cameras(&cameras(&["1", "2", "3"])).await;
    let before: Vec<uuid::Uuid> = grid.statuses().iter().map(|s| s.session_id).collect();

    grid.set_column_mode(ColumnMode::Fixed(1));
    assert_eq!(grid.columns(), 1);
    grid.set_column_mode(ColumnMode::Auto);
    assert_eq!(grid.columns(), 2);

    let after: Vec<uuid::Uuid> = grid.statuses().iter().map(|s| s.session_id).collect();
    assert_eq!(before, after);

    grid.close_all().await;
}

#[tokio::test]
async fn expand_opens_an_independent_session() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "down").await;
    let mut grid = grid_with(&gateway, RetryPolicy::None).await;

    grid.sync_cameras(&cameras(&["1"])).await;
    let tile_session = grid.session("1").unwrap().clone();

    let expanded = grid.expand("1").await.unwrap();
    assert_ne!(expanded.id(), tile_session.id());

    // Closing the expanded view leaves the grid tile alone.
    expanded.close().await;
    assert!(!tile_session.is_closed());

    grid.close_all().await;
}

#[tokio::test]
async fn expand_of_an_unknown_camera_is_unavailable() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "down").await;
    let mut grid = grid_with(&gateway, RetryPolicy::None).await;

    grid.sync_cameras(&cameras(&["1"])).await;
    match grid.expand("ghost").await {
        Err(StreamError::CameraUnavailable(message)) => assert!(message.contains("ghost")),
        other => panic!("expected CameraUnavailable, got {:?}", other.map(|s| s.state())),
    }

    grid.close_all().await;
}

#[tokio::test]
async fn sweep_reopens_nothing_under_the_default_policy() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "down").await;
    let mut grid = grid_with(&gateway, RetryPolicy::None).await;

    grid.sync_cameras(&cameras(&["1", "2"])).await;
    let before: Vec<uuid::Uuid> = grid.statuses().iter().map(|s| s.session_id).collect();

    assert_eq!(grid.sweep_failed().await, 0);
    let after: Vec<uuid::Uuid> = grid.statuses().iter().map(|s| s.session_id).collect();
    assert_eq!(before, after);

    grid.close_all().await;
}

#[tokio::test]
async fn sweep_replaces_failed_sessions_under_a_fixed_policy() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "down").await;
    let retry = RetryPolicy::FixedDelay {
        delay: Duration::from_millis(0),
        max_attempts: 1,
    };
    let mut grid = grid_with(&gateway, retry).await;

    grid.sync_cameras(&cameras(&["1"])).await;
    let failed = grid.session("1").unwrap().clone();

    let reopened = grid.sweep_failed().await;
    assert_eq!(reopened, 1);
    assert!(failed.is_closed());
    assert_ne!(grid.session("1").unwrap().id(), failed.id());

    // The budget is one attempt; the replacement also failed but stays.
    assert_eq!(grid.sweep_failed().await, 0);

    grid.close_all().await;
}
