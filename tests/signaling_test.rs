//! Contract tests for the gateway HTTP client.
//!
//! Each test runs against a local canned-response server; no network or
//! real gateway is involved.

mod support;

use anyhow::Result;
use fleetcam::StreamError;
use support::MockGateway;

const FAKE_OFFER: &str = "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\n";
const FAKE_ANSWER: &str = "v=0\r\no=- 9988776655443322110 2 IN IP4 127.0.0.1\r\ns=-\r\n";

#[tokio::test]
async fn negotiate_posts_sdp_and_returns_answer_verbatim() -> Result<()> {
    let gateway = MockGateway::spawn("200 OK", "application/sdp", FAKE_ANSWER).await;
    let client = gateway.client();

    let answer = client.negotiate("cam-1", FAKE_OFFER).await?;
    assert_eq!(answer, FAKE_ANSWER);

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.starts_with("post /cameras/cam-1/webrtc http/1.1"));
    assert!(request.contains("content-type: application/sdp"));
    assert!(request.contains("x-api-key: test-key"));
    assert!(request.contains("authorization: bearer test-token"));
    assert!(request.contains("v=0"));
    Ok(())
}

#[tokio::test]
async fn negotiate_maps_non_200_to_signaling_failure() {
    let gateway = MockGateway::spawn("500 Internal Server Error", "text/plain", "relay down").await;
    let client = gateway.client();

    let result = client.negotiate("cam-5", FAKE_OFFER).await;
    match result {
        Err(StreamError::Signaling(message)) => {
            assert!(message.contains("500"), "message was: {}", message);
            assert!(message.contains("cam-5"));
        }
        other => panic!("expected signaling failure, got {:?}", other),
    }
}

#[tokio::test]
async fn negotiate_treats_other_success_codes_as_failure() {
    // Only a plain 200 carries an answer; anything else is a failure.
    let gateway = MockGateway::spawn("204 No Content", "application/sdp", "").await;
    let client = gateway.client();

    assert!(matches!(
        client.negotiate("cam-2", FAKE_OFFER).await,
        Err(StreamError::Signaling(_))
    ));
}

#[tokio::test]
async fn negotiate_fails_fast_when_gateway_is_unreachable() {
    let config = fleetcam::config::GatewayConfig {
        base_url: "http://127.0.0.1:9".to_string(), // discard port, nothing listens
        api_key: String::new(),
        bearer_token: None,
        request_timeout_ms: 1_000,
    };
    let client = fleetcam::SignalingClient::new(&config).unwrap();

    assert!(matches!(
        client.negotiate("cam-1", FAKE_OFFER).await,
        Err(StreamError::Signaling(_))
    ));
}

#[tokio::test]
async fn list_cameras_decodes_the_gateway_payload() -> Result<()> {
    let body = r#"[
        {"id":"cam-1","name":"Bed cam","device_id":"printer-1"},
        {"id":"cam-2","name":"Nozzle cam","enabled":false}
    ]"#;
    let gateway = MockGateway::spawn("200 OK", "application/json", body).await;
    let client = gateway.client();

    let cameras = client.list_cameras().await?;
    assert_eq!(cameras.len(), 2);
    assert_eq!(cameras[0].id, "cam-1");
    assert_eq!(cameras[0].device_id.as_deref(), Some("printer-1"));
    assert!(cameras[0].enabled); // defaulted
    assert!(!cameras[1].enabled);

    let requests = gateway.requests();
    assert!(requests[0].starts_with("get /cameras http/1.1"));
    Ok(())
}

#[tokio::test]
async fn toggle_camera_returns_the_updated_flag() -> Result<()> {
    let gateway = MockGateway::spawn("200 OK", "application/json", r#"{"enabled":false}"#).await;
    let client = gateway.client();

    let enabled = client.toggle_camera("cam-9").await?;
    assert!(!enabled);

    let requests = gateway.requests();
    assert!(requests[0].starts_with("patch /cameras/cam-9/toggle http/1.1"));
    Ok(())
}

#[tokio::test]
async fn snapshot_returns_raw_bytes() -> Result<()> {
    let gateway = MockGateway::spawn("200 OK", "image/jpeg", "\u{00ff}jpegdata").await;
    let client = gateway.client();

    let bytes = client.fetch_snapshot("cam-3").await?;
    assert!(!bytes.is_empty());

    let requests = gateway.requests();
    assert!(requests[0].starts_with("get /cameras/cam-3/snapshot http/1.1"));
    Ok(())
}

#[tokio::test]
async fn gateway_errors_use_the_gateway_variant() {
    let gateway = MockGateway::spawn("503 Service Unavailable", "text/plain", "maintenance").await;
    let client = gateway.client();

    assert!(matches!(
        client.list_cameras().await,
        Err(StreamError::Gateway(_))
    ));
    assert!(matches!(
        client.toggle_camera("cam-1").await,
        Err(StreamError::Gateway(_))
    ));
    assert!(matches!(
        client.fetch_snapshot("cam-1").await,
        Err(StreamError::Gateway(_))
    ));
}
