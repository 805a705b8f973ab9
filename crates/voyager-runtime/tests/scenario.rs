//! End-to-end scenarios through the assembled engine.

use std::sync::Arc;
use std::time::Duration;

use voyager_contacts::{ContactRepository, JsonFileContactRepository, TrustedContactStore};
use voyager_dispatch::MemoryDispatchSink;
use voyager_emergency::{EmergencyEvent, HoldGesture};
use voyager_runtime::{VoyagerConfig, VoyagerEngine};
use voyager_safety::SafetyEvent;
use voyager_types::{
    AlertChannel, AlertTarget, DangerZone, EmergencyContact, Position, SafetyStatus, Severity,
    ZoneKind,
};

fn sealdah_only() -> VoyagerConfig {
    VoyagerConfig {
        zones: vec![DangerZone::new(
            "sealdah",
            "Sealdah Transit Perimeter",
            Position::new(22.5671, 88.3712),
            400.0,
            ZoneKind::TransitPerimeter,
        )],
        ..Default::default()
    }
}

fn circle() -> Vec<EmergencyContact> {
    vec![
        EmergencyContact::new("c1", "Asha", "+91 98300 12345", "Sister"),
        EmergencyContact::new("c2", "Rahul", "+91 98300 54321", "Friend"),
    ]
}

async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test]
async fn breach_then_departure() {
    let sink = Arc::new(MemoryDispatchSink::new());
    let engine = VoyagerEngine::new(
        &sealdah_only(),
        Arc::new(TrustedContactStore::new()),
        sink.clone(),
    )
    .unwrap();
    let mut events = engine.subscribe_safety();

    let change = engine.ingest_position(22.5675, 88.3712).unwrap();
    assert_eq!(change.from, SafetyStatus::Safe);
    assert_eq!(change.to, SafetyStatus::Caution);

    let change = engine.ingest_position(22.60, 88.40).unwrap();
    assert_eq!(change.to, SafetyStatus::Safe);
    assert_eq!(engine.status(), SafetyStatus::Safe);

    let mut notifications = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let SafetyEvent::Notification(notification) = event {
            notifications.push(notification);
        }
    }
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].severity, Severity::Caution);
    assert_eq!(notifications[0].message, "Security Caution: Perimeter Buffer Reached");
    assert_eq!(notifications[0].vibration_ms, vec![200, 100, 200]);

    // Nothing leaves the device for a perimeter caution
    assert!(sink.is_empty());
}

#[tokio::test(start_paused = true)]
async fn emergency_ignores_geofence_until_confirmed_cancel() {
    let sink = Arc::new(MemoryDispatchSink::new());
    let contacts = Arc::new(TrustedContactStore::from_contacts(circle()));
    let engine = VoyagerEngine::new(&sealdah_only(), contacts, sink.clone()).unwrap();
    let mut emergency = engine.subscribe_emergency();

    engine.ingest_position(22.5675, 88.3712);
    assert_eq!(engine.status(), SafetyStatus::Caution);

    let session = engine.declare_emergency().unwrap();
    assert!(engine.declare_emergency().is_none());

    // Samples never move the status out of EMERGENCY
    assert!(engine.ingest_position(22.60, 88.40).is_none());
    assert!(engine.ingest_position(22.5675, 88.3712).is_none());
    assert_eq!(engine.status(), SafetyStatus::Emergency);
    assert_eq!(engine.telemetry().suppressed_in_emergency, 2);

    assert!(engine.set_broadcast(true).unwrap());
    engine.dial_authorities();

    engine.confirm_cancel_hold(HoldGesture::Start).unwrap();
    advance_ms(2_000).await;
    engine.confirm_cancel_hold(HoldGesture::Stop).unwrap();
    assert_eq!(engine.status(), SafetyStatus::Emergency);

    engine.confirm_cancel_hold(HoldGesture::Start).unwrap();
    advance_ms(5_100).await;
    assert_eq!(engine.status(), SafetyStatus::Safe);
    assert!(engine.session().is_none());

    let requests = sink.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].channel, AlertChannel::Message);
    assert_eq!(requests[0].contact_id().map(|id| id.as_str()), Some("c1"));
    assert!(requests[0]
        .message_body()
        .unwrap()
        .ends_with("maps?q=22.567500,88.371200"));
    assert_eq!(requests[1].target, AlertTarget::Authorities);

    // The broadcast died with the session
    advance_ms(120_000).await;
    assert_eq!(sink.len(), 2);

    let mut ended = 0;
    while let Ok(event) = emergency.try_recv() {
        assert_eq!(event.session_id(), Some(&session));
        if matches!(event, EmergencyEvent::SessionEnded { .. }) {
            ended += 1;
        }
    }
    assert_eq!(ended, 1);

    // Back to normal geofence handling
    assert!(engine.ingest_position(22.5675, 88.3712).is_some());
    assert_eq!(engine.status(), SafetyStatus::Caution);
}

#[tokio::test(start_paused = true)]
async fn removing_primary_redirects_next_broadcast() {
    let dir = tempfile::tempdir().unwrap();
    let repository = JsonFileContactRepository::new(dir.path().join("contacts.json"));
    repository.save(&circle()).await.unwrap();

    let contacts = Arc::new(TrustedContactStore::load_from(&repository).await.unwrap());
    let sink = Arc::new(MemoryDispatchSink::new());
    let engine = VoyagerEngine::new(&VoyagerConfig::default(), contacts, sink.clone()).unwrap();

    engine.declare_emergency().unwrap();
    engine.set_broadcast(true).unwrap();

    assert!(engine.contacts().remove(&"c1".into()));
    advance_ms(60_100).await;

    let recipients: Vec<String> = sink
        .requests()
        .iter()
        .filter_map(|r| r.contact_id().map(|id| id.to_string()))
        .collect();
    assert_eq!(recipients, ["c1", "c2"]);

    // Without a fix the heartbeat still goes out with the fallback text
    assert!(sink.requests()[1]
        .message_body()
        .unwrap()
        .ends_with("Coordinates unavailable."));

    engine.shutdown();
    engine.contacts().save_to(&repository).await.unwrap();
    assert_eq!(repository.load().await.unwrap().len(), 1);
}
