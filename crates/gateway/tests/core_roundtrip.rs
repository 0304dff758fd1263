//! Gateway against a live core service on an ephemeral port.
//!
//! Run with:
//!   cargo test -p gateway --test core_roundtrip

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use database::Database;
use gateway::{CoreClient, GatewayError, GatewayState, RecordingSender};
use notifier::{NotificationDispatcher, RecordingDispatcher, WebhookDispatcher};
use orchestrator::{OrchestratorConfig, TripOrchestrator};
use route_planner::{RoutePlanner, StubRoutingProvider};
use secrecy::SecretString;
use signed_channel::{ClientConfig, SignedClient, Signer};
use trip_core::{
    CancelTripRequest, EmergencyContactInput, LatLng, LocationUpdateRequest, NotificationType, RouteOption,
    SosRequest, TripCreationRequest, TripStatus,
};

const SECRET: &str = "roundtrip-secret";

fn signer_with(secret: &str) -> Signer {
    Signer::new(&SecretString::from(secret.to_string())).unwrap()
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn signed_client(base_url: &str, secret: &str) -> SignedClient {
    let config = ClientConfig::new(base_url).with_timeouts(Duration::from_secs(2), Duration::from_secs(5));
    SignedClient::new(config, signer_with(secret)).unwrap()
}

async fn core_with<N: NotificationDispatcher + 'static>(dispatcher: Arc<N>) -> String {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    let orchestrator = TripOrchestrator::new(
        db,
        RoutePlanner::new(Arc::new(StubRoutingProvider::new())),
        dispatcher,
        OrchestratorConfig::default(),
    );
    serve(api::router(api::AppState::new(Arc::new(orchestrator), signer_with(SECRET)))).await
}

fn creation_request() -> TripCreationRequest {
    TripCreationRequest {
        telegram_chat_id: 4242,
        user_name: "Asha".to_string(),
        phone: "+919876543210".to_string(),
        gender: "FEMALE".to_string(),
        emergency_contacts: vec![
            EmergencyContactInput {
                name: "Ravi".to_string(),
                phone: "+919812345678".to_string(),
                telegram_chat_id: Some(501),
            },
            EmergencyContactInput {
                name: "Meera".to_string(),
                phone: "+919800000000".to_string(),
                telegram_chat_id: None,
            },
        ],
        source: LatLng::new(12.97, 77.59),
        destination: LatLng::new(12.93, 77.61),
        deviation_threshold_meters: None,
    }
}

fn straight_route() -> RouteOption {
    RouteOption {
        id: 1,
        distance: 222.0,
        duration: 160,
        safety_score: 9.8,
        polyline: vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 0.001), LatLng::new(0.0, 0.002)],
    }
}

fn location(lat: f64, lng: f64) -> LocationUpdateRequest {
    LocationUpdateRequest {
        trip_id: None,
        lat,
        lng,
        timestamp: Utc::now(),
    }
}

// ============================================================================
// CoreClient
// ============================================================================

#[tokio::test]
async fn test_client_drives_full_trip() {
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let base_url = core_with(dispatcher.clone()).await;
    let core = CoreClient::new(signed_client(&base_url, SECRET));

    assert!(core.is_healthy().await);

    let proposal = core.create_trip(&creation_request()).await.unwrap();
    assert_eq!(proposal.route_options.len(), 3);

    let trip = core.start_trip(proposal.trip_id, &straight_route()).await.unwrap();
    assert_eq!(trip.status, TripStatus::Active);

    let recorded = core
        .record_location(proposal.trip_id, &location(0.0005, 0.0))
        .await
        .unwrap();
    assert_eq!(recorded.trip_id, proposal.trip_id);
    assert_eq!(
        core.get_trip(proposal.trip_id).await.unwrap().status,
        TripStatus::DeviationAlert
    );

    let ack = core
        .trigger_sos(&SosRequest {
            trip_id: proposal.trip_id,
            telegram_chat_id: 4242,
            message: None,
            lat: 0.0005,
            lng: 0.0,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();
    assert_eq!(ack.trip_status, TripStatus::SosTriggered);
    assert_eq!(ack.contacts_notified, 2);

    let trip = core.complete_trip(proposal.trip_id).await.unwrap();
    assert_eq!(trip.status, TripStatus::Completed);
    assert_eq!(core.list_locations(proposal.trip_id).await.unwrap().len(), 1);

    assert_eq!(dispatcher.sent_of(NotificationType::SosContact).len(), 2);
}

#[tokio::test]
async fn test_client_surfaces_core_errors() {
    let base_url = core_with(Arc::new(RecordingDispatcher::new())).await;
    let core = CoreClient::new(signed_client(&base_url, SECRET));

    let err = core.get_trip(404).await.unwrap_err();
    assert_eq!(err.core_kind(), Some("not_found"));

    let proposal = core.create_trip(&creation_request()).await.unwrap();
    core.cancel_trip(proposal.trip_id, &CancelTripRequest { reason: "got a ride".to_string() })
        .await
        .unwrap();
    let err = core
        .record_location(proposal.trip_id, &location(0.0, 0.0))
        .await
        .unwrap_err();
    match err {
        GatewayError::Core { status, body } => {
            assert_eq!(status, 409);
            assert_eq!(body.error, "invalid_state");
        }
        other => panic!("expected core error, got {:?}", other),
    }

    let mut invalid = creation_request();
    invalid.emergency_contacts.clear();
    let err = core.create_trip(&invalid).await.unwrap_err();
    assert_eq!(err.core_kind(), Some("validation_failed"));
}

#[tokio::test]
async fn test_wrong_secret_is_unauthenticated() {
    let base_url = core_with(Arc::new(RecordingDispatcher::new())).await;
    let core = CoreClient::new(signed_client(&base_url, "not-the-secret"));

    let err = core.create_trip(&creation_request()).await.unwrap_err();
    match err {
        GatewayError::Core { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body.error, "unauthenticated");
        }
        other => panic!("expected core error, got {:?}", other),
    }
}

// ============================================================================
// Core -> gateway notifications
// ============================================================================

#[tokio::test]
async fn test_notifications_reach_chat() {
    let sender = Arc::new(RecordingSender::new());
    let gateway_url = serve(gateway::router(GatewayState::new(sender.clone(), signer_with(SECRET)))).await;

    let webhook = Arc::new(WebhookDispatcher::new(signed_client(&gateway_url, SECRET)));
    let base_url = core_with(webhook).await;
    let core = CoreClient::new(signed_client(&base_url, SECRET));

    let proposal = core.create_trip(&creation_request()).await.unwrap();
    core.start_trip(proposal.trip_id, &straight_route()).await.unwrap();
    core.record_location(proposal.trip_id, &location(0.0005, 0.0))
        .await
        .unwrap();

    let ack = core
        .trigger_sos(&SosRequest {
            trip_id: proposal.trip_id,
            telegram_chat_id: 4242,
            message: Some("help".to_string()),
            lat: 0.0005,
            lng: 0.0,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();
    // Both envelopes are acknowledged; only Ravi has a chat.
    assert_eq!(ack.contacts_notified, 2);

    let sent = sender.sent();
    let owner: Vec<&String> = sent.iter().filter(|(chat, _)| *chat == 4242).map(|(_, text)| text).collect();
    assert_eq!(owner.len(), 2);
    assert!(owner[0].contains("56 meters"));
    assert!(owner[1].starts_with("🌍 *SOS Triggered*"));

    let contacts: Vec<&String> = sent.iter().filter(|(chat, _)| *chat == 501).map(|(_, text)| text).collect();
    assert_eq!(contacts.len(), 1);
    assert!(contacts[0].contains("help"));
    assert_eq!(sent.len(), 3);
}

#[tokio::test]
async fn test_gateway_rejects_foreign_signer() {
    let sender = Arc::new(RecordingSender::new());
    let gateway_url = serve(gateway::router(GatewayState::new(sender.clone(), signer_with(SECRET)))).await;

    let webhook = WebhookDispatcher::new(signed_client(&gateway_url, "intruder"));
    let envelope = trip_core::NotificationEnvelope::to_user(NotificationType::MessageToUser, 1, 4242, "hi");

    assert!(!webhook.dispatch(&envelope).await.is_delivered());
    assert!(sender.sent().is_empty());
}
