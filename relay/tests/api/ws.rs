use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use location_socket::{
    message::{DistancesReport, Event, HealthReport, PeerLocation},
    ws, LocationSocket,
};

use relay::settings::WebsocketSettings;

use crate::helper::{await_total_users, TestApp, WAIT};

#[actix_web::test]
async fn client_ping_pong() -> anyhow::Result<()> {
    let app = TestApp::spawn().await;
    let (_res, mut ws) = LocationSocket::connect(&app.socket_config().url()).await?;

    let _ = ws.next().await; // ignore welcome

    ws.send(ws::Message::Ping(actix_web::web::Bytes::new()))
        .await
        .unwrap();

    let mut got_pong = false;
    if let Some(Ok(ws::Frame::Pong(_))) = ws.next().await {
        got_pong = true;
    }
    assert!(got_pong);
    Ok(())
}

#[actix_web::test]
async fn welcome_carries_current_totals() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect().await;
    assert_eq!(alice.welcome().total_users, 0);
    assert!(!alice.welcome().has_connections);

    alice.send_location(40.7128, -74.0060).await.unwrap();
    await_total_users(&mut alice, 1).await;

    let bob = app.connect().await;
    assert_ne!(bob.id(), alice.id());
    assert_eq!(bob.welcome().total_users, 1);
    assert!(bob.welcome().has_connections);
}

#[actix_web::test]
async fn location_reaches_sender_and_peers() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect().await;
    let mut bob = app.connect().await;

    alice.send_location(40.7128, -74.0060).await.unwrap();

    let expected = Event::PeerLocation(PeerLocation {
        id: alice.id(),
        latitude: 40.7128,
        longitude: -74.0060,
    });
    for socket in [&mut alice, &mut bob] {
        let event = socket.wait_for(WAIT, |e| e == &expected).await.unwrap();
        assert_eq!(event, expected);
        // aggregate follows the location
        match socket.next_event().await.unwrap() {
            Some(Event::AggregateUpdate(update)) => assert_eq!(update.total_users, 1),
            other => panic!("expected aggregate update, got {other:?}"),
        }
    }
}

#[actix_web::test]
async fn late_joiner_sees_existing_peers() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect().await;
    let mut bob = app.connect().await;
    // updates from different connections may land in either order
    alice.send_location(40.7128, -74.0060).await.unwrap();
    await_total_users(&mut alice, 1).await;
    bob.send_location(34.0522, -118.2437).await.unwrap();
    await_total_users(&mut alice, 2).await;

    let mut charlie = app.connect().await;
    let mut seen = vec![];
    for _ in 0..2 {
        match charlie.next_event().await.unwrap() {
            Some(Event::PeerLocation(peer)) => seen.push(peer.id),
            other => panic!("expected replayed location, got {other:?}"),
        }
    }
    assert_eq!(seen, vec![alice.id(), bob.id()]);
}

#[actix_web::test]
async fn disconnect_is_announced() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect().await;
    let mut bob = app.connect().await;
    alice.send_location(40.7128, -74.0060).await.unwrap();
    bob.send_location(34.0522, -118.2437).await.unwrap();
    await_total_users(&mut bob, 2).await;

    let alice_id = alice.id();
    alice.close().await.unwrap();

    bob.wait_for(WAIT, |e| e == &Event::PeerDisconnected { id: alice_id })
        .await
        .unwrap();
    await_total_users(&mut bob, 1).await;

    let report: DistancesReport = app.get_json("distances").await;
    assert_eq!(report.total_users, 1);
    assert!(report.distances.is_empty());
}

#[actix_web::test]
async fn disconnect_without_location_leaves_registry_alone() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect().await;
    alice.send_location(40.7128, -74.0060).await.unwrap();
    await_total_users(&mut alice, 1).await;

    let silent = app.connect().await;
    let silent_id = silent.id();
    silent.close().await.unwrap();
    alice
        .wait_for(WAIT, |e| e == &Event::PeerDisconnected { id: silent_id })
        .await
        .unwrap();

    let health: HealthReport = app.get_json("health").await;
    assert_eq!(health.connections, 1);
    assert_eq!(health.active_users, vec![alice.id()]);
}

#[actix_web::test]
async fn malformed_messages_are_isolated() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect().await;
    let mut bob = app.connect().await;

    alice.send_text("not json".to_string()).await.unwrap();
    alice
        .send_text(r#"{"event":"send-location","data":{"latitude":1.0}}"#.to_string())
        .await
        .unwrap();
    alice
        .send_text(r#"{"event":"teleport","data":{}}"#.to_string())
        .await
        .unwrap();
    alice
        .send_text(r#"{"event":"send-location","data":{"latitude":1e400,"longitude":0}}"#.into())
        .await
        .unwrap();
    alice.send_location(51.5074, -0.1278).await.unwrap();

    // the first event bob sees is the valid update
    match bob.next_event().await.unwrap() {
        Some(Event::PeerLocation(peer)) => {
            assert_eq!(peer.id, alice.id());
            assert_eq!((peer.latitude, peer.longitude), (51.5074, -0.1278));
        }
        other => panic!("expected location, got {other:?}"),
    }
    await_total_users(&mut alice, 1).await;
}

#[actix_web::test]
async fn silent_connection_times_out() -> anyhow::Result<()> {
    let app = TestApp::spawn_with(WebsocketSettings {
        heartbeat_interval_secs: 1,
        client_timeout_secs: 2,
        ..WebsocketSettings::default()
    })
    .await;
    let mut alice = app.connect().await;

    // read the welcome, then never answer a ping again
    let (_res, mut silent) = LocationSocket::connect(&app.socket_config().url()).await?;
    let silent_id = match silent.next().await {
        Some(Ok(ws::Frame::Text(text))) => match serde_json::from_slice::<Event>(&text)? {
            Event::Welcome(welcome) => welcome.id,
            other => panic!("expected welcome, got {other:?}"),
        },
        other => panic!("expected welcome frame, got {other:?}"),
    };

    alice
        .wait_for(Duration::from_secs(10), |e| {
            e == &Event::PeerDisconnected { id: silent_id }
        })
        .await?;

    let health: HealthReport = app.get_json("health").await;
    assert_eq!(health.connections, 1);
    Ok(())
}

#[actix_web::test]
async fn oversized_frame_disconnects_sender() -> anyhow::Result<()> {
    let app = TestApp::spawn_with(WebsocketSettings {
        max_frame_size: 128,
        ..WebsocketSettings::default()
    })
    .await;
    let mut alice = app.connect().await;
    let mut bob = app.connect().await;
    let bob_id = bob.id();

    bob.send_text("x".repeat(500)).await?;

    alice
        .wait_for(WAIT, |e| e == &Event::PeerDisconnected { id: bob_id })
        .await?;

    // alice is untouched and keeps getting updates
    alice.send_location(40.7128, -74.0060).await?;
    await_total_users(&mut alice, 1).await;

    let health: HealthReport = app.get_json("health").await;
    assert_eq!(health.connections, 1);
    assert_eq!(health.active_users, vec![alice.id()]);
    Ok(())
}
