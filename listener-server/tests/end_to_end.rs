//! Real sockets: bind, serve, exit

use std::sync::Arc;
use std::time::Duration;

use listener_server::ListenerServer;
use media_listener::{ListenerConfig, MediaListener};
use media_provider::testing::{playing, ScriptedProvider};

#[tokio::test]
async fn test_serve_and_exit() {
    let provider = Arc::new(ScriptedProvider::constant(playing("Song", "Band", "Record")));
    let config = ListenerConfig::default().with_poll_interval(Duration::from_millis(5));
    let listener = Arc::new(MediaListener::start(provider, config).unwrap());

    let server = ListenerServer::start("127.0.0.1:0".parse().unwrap(), Arc::clone(&listener))
        .await
        .expect("server binds");
    let base = format!("http://{}", server.local_addr());
    let client = reqwest::Client::new();

    let ready = client.get(format!("{base}/ready")).send().await.unwrap();
    assert_eq!(ready.status(), reqwest::StatusCode::OK);

    let exit = client.post(format!("{base}/exit")).send().await.unwrap();
    assert_eq!(exit.status(), reqwest::StatusCode::OK);

    tokio::time::timeout(Duration::from_secs(2), server.wait_for_exit())
        .await
        .expect("exit observed");

    listener.stop();
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let listener = Arc::new(
        MediaListener::start(ScriptedProvider::new(), ListenerConfig::default()).unwrap(),
    );

    let first = ListenerServer::start("127.0.0.1:0".parse().unwrap(), Arc::clone(&listener))
        .await
        .unwrap();
    let taken = first.local_addr();

    let second = ListenerServer::start(taken, Arc::clone(&listener)).await;
    assert!(matches!(
        second,
        Err(listener_server::ServerError::Bind { addr, .. }) if addr == taken
    ));

    first.shutdown().await.unwrap();
}
