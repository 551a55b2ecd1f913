use std::net::TcpListener;
use std::time::Duration;

use actix_web::{web, HttpResponse};
use kit_http::{Server, ServerError};
use tokio::sync::oneshot;

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .unwrap()
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ping", web::get().to(|| async { HttpResponse::Ok().body("pong") }));
}

async fn wait_for(url: &str) -> reqwest::Response {
    for _ in 0..50 {
        if let Ok(resp) = reqwest::get(url).await {
            return resp;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {url} never came up");
}

#[actix_web::test]
async fn test_serve_until_shutdown() {
    let port = free_port();
    let (tx, rx) = oneshot::channel::<()>();

    let server = Server::new(routes)
        .with_host_port("127.0.0.1", port)
        .with_shutdown_timeout(Duration::from_secs(1));
    let running = actix_web::rt::spawn(server.serve(async move {
        let _ = rx.await;
    }));

    let resp = wait_for(&format!("http://127.0.0.1:{port}/ping")).await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "pong");

    tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok(), "{result:?}");
}

#[actix_web::test]
async fn test_bind_conflict() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let result = Server::new(routes)
        .with_host_port("127.0.0.1", port)
        .serve(std::future::pending())
        .await;

    match result {
        Err(ServerError::Bind { addr, .. }) => assert_eq!(addr, format!("127.0.0.1:{port}")),
        other => panic!("expected a bind error, got {other:?}"),
    }
    drop(listener);
}
