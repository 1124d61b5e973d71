// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::{fs, net::SocketAddr, sync::Arc};

use mdoc::{server, Handler};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
};

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
    _docs: TempDir,
    _theme: TempDir,
}

async fn start() -> Running {
    let docs = TempDir::new().unwrap();
    fs::create_dir(docs.path().join("notes")).unwrap();
    fs::write(docs.path().join("guide.md"), "# Guide").unwrap();

    let theme = TempDir::new().unwrap();
    fs::write(
        theme.path().join("layout.html"),
        "<html>{% block content %}{% endblock %}</html>",
    )
    .unwrap();
    fs::write(
        theme.path().join("index.html"),
        r#"{% extends "layout.html" %}{% block content %}{% for f in files %}{{ f.display_name }};{% endfor %}{% endblock %}"#,
    )
    .unwrap();
    fs::write(
        theme.path().join("doc.html"),
        r#"{% extends "layout.html" %}{% block content %}{{ content }}{% endblock %}"#,
    )
    .unwrap();

    let handler = Handler::builder(docs.path())
        .theme(theme.path())
        .build()
        .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server::serve(listener, Arc::new(handler), async move {
        let _ = stopped.await;
    }));
    Running {
        addr,
        stop,
        task,
        _docs: docs,
        _theme: theme,
    }
}

async fn exchange(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

fn status(response: &str) -> u16 {
    response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_serves_documents_and_listings() {
    let server = start().await;

    let response = exchange(server.addr, "GET /guide.md HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    assert_eq!(status(&response), 200);
    assert!(response.contains("Content-Type: text/html;charset=utf-8\r\n"));
    assert!(response.ends_with("<html><h1>Guide</h1>\n</html>"));

    let response = exchange(server.addr, "GET / HTTP/1.1\r\n\r\n").await;
    assert_eq!(status(&response), 200);
    assert!(response.ends_with("<html>notes/;guide.md;</html>"));

    server.stop.send(()).unwrap();
    server.task.await.unwrap();
}

#[tokio::test]
async fn test_redirect_over_the_wire() {
    let server = start().await;
    let response = exchange(server.addr, "GET /notes?page=2 HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with("HTTP/1.1 307 Temporary Redirect\r\n"));
    assert!(response.contains("Location: notes/?page=2\r\n"));
    server.stop.send(()).unwrap();
}

#[tokio::test]
async fn test_protocol_errors() {
    let server = start().await;
    assert_eq!(status(&exchange(server.addr, "GARBAGE\r\n\r\n").await), 400);
    assert_eq!(status(&exchange(server.addr, "DELETE / HTTP/1.1\r\n\r\n").await), 405);
    assert_eq!(status(&exchange(server.addr, "GET / HTTP/2.0\r\n\r\n").await), 505);
    assert_eq!(status(&exchange(server.addr, "GET /nope.md HTTP/1.1\r\n\r\n").await), 404);
    server.stop.send(()).unwrap();
}

#[tokio::test]
async fn test_head_over_the_wire() {
    let server = start().await;
    let response = exchange(server.addr, "HEAD /guide.md HTTP/1.1\r\n\r\n").await;
    assert_eq!(status(&response), 200);
    assert!(response.contains("Content-Length: "));
    assert!(response.ends_with("\r\n\r\n"));
    server.stop.send(()).unwrap();
}

#[tokio::test]
async fn test_stops_on_shutdown_signal() {
    let server = start().await;
    server.stop.send(()).unwrap();
    server.task.await.unwrap();
    assert!(TcpStream::connect(server.addr).await.is_err());
}
