//! WebSocket round trips against a live listener.

use std::sync::Arc;

use futures::{SinkExt, Stream, StreamExt};
use shellgate::error::INVALID_FORMAT_MESSAGE;
use shellgate::{Dispatcher, MemoryRuntime, OsRegistry, Server};
use tempfile::TempDir;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

async fn start(runtime: MemoryRuntime, base: &TempDir) -> String {
    let dispatcher = Dispatcher::new(OsRegistry::default(), Arc::new(runtime));
    let server = Server::bind("127.0.0.1:0", dispatcher, base.path())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    format!("ws://{}", addr)
}

async fn next_text<S>(ws: &mut S) -> String
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => return text.as_str().to_owned(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_invalid_format_then_keeps_serving() {
    let tmp = TempDir::new().unwrap();
    let url = start(MemoryRuntime::new().with_exec_output("hello\n"), &tmp).await;
    let (mut ws, _) = connect_async(url.as_str()).await.unwrap();

    ws.send(Message::Text(r#"{"x":1}"#.into())).await.unwrap();
    assert_eq!(next_text(&mut ws).await, INVALID_FORMAT_MESSAGE);

    ws.send(Message::Text(
        r#"{"instance_os":"centos","command":"CREATE","instance_hash":"ws1"}"#.into(),
    ))
    .await
    .unwrap();
    assert_eq!(next_text(&mut ws).await, "[0]");

    ws.send(Message::Text(
        r#"{"instance_os":"centos","command":"EXEC","instance_hash":"ws1","exec_command":"echo hello"}"#
            .into(),
    ))
    .await
    .unwrap();
    assert_eq!(next_text(&mut ws).await, r#"["hello",""]"#);

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn test_binary_frames_get_no_reply() {
    let tmp = TempDir::new().unwrap();
    let url = start(MemoryRuntime::new(), &tmp).await;
    let (mut ws, _) = connect_async(url.as_str()).await.unwrap();

    ws.send(Message::Binary(vec![1u8, 2, 3].into())).await.unwrap();
    ws.send(Message::Text(r#"{"x":1}"#.into())).await.unwrap();
    ws.send(Message::Text(
        r#"{"instance_os":"centos","command":"DELETE","instance_hash":"bin1"}"#.into(),
    ))
    .await
    .unwrap();

    // Replies line up with the text frames only.
    assert_eq!(next_text(&mut ws).await, INVALID_FORMAT_MESSAGE);
    assert_eq!(next_text(&mut ws).await, "[2]");

    ws.close(None).await.unwrap();
}

#[tokio::test]
async fn test_sessions_have_separate_directories() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("sub")).unwrap();
    let url = start(MemoryRuntime::new(), &tmp).await;
    let base = tmp.path().canonicalize().unwrap();
    let sub = base.join("sub");

    let (mut a, _) = connect_async(url.as_str()).await.unwrap();
    let (mut b, _) = connect_async(url.as_str()).await.unwrap();

    let cd = |target: &str| {
        format!(
            r#"{{"instance_os":"centos","command":"EXEC","instance_hash":"h","exec_command":"cd {}"}}"#,
            target
        )
    };

    a.send(Message::Text(cd("sub").into())).await.unwrap();
    let reply: Vec<String> = serde_json::from_str(&next_text(&mut a).await).unwrap();
    assert_eq!(reply, vec![sub.display().to_string()]);

    b.send(Message::Text(cd(".").into())).await.unwrap();
    let reply: Vec<String> = serde_json::from_str(&next_text(&mut b).await).unwrap();
    assert_eq!(reply, vec![base.display().to_string()]);
}
