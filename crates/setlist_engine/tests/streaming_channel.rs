use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use setlist_engine::{
    CreationRequest, EngineEvent, EngineSettings, FailureKind, JobChannel, ProgressSink,
    StreamingChannel,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn progress(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Progress { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// What the fake server does after reading the request frame.
enum Script {
    Send(Vec<String>),
    SendThenDrop(Vec<String>),
}

/// Serves one WebSocket connection and hands back the request frame it received.
async fn serve_once(script: Script) -> (String, JoinHandle<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let first = loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => break text.as_str().to_string(),
                Some(Ok(_)) => continue,
                other => panic!("expected a request frame, got {other:?}"),
            }
        };

        match script {
            Script::Send(frames) => {
                for frame in frames {
                    ws.send(Message::text(frame)).await.unwrap();
                }
                // Wait for the client to close its side.
                while let Some(Ok(message)) = ws.next().await {
                    if message.is_close() {
                        break;
                    }
                }
            }
            Script::SendThenDrop(frames) => {
                for frame in frames {
                    ws.send(Message::text(frame)).await.unwrap();
                }
                let _ = ws.close(None).await;
            }
        }
        serde_json::from_str(&first).unwrap()
    });

    (base, handle)
}

fn settings(base: String) -> EngineSettings {
    EngineSettings {
        server_base_url: base,
        connect_timeout: Duration::from_secs(2),
        ..EngineSettings::default()
    }
}

fn request() -> CreationRequest {
    CreationRequest {
        url: "https://www.setlist.fm/setlist/the-band/2024/venue-city-1234abcd.html".to_string(),
        options: "tapes-main,strict-search".to_string(),
    }
}

#[tokio::test]
async fn progress_then_payload() {
    let payload = json!({
        "artistName": "The Band",
        "playlistId": "p1",
        "timeElapsed": 1500,
        "searchResults": [{"index": 0, "songName": "Intro", "resultType": "SKIPPED"}]
    });
    let (base, server) = serve_once(Script::Send(vec![
        "Queued...".to_string(),
        "Searching song 1 of 1".to_string(),
        payload.to_string(),
    ]))
    .await;

    let sink = TestSink::default();
    let value = StreamingChannel::new(settings(base))
        .run(1, &request(), &sink)
        .await
        .expect("payload");

    assert_eq!(value, payload);
    assert_eq!(
        sink.progress(),
        vec!["Queued...".to_string(), "Searching song 1 of 1".to_string()]
    );

    let received = server.await.unwrap();
    assert_eq!(
        received,
        json!({
            "url": "https://www.setlist.fm/setlist/the-band/2024/venue-city-1234abcd.html",
            "options": "tapes-main,strict-search"
        })
    );
}

#[tokio::test]
async fn error_sentinel_is_a_rejection() {
    let (base, server) = serve_once(Script::Send(vec![
        "Queued...".to_string(),
        "ERROR".to_string(),
    ]))
    .await;

    let sink = TestSink::default();
    let err = StreamingChannel::new(settings(base))
        .run(2, &request(), &sink)
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::ServerRejected { status: None });
    assert_eq!(sink.progress(), vec!["Queued...".to_string()]);
    server.await.unwrap();
}

#[tokio::test]
async fn close_before_result_is_a_transport_error() {
    let (base, server) =
        serve_once(Script::SendThenDrop(vec!["Queued...".to_string()])).await;

    let err = StreamingChannel::new(settings(base))
        .run(3, &request(), &TestSink::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Transport);
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = StreamingChannel::new(settings(base))
        .run(4, &request(), &TestSink::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Transport);
}
