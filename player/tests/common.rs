//! Common utilities for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use player::config::PlayerConfig;
use wav_core::{encode_header, PcmSink, StreamError};

/// What the mock TTS endpoint answers with.
#[derive(Clone)]
pub enum Reply {
    /// Raw body bytes with a 200 status.
    Bytes(Vec<u8>),
    /// Empty body with the given status.
    Status(u16),
}

impl Reply {
    /// A streaming-style WAV body: header with an unknown data size, then `pcm`.
    pub fn wav(sample_rate: u32, bits_per_sample: u16, pcm: &[u8]) -> Self {
        let mut body = encode_header(sample_rate, 1, bits_per_sample, 0xFFFF_FFFF).to_vec();
        body.extend_from_slice(pcm);
        Reply::Bytes(body)
    }
}

/// A request as seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub body: serde_json::Value,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockTtsServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTtsServer {
    pub fn url(&self) -> String {
        format!("http://{}/v1/tts", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn tts_endpoint(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        body,
        content_type: header_str(header::CONTENT_TYPE),
        authorization: header_str(header::AUTHORIZATION),
    });

    match state.reply {
        Reply::Bytes(bytes) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "audio/wav")], bytes).into_response()
        }
        Reply::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
    }
}

/// Start a mock TTS service on a background runtime.
///
/// The blocking client cannot run inside a tokio runtime, so the server
/// gets a thread of its own and the test body stays synchronous.
pub fn spawn_mock_server(reply: Reply) -> MockTtsServer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        reply,
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/v1/tts", post(tts_endpoint))
        .with_state(state);

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("Failed to build test runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind mock server");
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    let addr = rx.recv().expect("Mock server did not start");
    MockTtsServer { addr, requests }
}

/// Player config pointed at `server`, with the sound device disabled.
pub fn test_config(server: &MockTtsServer) -> PlayerConfig {
    PlayerConfig {
        url: server.url(),
        text: "Hello from the integration tests".to_string(),
        playback: false,
        ..PlayerConfig::default()
    }
}

/// Memory sink whose contents stay reachable after it is boxed.
#[derive(Clone, Default)]
pub struct SharedSink {
    pub bytes: Arc<Mutex<Vec<u8>>>,
    pub writes: Arc<Mutex<usize>>,
}

impl SharedSink {
    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl PcmSink for SharedSink {
    fn write(&mut self, pcm: &[u8]) -> Result<(), StreamError> {
        self.bytes.lock().unwrap().extend_from_slice(pcm);
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Deterministic PCM-looking bytes.
pub fn pcm_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}
