use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use sns_signal_relay::config::{CommonConfig, RelayConfig, SignalConfig, SnsConfig};
use sns_signal_relay::startup::Application;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TEST_TOPIC_ARN: &str = "arn:aws:sns:us-east-1:123456789012:test-alerts";
pub const TEST_PHONE_NUMBER: &str = "+14155551234";
pub const TEST_GROUP_ID: &str = "group.dGVzdGdyb3VwaWQ=";

/// In-process stand-in for the signal-cli REST gateway. Records every call so
/// tests can assert on call counts and send payloads.
#[derive(Default)]
pub struct GatewayRecorder {
    pub receive_count: AtomicU64,
    pub send_count: AtomicU64,
    pub fail_sends: AtomicBool,
    pub sent_payloads: Mutex<Vec<serde_json::Value>>,
}

pub struct StubGateway {
    pub host: String,
    pub recorder: Arc<GatewayRecorder>,
}

async fn stub_receive(
    State(recorder): State<Arc<GatewayRecorder>>,
    Path(_number): Path<String>,
) -> StatusCode {
    recorder.receive_count.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn stub_send(
    State(recorder): State<Arc<GatewayRecorder>>,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    if recorder.fail_sends.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    recorder.send_count.fetch_add(1, Ordering::SeqCst);
    recorder.sent_payloads.lock().unwrap().push(payload);
    StatusCode::CREATED
}

impl StubGateway {
    pub async fn spawn() -> Self {
        let recorder = Arc::new(GatewayRecorder::default());

        let router = Router::new()
            .route("/v1/receive/:number", get(stub_receive))
            .route("/v2/send", post(stub_send))
            .with_state(recorder.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub gateway");
        let addr = listener.local_addr().expect("Failed to read stub address");

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        StubGateway {
            host: addr.to_string(),
            recorder,
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub gateway: StubGateway,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let gateway = StubGateway::spawn().await;

        // Use random port for testing (port 0)
        let config = RelayConfig {
            common: CommonConfig { port: 0 },
            signal: SignalConfig {
                host: gateway.host.clone(),
                phone_number: TEST_PHONE_NUMBER.to_string(),
                group_id: TEST_GROUP_ID.to_string(),
            },
            sns: SnsConfig {
                topic_arn: TEST_TOPIC_ARN.to_string(),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, gateway }
    }

    pub async fn post_sns(&self, body: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/sns", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
