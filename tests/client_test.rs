use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

use inception_client::common::config::ClientConfig;
use inception_client::proto::prediction_service::{PredictionService, PredictionServiceServer};
use inception_client::proto::{DataType, ModelSpec, PredictRequest, PredictResponse, TensorProto};
use inception_client::{ClientError, OutputFormat};

const JPEG_BYTES: &[u8] = &[
    0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xff, 0xd9,
];

/// In-process PredictionService that records what it receives.
#[derive(Clone, Default)]
struct MockService {
    received: Arc<Mutex<Vec<PredictRequest>>>,
    /// `grpc-timeout` header of each call, if one was sent
    deadlines: Arc<Mutex<Vec<Option<String>>>>,
    delay: Option<Duration>,
    status: Option<Status>,
}

#[tonic::async_trait]
impl PredictionService for MockService {
    async fn predict(
        &self,
        request: Request<PredictRequest>,
    ) -> Result<Response<PredictResponse>, Status> {
        let deadline = request
            .metadata()
            .get("grpc-timeout")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.deadlines.lock().unwrap().push(deadline);
        self.received.lock().unwrap().push(request.into_inner());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = &self.status {
            return Err(status.clone());
        }

        Ok(Response::new(classification_response()))
    }
}

fn classification_response() -> PredictResponse {
    let mut response = PredictResponse {
        model_spec: Some(ModelSpec {
            name: "inception".to_string(),
            signature_name: "predict_images".to_string(),
            version_choice: None,
        }),
        ..Default::default()
    };
    response.outputs.insert(
        "classes".to_string(),
        TensorProto {
            dtype: DataType::DtString as i32,
            string_val: vec![b"tabby, tabby cat".to_vec()],
            ..Default::default()
        },
    );
    response.outputs.insert(
        "scores".to_string(),
        TensorProto {
            dtype: DataType::DtFloat as i32,
            float_val: vec![0.875],
            ..Default::default()
        },
    );
    response
}

async fn start_server(service: MockService) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(PredictionServiceServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    addr
}

/// A local address with nothing listening on it.
async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn write_image(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_sends_one_request_with_file_bytes() {
    let service = MockService::default();
    let received = service.received.clone();
    let deadlines = service.deadlines.clone();
    let addr = start_server(service).await;
    let image = write_image(JPEG_BYTES);

    let config = ClientConfig::default()
        .with_server(addr.to_string())
        .with_image(image.path());

    let mut out = Vec::new();
    inception_client::run(&config, &mut out).await.unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);

    let spec = received[0].model_spec.as_ref().unwrap();
    assert_eq!(spec.name, "inception");
    assert_eq!(spec.signature_name, "serving_default");

    let tensor = &received[0].inputs["image"];
    assert_eq!(tensor.dtype(), DataType::DtString);
    assert_eq!(tensor.string_val, vec![JPEG_BYTES.to_vec()]);

    // The deadline travels with the call
    let deadlines = deadlines.lock().unwrap();
    assert_eq!(deadlines.len(), 1);
    assert!(deadlines[0].is_some());
}

#[tokio::test]
async fn test_prints_response_fields() {
    let addr = start_server(MockService::default()).await;
    let image = write_image(JPEG_BYTES);

    let config = ClientConfig::default()
        .with_server(addr.to_string())
        .with_image(image.path());

    let mut out = Vec::new();
    inception_client::run(&config, &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("key: \"classes\""));
    assert!(text.contains("string_val: \"tabby, tabby cat\""));
    assert!(text.contains("key: \"scores\""));
    assert!(text.contains("float_val: 0.875"));
    assert!(text.contains("signature_name: \"predict_images\""));
    assert!(text.ends_with('\n'));
}

#[tokio::test]
async fn test_json_output() {
    let addr = start_server(MockService::default()).await;
    let image = write_image(JPEG_BYTES);

    let config = ClientConfig::default()
        .with_server(addr.to_string())
        .with_image(image.path())
        .with_format(OutputFormat::Json);

    let mut out = Vec::new();
    inception_client::run(&config, &mut out).await.unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["modelSpec"]["name"], "inception");
    assert_eq!(value["outputs"]["scores"]["dtype"], "DT_FLOAT");
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let addr = dead_address().await;
    let image = write_image(JPEG_BYTES);

    let config = ClientConfig::default()
        .with_server(addr.to_string())
        .with_image(image.path());

    let mut out = Vec::new();
    let err = inception_client::run(&config, &mut out).await.unwrap_err();

    assert!(err.is_connection(), "unexpected error: {}", err);
    assert!(matches!(err, ClientError::Connect { .. }));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_missing_image_fails_before_any_call() {
    let service = MockService::default();
    let received = service.received.clone();
    let addr = start_server(service).await;

    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::default()
        .with_server(addr.to_string())
        .with_image(dir.path().join("missing.jpg"));

    let mut out = Vec::new();
    let err = inception_client::run(&config, &mut out).await.unwrap_err();

    assert!(err.is_not_found(), "unexpected error: {}", err);
    assert!(received.lock().unwrap().is_empty());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_missing_image_wins_over_dead_server() {
    let addr = dead_address().await;

    // Default image path is empty
    let config = ClientConfig::default().with_server(addr.to_string());

    let mut out = Vec::new();
    let err = inception_client::run(&config, &mut out).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let service = MockService {
        delay: Some(Duration::from_secs(5)),
        ..Default::default()
    };
    let addr = start_server(service).await;
    let image = write_image(JPEG_BYTES);

    let config = ClientConfig::default()
        .with_server(addr.to_string())
        .with_image(image.path())
        .with_timeout(Duration::from_millis(200));

    let mut out = Vec::new();
    let err = inception_client::run(&config, &mut out).await.unwrap_err();

    assert!(err.is_timeout(), "unexpected error: {}", err);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_service_error_is_propagated() {
    let service = MockService {
        status: Some(Status::not_found("Servable not found for request: Latest(inception)")),
        ..Default::default()
    };
    let addr = start_server(service).await;
    let image = write_image(JPEG_BYTES);

    let config = ClientConfig::default()
        .with_server(addr.to_string())
        .with_image(image.path());

    let mut out = Vec::new();
    let err = inception_client::run(&config, &mut out).await.unwrap_err();

    match err {
        ClientError::Service(status) => {
            assert_eq!(status.code(), tonic::Code::NotFound);
            assert!(status.message().contains("Servable not found"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_invalid_address_fails_before_any_io() {
    let config = ClientConfig::default()
        .with_server("no-port-here")
        .with_image("/does/not/matter.jpg");

    let mut out = Vec::new();
    let err = inception_client::run(&config, &mut out).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidAddress { .. }));
}

#[tokio::test]
async fn test_zero_timeout_is_rejected() {
    let image = write_image(JPEG_BYTES);
    let config = ClientConfig::default()
        .with_image(image.path())
        .with_timeout(Duration::ZERO);

    let mut out = Vec::new();
    let err = inception_client::run(&config, &mut out).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidConfig(_)), "unexpected error: {}", err);
}
