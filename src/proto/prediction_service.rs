//! # PredictionService gRPC Bindings
//!
//! Client stub and server scaffold for the `Predict` method of
//! `tensorflow.serving.PredictionService`, in the shape `tonic-build` emits.
//! The client is what the binary uses. The server side lets tests (or any
//! embedding application) stand up an in-process service.

use tonic::codegen::*;

use super::{PredictRequest, PredictResponse};

/// Fully qualified gRPC service name.
pub const SERVICE_NAME: &str = "tensorflow.serving.PredictionService";

/// HTTP/2 path of the unary `Predict` call.
pub const PREDICT_PATH: &str = "/tensorflow.serving.PredictionService/Predict";

/// Generated-style client stub for `PredictionService`.
#[derive(Debug, Clone)]
pub struct PredictionServiceClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl PredictionServiceClient<tonic::transport::Channel> {
    /// Attempt to create a new client by connecting to a given endpoint.
    pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
    where
        D: TryInto<tonic::transport::Endpoint>,
        D::Error: Into<StdError>,
    {
        let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
        Ok(Self::new(conn))
    }
}

impl<T> PredictionServiceClient<T>
where
    T: tonic::client::GrpcService<tonic::body::BoxBody>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
{
    pub fn new(inner: T) -> Self {
        let inner = tonic::client::Grpc::new(inner);
        Self { inner }
    }

    /// Limits the maximum size of a decoded message. Default: 4MB.
    pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
        self.inner = self.inner.max_decoding_message_size(limit);
        self
    }

    /// Limits the maximum size of an encoded message. Default: `usize::MAX`.
    pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
        self.inner = self.inner.max_encoding_message_size(limit);
        self
    }

    /// Predict -- provides access to a loaded TensorFlow model.
    pub async fn predict(
        &mut self,
        request: impl tonic::IntoRequest<PredictRequest>,
    ) -> std::result::Result<tonic::Response<PredictResponse>, tonic::Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unknown(format!("Service was not ready: {}", e.into())))?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static(PREDICT_PATH);
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new(SERVICE_NAME, "Predict"));
        self.inner.unary(req, path, codec).await
    }
}

/// Server-side contract for `PredictionService`.
#[tonic::async_trait]
pub trait PredictionService: std::marker::Send + std::marker::Sync + 'static {
    async fn predict(
        &self,
        request: tonic::Request<PredictRequest>,
    ) -> std::result::Result<tonic::Response<PredictResponse>, tonic::Status>;
}

/// Generated-style server wrapper that routes HTTP/2 requests to a
/// [`PredictionService`] implementation.
#[derive(Debug)]
pub struct PredictionServiceServer<T: PredictionService> {
    inner: Arc<T>,
}

impl<T: PredictionService> PredictionServiceServer<T> {
    pub fn new(inner: T) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    pub fn from_arc(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

impl<T, B> Service<http::Request<B>> for PredictionServiceServer<T>
where
    T: PredictionService,
    B: Body + std::marker::Send + 'static,
    B::Error: Into<StdError> + std::marker::Send + 'static,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(
        &mut self,
        _cx: &mut Context<'_>,
    ) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        match req.uri().path() {
            PREDICT_PATH => {
                struct PredictSvc<T: PredictionService>(pub Arc<T>);

                impl<T: PredictionService> tonic::server::UnaryService<PredictRequest> for PredictSvc<T> {
                    type Response = PredictResponse;
                    type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;

                    fn call(&mut self, request: tonic::Request<PredictRequest>) -> Self::Future {
                        let inner = Arc::clone(&self.0);
                        let fut = async move {
                            <T as PredictionService>::predict(&inner, request).await
                        };
                        Box::pin(fut)
                    }
                }

                let inner = self.inner.clone();
                let fut = async move {
                    let method = PredictSvc(inner);
                    let codec = tonic::codec::ProstCodec::default();
                    let mut grpc = tonic::server::Grpc::new(codec);
                    let res = grpc.unary(method, req).await;
                    Ok(res)
                };
                Box::pin(fut)
            }
            _ => Box::pin(async move {
                let mut response = http::Response::new(empty_body());
                let headers = response.headers_mut();
                headers.insert(
                    tonic::Status::GRPC_STATUS,
                    (tonic::Code::Unimplemented as i32).into(),
                );
                headers.insert(
                    http::header::CONTENT_TYPE,
                    tonic::metadata::GRPC_CONTENT_TYPE,
                );
                Ok(response)
            }),
        }
    }
}

impl<T: PredictionService> Clone for PredictionServiceServer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: PredictionService> tonic::server::NamedService for PredictionServiceServer<T> {
    const NAME: &'static str = SERVICE_NAME;
}
