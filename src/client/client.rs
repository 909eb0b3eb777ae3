//! # Client Core
//!
//! [`PredictionClient`] owns one gRPC channel to a PredictionService and
//! performs `Predict` calls under a deadline. It does no retries: a failed
//! connect or call is returned to the caller as a [`ClientError`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! let address: ServerAddress = "localhost:9000".parse()?;
//! let mut client = PredictionClient::connect(&address, Duration::from_secs(5)).await?;
//! let response = client.predict(request, Duration::from_secs(10)).await?;
//! ```

use log::{error, info};
use std::time::{Duration, Instant};
use tonic::transport::{Channel, Endpoint};

use crate::common::config::ServerAddress;
use crate::common::error::{ClientError, Result};
use crate::proto::prediction_service::PredictionServiceClient;
use crate::proto::{PredictRequest, PredictResponse};

/// Largest response the client accepts. Label tensors for big vocabularies
/// exceed tonic's 4MB default.
const MAX_DECODING_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// A connected PredictionService stub.
pub struct PredictionClient {
    address: ServerAddress,
    stub: PredictionServiceClient<Channel>,
}

impl PredictionClient {
    /// Opens a plaintext HTTP/2 channel to `address`.
    ///
    /// The connection is established eagerly so an unreachable or refusing
    /// server is reported here, as [`ClientError::Connect`], rather than on
    /// the first call.
    pub async fn connect(address: &ServerAddress, connect_timeout: Duration) -> Result<Self> {
        let uri = address.endpoint_uri();
        info!("🔌 Connecting to PredictionService at {}", address);

        let endpoint = Endpoint::from_shared(uri).map_err(|e| ClientError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        let channel = endpoint
            .connect_timeout(connect_timeout)
            .connect()
            .await
            .map_err(|source| {
                error!("❌ Failed to connect to {}: {}", address, source);
                ClientError::Connect {
                    address: address.to_string(),
                    source,
                }
            })?;

        Ok(Self::from_channel(address.clone(), channel))
    }

    /// Wraps an already established channel.
    pub fn from_channel(address: ServerAddress, channel: Channel) -> Self {
        let stub = PredictionServiceClient::new(channel)
            .max_decoding_message_size(MAX_DECODING_MESSAGE_SIZE);
        Self { address, stub }
    }

    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Sends one `Predict` call and waits at most `deadline` for the answer.
    pub async fn predict(
        &mut self,
        request: PredictRequest,
        deadline: Duration,
    ) -> Result<PredictResponse> {
        let model = request
            .model_spec
            .as_ref()
            .map(|spec| spec.name.clone())
            .unwrap_or_default();
        info!(
            "📤 Sending Predict request for model '{}' to {} (deadline {:?})",
            model, self.address, deadline
        );

        // Sent to the server as `grpc-timeout`; the local timer still bounds
        // the wait.
        let mut request = tonic::Request::new(request);
        request.set_timeout(deadline);

        let started = Instant::now();
        let call = self.stub.predict(request);

        let response = match tokio::time::timeout(deadline, call).await {
            Ok(Ok(response)) => response.into_inner(),
            Ok(Err(status)) => {
                error!(
                    "❌ Predict failed after {:?}: {} ({})",
                    started.elapsed(),
                    status.message(),
                    status.code()
                );
                return Err(ClientError::from_status(status, deadline, started.elapsed()));
            }
            Err(_) => {
                error!("⏱️  Predict did not complete within {:?}", deadline);
                return Err(ClientError::DeadlineExceeded(deadline));
            }
        };

        info!(
            "✅ Received {} output tensor(s) in {:?}",
            response.outputs.len(),
            started.elapsed()
        );
        Ok(response)
    }
}
