//! # Client Components
//!
//! - [`client`]: the connected PredictionService stub with deadline handling
//! - [`request`]: builds the `PredictRequest` carrying the image
//! - [`output`]: renders the `PredictResponse` as text or JSON
//!
//! [`run`] strings them together into one invocation.

pub mod client;
pub mod output;
pub mod request;

pub use client::PredictionClient;
pub use output::OutputFormat;

use log::info;
use std::io::{self, Write};

use crate::common::config::ClientConfig;
use crate::common::error::{ClientError, Result};

/// Performs one classification round trip and writes the rendered response
/// to `out`.
///
/// Order of operations:
/// 1. Validate the config and parse the server address
/// 2. Read the image file (before any network traffic)
/// 3. Connect to the service
/// 4. Send one `Predict` request under the configured deadline
/// 5. Render the response into `out`
///
/// Nothing is written to `out` unless the call succeeds.
pub async fn run<W: Write>(config: &ClientConfig, out: &mut W) -> Result<()> {
    config.validate()?;
    let address = config.server_address()?;

    let path = &config.request.image;
    if path.as_os_str().is_empty() {
        return Err(ClientError::ImageRead {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "no image path given"),
        });
    }
    let image = tokio::fs::read(path).await.map_err(|source| ClientError::ImageRead {
        path: path.clone(),
        source,
    })?;
    info!("📂 Read {} bytes from {}", image.len(), path.display());
    request::inspect_image(&image);

    let predict_request = request::build_predict_request(&config.model, image);

    let mut client = PredictionClient::connect(&address, config.connect_timeout()).await?;
    let response = client.predict(predict_request, config.timeout()).await?;

    let rendered = output::render(&response, config.output.format);
    out.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()?;

    Ok(())
}
