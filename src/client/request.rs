//! # Request Construction
//!
//! Builds the single `PredictRequest` an invocation sends: a model spec plus
//! one input tensor named `image` holding the raw file bytes.

use log::{info, warn};

use crate::common::config::ModelConfig;
use crate::proto::model_spec::VersionChoice;
use crate::proto::{DataType, ModelSpec, PredictRequest, TensorProto, TensorShapeProto};

/// Signature input alias that receives the encoded image.
pub const IMAGE_INPUT_KEY: &str = "image";

/// Wraps one byte string as a scalar `DT_STRING` tensor.
///
/// This is what `make_tensor_proto(bytes)` yields: an empty (rank-0) shape
/// and the bytes as the only `string_val` entry. The bytes are not decoded.
pub fn make_string_tensor(bytes: Vec<u8>) -> TensorProto {
    TensorProto {
        dtype: DataType::DtString as i32,
        tensor_shape: Some(TensorShapeProto::default()),
        string_val: vec![bytes],
        ..Default::default()
    }
}

pub fn model_spec(model: &ModelConfig) -> ModelSpec {
    ModelSpec {
        name: model.name.clone(),
        signature_name: model.signature_name.clone(),
        version_choice: model.version.map(VersionChoice::Version),
    }
}

/// Builds the classification request for `image`.
pub fn build_predict_request(model: &ModelConfig, image: Vec<u8>) -> PredictRequest {
    let mut request = PredictRequest {
        model_spec: Some(model_spec(model)),
        ..Default::default()
    };
    request
        .inputs
        .insert(IMAGE_INPUT_KEY.to_string(), make_string_tensor(image));
    request
}

/// Logs what kind of image the payload looks like. The payload is sent
/// unchanged either way; the server model expects JPEG.
pub fn inspect_image(bytes: &[u8]) {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => {
            info!("🖼️  Image is JPEG ({} bytes)", bytes.len());
        }
        Ok(format) => {
            warn!(
                "⚠️  Image looks like {:?}, not JPEG ({} bytes); sending as-is",
                format,
                bytes.len()
            );
        }
        Err(_) => {
            warn!(
                "⚠️  Could not identify image format ({} bytes); sending as-is",
                bytes.len()
            );
        }
    }
}
