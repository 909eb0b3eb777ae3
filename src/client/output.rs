//! # Response Rendering
//!
//! Turns a [`PredictResponse`] into text for standard output.
//!
//! - [`OutputFormat::Text`]: protobuf text format, the same shape
//!   `print(response)` gives in the Python client. Fields appear in
//!   field-number order, proto3 defaults are omitted, map entries are sorted
//!   by key.
//! - [`OutputFormat::Json`]: the protobuf JSON mapping (camelCase names,
//!   64-bit integers as strings, bytes as base64).
//!
//! Rendering only borrows the response.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::proto::model_spec::VersionChoice;
use crate::proto::{DataType, ModelSpec, PredictResponse, TensorProto, TensorShapeProto};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Protobuf text format
    #[default]
    Text,
    /// Protobuf JSON mapping, pretty-printed
    Json,
}

/// Renders `response` in the requested format. Text output ends with a
/// newline after the last field; JSON output does not.
pub fn render(response: &PredictResponse, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => to_text(response),
        OutputFormat::Json => {
            // Serializing a Value cannot fail
            serde_json::to_string_pretty(&to_json(response)).unwrap_or_default()
        }
    }
}

// ---------------------------------------------------------------------------
// Text format
// ---------------------------------------------------------------------------

struct TextWriter {
    out: String,
    indent: usize,
}

impl TextWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, content: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(content);
        self.out.push('\n');
    }

    fn field(&mut self, name: &str, value: impl std::fmt::Display) {
        self.line(&format!("{}: {}", name, value));
    }

    fn bytes_field(&mut self, name: &str, value: &[u8]) {
        self.line(&format!("{}: \"{}\"", name, c_escape(value)));
    }

    fn open(&mut self, name: &str) {
        self.line(&format!("{} {{", name));
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent -= 1;
        self.line("}");
    }
}

/// Protobuf text format for a response.
pub fn to_text(response: &PredictResponse) -> String {
    let mut w = TextWriter::new();

    let mut keys: Vec<&String> = response.outputs.keys().collect();
    keys.sort();
    for key in keys {
        w.open("outputs");
        w.bytes_field("key", key.as_bytes());
        w.open("value");
        write_tensor(&mut w, &response.outputs[key]);
        w.close();
        w.close();
    }

    if let Some(spec) = &response.model_spec {
        w.open("model_spec");
        write_model_spec(&mut w, spec);
        w.close();
    }

    w.out
}

fn write_model_spec(w: &mut TextWriter, spec: &ModelSpec) {
    if !spec.name.is_empty() {
        w.bytes_field("name", spec.name.as_bytes());
    }
    if let Some(VersionChoice::Version(version)) = &spec.version_choice {
        w.open("version");
        if *version != 0 {
            w.field("value", version);
        }
        w.close();
    }
    if !spec.signature_name.is_empty() {
        w.bytes_field("signature_name", spec.signature_name.as_bytes());
    }
    if let Some(VersionChoice::VersionLabel(label)) = &spec.version_choice {
        w.bytes_field("version_label", label.as_bytes());
    }
}

fn write_tensor(w: &mut TextWriter, tensor: &TensorProto) {
    if tensor.dtype != 0 {
        match DataType::try_from(tensor.dtype) {
            Ok(dtype) => w.field("dtype", dtype.name()),
            Err(_) => w.field("dtype", tensor.dtype),
        }
    }
    if let Some(shape) = &tensor.tensor_shape {
        w.open("tensor_shape");
        write_shape(w, shape);
        w.close();
    }
    if tensor.version_number != 0 {
        w.field("version_number", tensor.version_number);
    }
    if !tensor.tensor_content.is_empty() {
        w.bytes_field("tensor_content", &tensor.tensor_content);
    }
    for v in &tensor.float_val {
        w.field("float_val", python_float(f64::from(*v), &format!("{:e}", v)));
    }
    for v in &tensor.double_val {
        w.field("double_val", python_float(*v, &format!("{:e}", v)));
    }
    for v in &tensor.int_val {
        w.field("int_val", v);
    }
    for v in &tensor.string_val {
        w.bytes_field("string_val", v);
    }
    for v in &tensor.scomplex_val {
        w.field("scomplex_val", python_float(f64::from(*v), &format!("{:e}", v)));
    }
    for v in &tensor.int64_val {
        w.field("int64_val", v);
    }
    for v in &tensor.bool_val {
        w.field("bool_val", v);
    }
    for v in &tensor.dcomplex_val {
        w.field("dcomplex_val", python_float(*v, &format!("{:e}", v)));
    }
    for v in &tensor.half_val {
        w.field("half_val", v);
    }
    for v in &tensor.uint32_val {
        w.field("uint32_val", v);
    }
    for v in &tensor.uint64_val {
        w.field("uint64_val", v);
    }
}

fn write_shape(w: &mut TextWriter, shape: &TensorShapeProto) {
    for dim in &shape.dim {
        w.open("dim");
        if dim.size != 0 {
            w.field("size", dim.size);
        }
        if !dim.name.is_empty() {
            w.bytes_field("name", dim.name.as_bytes());
        }
        w.close();
    }
    if shape.unknown_rank {
        w.field("unknown_rank", true);
    }
}

/// Spells a float the way Python's `repr` does: `1.0`, `0.1`, `1e+20`,
/// `1e-05`, `nan`, `-inf`. `sci` is the shortest round-trip form from
/// `{:e}`, so `f32` values keep single-precision digits.
///
/// Positional notation is used while the decimal point sits within
/// `-4 < point <= 16` digits of the first significant digit.
fn python_float(value: f64, sci: &str) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return (if value > 0.0 { "inf" } else { "-inf" }).to_string();
    }

    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let point = exp + 1;

    let body = if point <= -4 || point > 16 {
        let (first, rest) = digits.split_at(1);
        let frac = if rest.is_empty() {
            String::new()
        } else {
            format!(".{}", rest)
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", first, frac, exp_sign, exp.abs())
    } else if point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    } else if (point as usize) < digits.len() {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else {
        format!("{}{}.0", digits, "0".repeat(point as usize - digits.len()))
    };

    format!("{}{}", sign, body)
}

/// C-style escaping as used by protobuf text format: quotes, backslash and
/// common control characters get a backslash, every other byte outside
/// printable ASCII becomes a three-digit octal escape.
pub fn c_escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b'"' => out.push_str("\\\""),
            b'\'' => out.push_str("\\'"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:03o}", b)),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// JSON mapping
// ---------------------------------------------------------------------------

/// Protobuf JSON mapping for a response.
pub fn to_json(response: &PredictResponse) -> Value {
    let mut root = Map::new();

    if !response.outputs.is_empty() {
        let outputs: Map<String, Value> = response
            .outputs
            .iter()
            .map(|(key, tensor)| (key.clone(), tensor_json(tensor)))
            .collect();
        root.insert("outputs".to_string(), Value::Object(outputs));
    }
    if let Some(spec) = &response.model_spec {
        root.insert("modelSpec".to_string(), model_spec_json(spec));
    }

    Value::Object(root)
}

fn model_spec_json(spec: &ModelSpec) -> Value {
    let mut obj = Map::new();
    if !spec.name.is_empty() {
        obj.insert("name".to_string(), json!(spec.name));
    }
    match &spec.version_choice {
        Some(VersionChoice::Version(version)) => {
            // Int64Value maps to its bare value, as a string
            obj.insert("version".to_string(), json!(version.to_string()));
        }
        Some(VersionChoice::VersionLabel(label)) => {
            obj.insert("versionLabel".to_string(), json!(label));
        }
        None => {}
    }
    if !spec.signature_name.is_empty() {
        obj.insert("signatureName".to_string(), json!(spec.signature_name));
    }
    Value::Object(obj)
}

fn tensor_json(tensor: &TensorProto) -> Value {
    let b64 = base64::engine::general_purpose::STANDARD;
    let mut obj = Map::new();

    if tensor.dtype != 0 {
        let dtype = match DataType::try_from(tensor.dtype) {
            Ok(dtype) => json!(dtype.name()),
            Err(_) => json!(tensor.dtype),
        };
        obj.insert("dtype".to_string(), dtype);
    }
    if let Some(shape) = &tensor.tensor_shape {
        let mut shape_obj = Map::new();
        if !shape.dim.is_empty() {
            let dims: Vec<Value> = shape
                .dim
                .iter()
                .map(|dim| {
                    let mut d = Map::new();
                    if dim.size != 0 {
                        d.insert("size".to_string(), json!(dim.size.to_string()));
                    }
                    if !dim.name.is_empty() {
                        d.insert("name".to_string(), json!(dim.name));
                    }
                    Value::Object(d)
                })
                .collect();
            shape_obj.insert("dim".to_string(), Value::Array(dims));
        }
        if shape.unknown_rank {
            shape_obj.insert("unknownRank".to_string(), json!(true));
        }
        obj.insert("tensorShape".to_string(), Value::Object(shape_obj));
    }
    if tensor.version_number != 0 {
        obj.insert("versionNumber".to_string(), json!(tensor.version_number));
    }
    if !tensor.tensor_content.is_empty() {
        obj.insert("tensorContent".to_string(), json!(b64.encode(&tensor.tensor_content)));
    }

    if !tensor.float_val.is_empty() {
        let v = tensor.float_val.iter().copied().map(float32_json).collect();
        obj.insert("floatVal".to_string(), Value::Array(v));
    }
    if !tensor.double_val.is_empty() {
        let v = tensor.double_val.iter().copied().map(float_json).collect();
        obj.insert("doubleVal".to_string(), Value::Array(v));
    }
    if !tensor.int_val.is_empty() {
        obj.insert("intVal".to_string(), json!(tensor.int_val));
    }
    if !tensor.string_val.is_empty() {
        let v: Vec<String> = tensor.string_val.iter().map(|s| b64.encode(s)).collect();
        obj.insert("stringVal".to_string(), json!(v));
    }
    if !tensor.scomplex_val.is_empty() {
        let v = tensor.scomplex_val.iter().copied().map(float32_json).collect();
        obj.insert("scomplexVal".to_string(), Value::Array(v));
    }
    if !tensor.int64_val.is_empty() {
        let v: Vec<String> = tensor.int64_val.iter().map(|v| v.to_string()).collect();
        obj.insert("int64Val".to_string(), json!(v));
    }
    if !tensor.bool_val.is_empty() {
        obj.insert("boolVal".to_string(), json!(tensor.bool_val));
    }
    if !tensor.dcomplex_val.is_empty() {
        let v = tensor.dcomplex_val.iter().copied().map(float_json).collect();
        obj.insert("dcomplexVal".to_string(), Value::Array(v));
    }
    if !tensor.half_val.is_empty() {
        obj.insert("halfVal".to_string(), json!(tensor.half_val));
    }
    if !tensor.uint32_val.is_empty() {
        obj.insert("uint32Val".to_string(), json!(tensor.uint32_val));
    }
    if !tensor.uint64_val.is_empty() {
        let v: Vec<String> = tensor.uint64_val.iter().map(|v| v.to_string()).collect();
        obj.insert("uint64Val".to_string(), json!(v));
    }

    Value::Object(obj)
}

/// A `float` field at single precision: the shortest digits that round-trip
/// through `f32`, not the widened `f64` value.
fn float32_json(value: f32) -> Value {
    if !value.is_finite() {
        return float_json(f64::from(value));
    }
    format!("{:e}", value)
        .parse::<serde_json::Number>()
        .map(Value::Number)
        .unwrap_or_else(|_| float_json(f64::from(value)))
}

/// JSON has no non-finite numbers; the mapping uses the strings
/// `"NaN"`, `"Infinity"` and `"-Infinity"`.
fn float_json(value: f64) -> Value {
    if value.is_nan() {
        json!("NaN")
    } else if value.is_infinite() {
        let name = if value > 0.0 { "Infinity" } else { "-Infinity" };
        json!(name)
    } else {
        json!(value)
    }
}
