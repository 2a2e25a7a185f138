use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// An encoded, size-bounded image ready to send to a provider or composite.
///
/// The encoded bytes are shared and never mutated after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Arc<[u8]>,
    mime_type: String,
    width: u32,
    height: u32,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}
