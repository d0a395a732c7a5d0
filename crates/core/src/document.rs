//! JSON documents and the fields mirrored into the record index
//!
//! A [`Document`] is always a JSON object. Documents are held as
//! `serde_json::Value` without `preserve_order`, so object keys are stored
//! sorted and the compact serialization is canonical with respect to key
//! order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::key::RecordKey;
use crate::limits::Limits;

/// Document field holding the intern's registration number.
pub const REGISTRATION_NUMBER_FIELD: &str = "matriculaEstagiario";
/// Document field holding the intern's name.
pub const INTERN_NAME_FIELD: &str = "nomeEstagiario";
/// Document field holding the company name.
pub const COMPANY_NAME_FIELD: &str = "nomeEmpresa";

/// A JSON object submitted by a client or read back from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    /// Wrap a JSON value, which must be an object.
    pub fn new(value: Value) -> StoreResult<Self> {
        if !value.is_object() {
            return Err(StoreError::validation("document must be a JSON object"));
        }
        Ok(Document(value))
    }

    /// Parse a document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> StoreResult<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::new(value)
    }

    /// Borrow the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Extract and validate the document's own record key.
    pub fn record_key(&self) -> StoreResult<RecordKey> {
        RecordKey::from_document(&self.0)
    }

    /// Denormalized fields for the record index.
    pub fn index_fields(&self) -> IndexFields {
        IndexFields {
            registration_number: text_field(&self.0, REGISTRATION_NUMBER_FIELD),
            intern_name: text_field(&self.0, INTERN_NAME_FIELD),
            company_name: text_field(&self.0, COMPANY_NAME_FIELD),
        }
    }

    /// Compact serialization, the input to fingerprinting.
    pub fn to_compact_string(&self) -> String {
        self.0.to_string()
    }

    /// Pretty-printed serialization (2-space indent) used for snapshot files.
    pub fn to_pretty_bytes(&self) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.0)?)
    }

    /// Reject documents larger than the configured limit.
    pub fn check_limits(&self, limits: &Limits) -> StoreResult<()> {
        let size = self.to_compact_string().len();
        if size > limits.max_document_bytes {
            return Err(StoreError::validation(format!(
                "document too large: {} bytes exceeds maximum {}",
                size, limits.max_document_bytes
            )));
        }
        Ok(())
    }
}

impl TryFrom<Value> for Document {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Document::new(value)
    }
}

fn text_field(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Denormalized metadata copied from the latest document into the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFields {
    /// `matriculaEstagiario`
    pub registration_number: Option<String>,
    /// `nomeEstagiario`
    pub intern_name: Option<String>,
    /// `nomeEmpresa`
    pub company_name: Option<String>,
}
