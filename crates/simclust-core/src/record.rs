//! Record and resolution types carried through the enrichment pipeline.

use serde::Serialize;

/// A single raw input value, tagged with its position in the batch.
///
/// `index` counts non-blank input lines only, so it is dense: the batch of
/// records 0..n maps one-to-one onto output rows 0..n.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub index: usize,
    pub value: String,
}

impl Record {
    pub fn new(index: usize, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
        }
    }
}

/// How a single remote lookup ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Service returned a non-empty similarity key with the success marker.
    Success,
    /// Service answered with a non-success result code. Any key it returned
    /// alongside is still carried on the resolution.
    NonSuccessCode,
    /// Well-formed response, but the key field was absent or empty.
    Empty,
    /// Connection failure, timeout, or non-2xx status.
    TransportError,
    /// Response body was not the expected JSON object.
    DecodeError,
}

/// The result of resolving one [`Record`] against the matching service.
///
/// Exactly one resolution exists per record; it is never mutated after the
/// resolver produces it. `key` is `Some` (and non-empty) for [`Outcome::Success`]
/// and for [`Outcome::NonSuccessCode`] when the service returned a usable key
/// despite the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub record: Record,
    pub key: Option<String>,
    pub outcome: Outcome,
}

impl Resolution {
    /// A resolution carrying a usable similarity key.
    pub fn keyed(record: Record, key: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            record,
            key: Some(key.into()),
            outcome,
        }
    }

    /// A degraded resolution with no key; the record keeps its slot in the
    /// batch but can never join a cluster.
    pub fn keyless(record: Record, outcome: Outcome) -> Self {
        Self {
            record,
            key: None,
            outcome,
        }
    }

    /// The key for output rows: failures render as an empty string, never as
    /// a dropped row.
    pub fn key_or_empty(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}
