//! Common types used throughout edr-export

use std::collections::HashMap;

/// An opaque telemetry record as delivered by the platform.
///
/// The collector never inspects record contents, only page metadata, so
/// records stay schema-less JSON values end to end.
pub type Record = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;
