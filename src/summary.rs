//! Validation of the summarizer's raw reply.
//!
//! The reply must decode to a JSON object carrying `topic`, `entities`,
//! `summary` and `timeline`. Missing keys become the `"na"` sentinel; a reply
//! that does not decode at all becomes the all-sentinel summary.

use crate::models::{Entities, Field, SENTINEL, StructuredSummary, TimelineEvent};
use crate::utils::truncate_for_log;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

/// The keys every summary must carry.
pub const REQUIRED_KEYS: [&str; 4] = ["topic", "entities", "summary", "timeline"];

/// Decode `raw` into a [`StructuredSummary`], substituting the sentinel for
/// anything missing or malformed. Never fails.
#[instrument(level = "info", skip_all, fields(bytes = raw.len()))]
pub fn validate_summary(raw: &str) -> StructuredSummary {
    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(kind = json_kind(&other), "Summary is not a JSON object; using sentinel summary");
            return StructuredSummary::sentinel();
        }
        Err(e) => {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(raw, 300),
                "Summary is not valid JSON; using sentinel summary"
            );
            return StructuredSummary::sentinel();
        }
    };

    for key in REQUIRED_KEYS {
        if !object.contains_key(key) {
            warn!(key, "Summary is missing a required key; filling with sentinel");
        }
    }

    let summary = StructuredSummary {
        topic: field::<String>(&object, "topic"),
        entities: field::<Entities>(&object, "entities").map(dedupe_entities),
        summary: field::<String>(&object, "summary"),
        timeline: field::<Vec<TimelineEvent>>(&object, "timeline"),
    };
    debug!(?summary.topic, "Validated summary");
    summary
}

/// Decode one top-level key. A value of the wrong shape is treated as missing.
fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Field<T> {
    match object.get(key) {
        None => Field::Sentinel,
        Some(Value::String(s)) if s == SENTINEL => Field::Sentinel,
        Some(value) => match serde_json::from_value::<T>(value.clone()) {
            Ok(v) => Field::Value(v),
            Err(e) => {
                warn!(key, error = %e, "Summary field has the wrong shape; filling with sentinel");
                Field::Sentinel
            }
        },
    }
}

fn dedupe_entities(entities: Entities) -> Entities {
    Entities {
        organizations: entities.organizations.into_iter().unique().collect(),
        people: entities.people.into_iter().unique().collect(),
        locations: entities.locations.into_iter().unique().collect(),
        key_terms: entities.key_terms.into_iter().unique().collect(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
