use serde_json::{Map, Value};

use crate::application::ports::RawOutput;
use crate::domain::{Segment, Segments, TranscriptionResult};

/// How an adapter wants native segment lists handed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    /// Project each entry onto [`Segment`], dropping unknown fields.
    Canonical,
    /// Keep entries exactly as the backend produced them.
    Verbatim,
}

/// Folds whatever a native backend returned into a [`TranscriptionResult`].
/// `meta` is left empty for the adapter to fill in.
pub fn normalize_output(
    raw: RawOutput,
    language: Option<&str>,
    shape: SegmentShape,
) -> TranscriptionResult {
    let fallback_language = language.map(String::from);

    match raw {
        Value::String(text) => TranscriptionResult {
            text: text.trim().to_string(),
            language: fallback_language,
            segments: None,
            meta: Map::new(),
        },
        Value::Object(mut map) => {
            let text = ["text", "result"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find(|value| is_present(value))
                .map(value_to_text)
                .unwrap_or_default();

            let language = map
                .get("language")
                .and_then(Value::as_str)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .or(fallback_language);

            let segments = map.remove("segments").and_then(|s| shape_segments(s, shape));

            TranscriptionResult {
                text: text.trim().to_string(),
                language,
                segments,
                meta: Map::new(),
            }
        }
        other => TranscriptionResult {
            text: value_to_text(&other).trim().to_string(),
            language: fallback_language,
            segments: None,
            meta: Map::new(),
        },
    }
}

fn shape_segments(value: Value, shape: SegmentShape) -> Option<Segments> {
    let Value::Array(items) = value else {
        if !value.is_null() {
            tracing::debug!(segments = %value, "Ignoring non-list segments value");
        }
        return None;
    };

    Some(match shape {
        SegmentShape::Canonical => {
            Segments::Canonical(items.iter().filter_map(Segment::project).collect())
        }
        SegmentShape::Verbatim => Segments::Verbatim(items),
    })
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
