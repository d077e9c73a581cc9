use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical whisper-style segment. Every field is optional because native
/// backends fill in different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: Option<i64>,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub text: Option<String>,
    pub avg_logprob: Option<f64>,
    pub no_speech_prob: Option<f64>,
}

impl Segment {
    /// Projects a native segment map onto the canonical fields, dropping
    /// anything unrecognized. Returns `None` for non-map values.
    pub fn project(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            id: map.get("id").and_then(Value::as_i64),
            start: map.get("start").and_then(Value::as_f64),
            end: map.get("end").and_then(Value::as_f64),
            text: map.get("text").and_then(Value::as_str).map(String::from),
            avg_logprob: map.get("avg_logprob").and_then(Value::as_f64),
            no_speech_prob: map.get("no_speech_prob").and_then(Value::as_f64),
        })
    }
}

/// Segments as they leave an adapter: projected for whisper-style backends,
/// passed through untouched otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Segments {
    Canonical(Vec<Segment>),
    Verbatim(Vec<Value>),
}

impl Segments {
    pub fn len(&self) -> usize {
        match self {
            Segments::Canonical(s) => s.len(),
            Segments::Verbatim(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
