use serde_json::json;

use offline_asr::application::services::{SegmentShape, normalize_output};
use offline_asr::domain::{Segment, Segments};

#[test]
fn given_bare_string_when_normalizing_then_text_is_trimmed_and_segments_are_null() {
    let result = normalize_output(json!("hello world "), None, SegmentShape::Canonical);

    assert_eq!(result.text, "hello world");
    assert_eq!(result.segments, None);
    assert!(result.meta.is_empty());
}

#[test]
fn given_map_with_segments_when_normalizing_then_canonical_list_and_caller_language_are_kept() {
    let raw = json!({
        "text": "hi",
        "segments": [{"id": 0, "start": 0.0, "end": 1.0, "text": "hi"}]
    });

    let result = normalize_output(raw, Some("en"), SegmentShape::Canonical);

    assert_eq!(result.text, "hi");
    assert_eq!(result.language.as_deref(), Some("en"));
    assert_eq!(
        result.segments,
        Some(Segments::Canonical(vec![Segment {
            id: Some(0),
            start: Some(0.0),
            end: Some(1.0),
            text: Some("hi".to_string()),
            avg_logprob: None,
            no_speech_prob: None,
        }]))
    );
}

#[test]
fn given_non_list_segments_when_normalizing_then_segments_are_dropped() {
    let raw = json!({"text": "hi", "segments": "0-1s"});

    let result = normalize_output(raw, None, SegmentShape::Verbatim);

    assert_eq!(result.segments, None);
}

#[test]
fn given_null_text_when_normalizing_then_result_key_is_used() {
    let raw = json!({"text": null, "result": "ответ"});

    let result = normalize_output(raw, None, SegmentShape::Verbatim);

    assert_eq!(result.text, "ответ");
}
