use std::path::PathBuf;

use offline_asr::application::ports::EngineError;
use offline_asr::application::services::TranscribeRequest;
use offline_asr::domain::EngineName;

use crate::support::TestEngines;

#[test]
fn given_registry_when_listing_then_engines_come_in_stable_order() {
    let engines = TestEngines::standard();
    let registry_names = engines.service.catalog().available;

    assert_eq!(registry_names, vec![EngineName::Whisper, EngineName::GigaAm]);
}

#[tokio::test]
async fn given_unknown_engine_when_running_then_fails_without_loading_anything() {
    let engines = TestEngines::standard();

    let err = engines
        .service
        .run(TranscribeRequest::new("unknown-engine", PathBuf::from("a.wav")))
        .await
        .unwrap_err();

    match &err {
        EngineError::UnknownEngine { name, valid } => {
            assert_eq!(name, "unknown-engine");
            assert_eq!(valid, &vec![EngineName::Whisper, EngineName::GigaAm]);
        }
        other => panic!("expected UnknownEngineError, got {other:?}"),
    }
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "unknown engine 'unknown-engine', use one of: whisper, gigaam"
    );
    assert_eq!(engines.whisper_loader.load_count(), 0);
    assert_eq!(engines.gigaam_loader.load_count(), 0);
}

#[tokio::test]
async fn given_mixed_case_engine_name_when_running_then_engine_is_found() {
    let engines = TestEngines::standard();

    let response = engines
        .service
        .run(TranscribeRequest::new(" GigaAM ", PathBuf::from("a.wav")))
        .await
        .unwrap();

    assert_eq!(response.engine, EngineName::GigaAm);
}
