use std::path::Path;

use serde_json::Map;

use offline_asr::application::ports::{ModelInterface, ModelLoader, NativeError, NativeModel};
use offline_asr::infrastructure::audio::{GigaAmRecognizerConfig, SherpaGigaAmLoader};

#[test]
fn given_model_id_when_resolving_then_it_is_looked_up_under_models_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    let loader = SherpaGigaAmLoader::new(dir.path(), GigaAmRecognizerConfig::default());

    assert_eq!(loader.model_dir("v2_ctc"), dir.path().join("v2_ctc"));
}

#[test]
fn given_existing_path_when_resolving_then_it_is_used_directly() {
    let models = tempfile::TempDir::new().unwrap();
    let elsewhere = tempfile::TempDir::new().unwrap();
    let loader = SherpaGigaAmLoader::new(models.path(), GigaAmRecognizerConfig::default());

    let resolved = loader.model_dir(elsewhere.path().to_str().unwrap());

    assert_eq!(resolved, elsewhere.path());
}

#[test]
fn given_dir_without_tokens_when_loading_then_returns_model_not_found() {
    let models = tempfile::TempDir::new().unwrap();
    let model_dir = models.path().join("v2_ctc");
    std::fs::create_dir_all(&model_dir).unwrap();
    std::fs::write(model_dir.join("model.onnx"), b"").unwrap();
    let loader = SherpaGigaAmLoader::new(models.path(), GigaAmRecognizerConfig::default());

    let result = loader.load("v2_ctc");

    assert!(matches!(result, Err(NativeError::ModelNotFound(_))));
}

#[test]
fn given_export_files_when_loading_then_no_recognizer_is_created_before_placement() {
    let models = tempfile::TempDir::new().unwrap();
    let model_dir = models.path().join("v2_ctc");
    std::fs::create_dir_all(&model_dir).unwrap();
    std::fs::write(model_dir.join("model.onnx"), b"").unwrap();
    std::fs::write(model_dir.join("tokens.txt"), b"").unwrap();
    let loader = SherpaGigaAmLoader::new(models.path(), GigaAmRecognizerConfig::default());

    let model = loader.load("v2_ctc").unwrap();

    assert_eq!(model.interface(), ModelInterface::Callable);
    let err = model.invoke(Path::new("a.wav"), &Map::new());
    assert!(matches!(err, Err(NativeError::Inference(_))));
}

#[test]
fn given_default_config_when_created_then_uses_gigaam_feature_dim() {
    let config = GigaAmRecognizerConfig::default();

    assert_eq!(config.feature_dim, 64);
    assert!(config.num_threads > 0);
}
