use candle_core::{DType, Device};

use offline_asr::application::ports::{
    AccelerationProbe, ModelInterface, ModelLoader, NativeError, NativeModel,
};
use offline_asr::domain::ComputeDevice;
use offline_asr::infrastructure::audio::{
    CandleAccelerationProbe, CandleWhisperLoader, CandleWhisperModel,
};

#[test]
fn given_cpu_device_when_selecting_dtype_then_returns_f32() {
    let dtype = CandleWhisperModel::select_dtype(&Device::Cpu);
    assert!(matches!(dtype, DType::F32));
}

#[test]
fn given_cuda_device_when_selecting_dtype_then_returns_f16() {
    let device = Device::new_cuda(0).unwrap_or(Device::Cpu);
    let dtype = CandleWhisperModel::select_dtype(&device);
    let expected = if device.is_cpu() {
        DType::F32
    } else {
        DType::F16
    };
    assert_eq!(dtype, expected);
}

#[test]
fn given_bare_size_when_resolving_repo_then_maps_to_openai_whisper() {
    assert_eq!(CandleWhisperLoader::repo_id("base"), "openai/whisper-base");
    assert_eq!(CandleWhisperLoader::repo_id("large-v3"), "openai/whisper-large-v3");
    assert_eq!(
        CandleWhisperLoader::repo_id("distil-whisper/distil-small.en"),
        "distil-whisper/distil-small.en"
    );
}

#[test]
fn given_local_dir_without_weights_when_loading_then_returns_model_not_found() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{}").unwrap();

    let result = CandleWhisperLoader.load(dir.path().to_str().unwrap());

    assert!(matches!(result, Err(NativeError::ModelNotFound(_))));
}

const TINY_CONFIG: &str = r#"{
    "num_mel_bins": 80,
    "max_source_positions": 1500,
    "d_model": 4,
    "encoder_attention_heads": 1,
    "encoder_layers": 1,
    "vocab_size": 8,
    "max_target_positions": 8,
    "decoder_attention_heads": 1,
    "decoder_layers": 1
}"#;

const TINY_TOKENIZER: &str = r#"{
    "version": "1.0",
    "model": {
        "type": "WordLevel",
        "vocab": {"<|endoftext|>": 0, "<|startoftranscript|>": 1},
        "unk_token": "<|endoftext|>"
    }
}"#;

#[test]
fn given_unreadable_weights_when_loading_then_network_is_only_built_at_placement() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), TINY_CONFIG).unwrap();
    std::fs::write(dir.path().join("tokenizer.json"), TINY_TOKENIZER).unwrap();
    std::fs::write(dir.path().join("model.safetensors"), b"").unwrap();

    let mut model = CandleWhisperLoader
        .load(dir.path().to_str().unwrap())
        .unwrap();
    assert_eq!(model.interface(), ModelInterface::DirectTranscribe);

    let placed = model.place_on(ComputeDevice::Cpu);

    assert!(matches!(placed, Err(NativeError::Placement(_))));
}

#[test]
fn given_candle_probe_when_asked_then_always_answers() {
    assert!(CandleAccelerationProbe.cuda_available().is_some());
}
