use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use offline_asr::application::ports::{EngineError, ModelInterface, NativeError, Placement};
use offline_asr::application::services::ModelSlot;
use offline_asr::domain::{ComputeDevice, EngineName, LoadKey, TranscriptionOptions};

use crate::support::{CountingLoader, FakeOutput};

fn slot(loader: &Arc<CountingLoader>) -> ModelSlot {
    ModelSlot::new(EngineName::Whisper, loader.clone())
}

fn run(slot: &ModelSlot) -> Result<serde_json::Value, EngineError> {
    slot.snapshot()?.run(
        EngineName::Whisper,
        Path::new("audio.wav"),
        &TranscriptionOptions::default(),
    )
}

#[test]
fn given_same_key_when_loading_twice_then_model_is_constructed_once() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe));
    let slot = slot(&loader);

    slot.load("base", ComputeDevice::Cpu).unwrap();
    slot.load("base", ComputeDevice::Cpu).unwrap();

    assert_eq!(loader.load_count(), 1);
    assert_eq!(slot.loaded_key(), Some(LoadKey::new("base", ComputeDevice::Cpu)));
}

#[test]
fn given_concurrent_loads_of_one_key_when_racing_then_model_is_constructed_once() {
    let loader = Arc::new(
        CountingLoader::new(ModelInterface::DirectTranscribe)
            .with_load_delay(Duration::from_millis(50)),
    );
    let slot = Arc::new(slot(&loader));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let slot = slot.clone();
            std::thread::spawn(move || slot.load("base", ComputeDevice::Cpu))
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(loader.load_count(), 1);
}

#[test]
fn given_new_key_when_loading_then_transcription_reflects_latest_model() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe));
    let slot = slot(&loader);

    slot.load("tiny", ComputeDevice::Cpu).unwrap();
    slot.load("small", ComputeDevice::Cuda).unwrap();

    let output = run(&slot).unwrap();

    assert_eq!(output, " small on cuda ");
    assert_eq!(loader.load_count(), 2);
}

#[test]
fn given_device_change_when_loading_then_model_is_rebuilt() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::Callable));
    let slot = slot(&loader);

    slot.load("base", ComputeDevice::Cpu).unwrap();
    slot.load("base", ComputeDevice::Cuda).unwrap();

    assert_eq!(loader.load_count(), 2);
    assert_eq!(slot.loaded_key().unwrap().device, ComputeDevice::Cuda);
}

#[test]
fn given_nothing_loaded_when_transcribing_then_returns_not_loaded() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe));
    let slot = slot(&loader);

    let result = run(&slot);

    assert!(matches!(
        result,
        Err(EngineError::NotLoaded {
            engine: EngineName::Whisper
        })
    ));
}

#[test]
fn given_unsupported_interface_when_transcribing_then_returns_unsupported_interface() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::Unsupported));
    let slot = slot(&loader);
    slot.load("base", ComputeDevice::Cpu).unwrap();

    let err = run(&slot).unwrap_err();

    assert_eq!(err.kind(), "UnsupportedInterfaceError");
}

#[test]
fn given_missing_model_when_loading_then_load_error_names_model_and_device() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe).missing("huge"));
    let slot = slot(&loader);

    let err = slot.load("huge", ComputeDevice::Cuda).unwrap_err();

    match &err {
        EngineError::Load {
            model_id,
            device,
            source: NativeError::ModelNotFound(_),
        } => {
            assert_eq!(model_id, "huge");
            assert_eq!(*device, ComputeDevice::Cuda);
        }
        other => panic!("expected LoadError, got {other:?}"),
    }
    assert_eq!(err.kind(), "LoadError");
}

#[test]
fn given_failed_reload_when_transcribing_then_previous_model_still_serves() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe).missing("broken"));
    let slot = slot(&loader);
    slot.load("base", ComputeDevice::Cpu).unwrap();

    assert!(slot.load("broken", ComputeDevice::Cpu).is_err());

    assert_eq!(slot.loaded_key(), Some(LoadKey::new("base", ComputeDevice::Cpu)));
    assert_eq!(run(&slot).unwrap(), " base on cpu ");
}

#[test]
fn given_placement_failure_when_loading_then_returns_load_error() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe).with_placement(None));
    let slot = slot(&loader);

    let err = slot.load("base", ComputeDevice::Cuda).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Load {
            source: NativeError::Placement(_),
            ..
        }
    ));
    assert!(slot.loaded_key().is_none());
}

#[test]
fn given_handle_without_placement_when_loading_then_placement_is_recorded_as_skipped() {
    let loader = Arc::new(
        CountingLoader::new(ModelInterface::Callable).with_placement(Some(Placement::Skipped)),
    );
    let slot = slot(&loader);

    slot.load("base", ComputeDevice::Cuda).unwrap();

    assert_eq!(slot.snapshot().unwrap().placement, Placement::Skipped);
}

#[test]
fn given_snapshot_taken_when_model_is_replaced_then_snapshot_keeps_old_model() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe));
    let slot = slot(&loader);
    slot.load("tiny", ComputeDevice::Cpu).unwrap();

    let snapshot = slot.snapshot().unwrap();
    slot.load("small", ComputeDevice::Cpu).unwrap();

    let output = snapshot
        .run(
            EngineName::Whisper,
            Path::new("audio.wav"),
            &TranscriptionOptions::default(),
        )
        .unwrap();
    assert_eq!(output, " tiny on cpu ");
    assert_eq!(snapshot.key, LoadKey::new("tiny", ComputeDevice::Cpu));
}

#[test]
fn given_native_failure_when_transcribing_then_returns_transcription_error() {
    let loader = Arc::new(
        CountingLoader::new(ModelInterface::DirectTranscribe)
            .returning(FakeOutput::Fail("decoder exploded".to_string())),
    );
    let slot = slot(&loader);
    slot.load("base", ComputeDevice::Cpu).unwrap();

    let err = run(&slot).unwrap_err();

    assert_eq!(err.kind(), "TranscriptionError");
    assert!(err.to_string().contains("decoder exploded"));
}

#[test]
fn given_record_returned_by_load_when_another_key_replaces_it_then_record_keeps_its_weights() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe));
    let slot = slot(&loader);

    let tiny = slot.load("tiny", ComputeDevice::Cpu).unwrap();
    let small = slot.load("small", ComputeDevice::Cpu).unwrap();

    let output = tiny
        .run(
            EngineName::Whisper,
            Path::new("audio.wav"),
            &TranscriptionOptions::default(),
        )
        .unwrap();
    assert_eq!(output, " tiny on cpu ");
    assert_eq!(tiny.key, LoadKey::new("tiny", ComputeDevice::Cpu));
    assert_eq!(small.key, LoadKey::new("small", ComputeDevice::Cpu));
}

#[test]
fn given_resident_key_when_loading_again_then_the_same_record_is_returned() {
    let loader = Arc::new(CountingLoader::new(ModelInterface::DirectTranscribe));
    let slot = slot(&loader);

    let first = slot.load("base", ComputeDevice::Cpu).unwrap();
    let second = slot.load("base", ComputeDevice::Cpu).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}
