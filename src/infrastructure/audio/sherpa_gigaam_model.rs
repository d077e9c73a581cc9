//! GigaAM CTC models served through sherpa-onnx's NeMo CTC recognizer.
//!
//! A model directory holds `model.onnx` and `tokens.txt`, the layout of the
//! sherpa-onnx GigaAM exports.

use std::ffi::{CStr, CString};
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::application::ports::{ModelInterface, ModelLoader, NativeError, NativeModel, Placement};
use crate::domain::ComputeDevice;

use super::audio_decoder::{TARGET_SAMPLE_RATE, decode_audio_file};

#[derive(Debug, Clone)]
pub struct GigaAmRecognizerConfig {
    pub num_threads: i32,
    pub feature_dim: i32,
}

impl Default for GigaAmRecognizerConfig {
    fn default() -> Self {
        Self {
            num_threads: 2,
            feature_dim: 64,
        }
    }
}

pub struct SherpaGigaAmLoader {
    models_dir: PathBuf,
    config: GigaAmRecognizerConfig,
}

impl SherpaGigaAmLoader {
    pub fn new(models_dir: impl Into<PathBuf>, config: GigaAmRecognizerConfig) -> Self {
        Self {
            models_dir: models_dir.into(),
            config,
        }
    }

    /// `model_id` is a directory name under `models_dir`, or a path.
    pub fn model_dir(&self, model_id: &str) -> PathBuf {
        let direct = Path::new(model_id);
        if direct.is_dir() {
            direct.to_path_buf()
        } else {
            self.models_dir.join(model_id)
        }
    }
}

impl ModelLoader for SherpaGigaAmLoader {
    fn load(&self, model_id: &str) -> Result<Box<dyn NativeModel>, NativeError> {
        let model = SherpaGigaAmModel::new(&self.model_dir(model_id), self.config.clone())?;
        Ok(Box::new(model))
    }
}

/// Keeps the C strings alive for as long as the recognizer uses them.
#[derive(Debug)]
struct RecognizerStrings {
    model: CString,
    tokens: CString,
    provider: CString,
    decoding_method: CString,
}

struct Recognizer {
    ptr: *const sherpa_rs_sys::SherpaOnnxOfflineRecognizer,
    #[allow(dead_code)]
    strings: RecognizerStrings,
}

impl Recognizer {
    fn create(
        files: &ModelFiles,
        config: &GigaAmRecognizerConfig,
        device: ComputeDevice,
    ) -> Result<Self, NativeError> {
        let ModelFiles {
            model: model_path,
            tokens: tokens_path,
        } = files;

        let c_string = |value: &str| {
            CString::new(value).map_err(|e| NativeError::Construction(e.to_string()))
        };
        let path_str = |path: &Path| {
            path.to_str()
                .map(String::from)
                .ok_or_else(|| NativeError::ModelNotFound("invalid model path".to_string()))
        };

        let strings = RecognizerStrings {
            model: c_string(&path_str(model_path)?)?,
            tokens: c_string(&path_str(tokens_path)?)?,
            provider: c_string(device.as_str())?,
            decoding_method: c_string("greedy_search")?,
        };

        let ptr = unsafe {
            let model_config = sherpa_rs_sys::SherpaOnnxOfflineModelConfig {
                debug: 0,
                num_threads: config.num_threads,
                provider: strings.provider.as_ptr(),
                nemo_ctc: sherpa_rs_sys::SherpaOnnxOfflineNemoEncDecCtcModelConfig {
                    model: strings.model.as_ptr(),
                },
                tokens: strings.tokens.as_ptr(),
                dolphin: mem::zeroed::<_>(),
                paraformer: mem::zeroed::<_>(),
                tdnn: mem::zeroed::<_>(),
                telespeech_ctc: mem::zeroed::<_>(),
                fire_red_asr: mem::zeroed::<_>(),
                transducer: mem::zeroed::<_>(),
                whisper: mem::zeroed::<_>(),
                sense_voice: mem::zeroed::<_>(),
                moonshine: mem::zeroed::<_>(),
                bpe_vocab: mem::zeroed::<_>(),
                model_type: mem::zeroed::<_>(),
                modeling_unit: mem::zeroed::<_>(),
                zipformer_ctc: mem::zeroed::<_>(),
                canary: mem::zeroed::<_>(),
            };

            let recognizer_config = sherpa_rs_sys::SherpaOnnxOfflineRecognizerConfig {
                decoding_method: strings.decoding_method.as_ptr(),
                model_config,
                feat_config: sherpa_rs_sys::SherpaOnnxFeatureConfig {
                    sample_rate: TARGET_SAMPLE_RATE as i32,
                    feature_dim: config.feature_dim,
                },
                hotwords_file: mem::zeroed::<_>(),
                hotwords_score: mem::zeroed::<_>(),
                lm_config: mem::zeroed::<_>(),
                max_active_paths: mem::zeroed::<_>(),
                rule_fars: mem::zeroed::<_>(),
                rule_fsts: mem::zeroed::<_>(),
                blank_penalty: mem::zeroed::<_>(),
                hr: mem::zeroed::<_>(),
            };

            sherpa_rs_sys::SherpaOnnxCreateOfflineRecognizer(&recognizer_config)
        };

        if ptr.is_null() {
            return Err(NativeError::Construction(format!(
                "SherpaOnnxCreateOfflineRecognizer failed for {} on {}",
                model_path.display(),
                device
            )));
        }

        Ok(Self { ptr, strings })
    }

    fn decode(&self, samples: &[f32]) -> Result<String, NativeError> {
        let text = unsafe {
            let stream = sherpa_rs_sys::SherpaOnnxCreateOfflineStream(self.ptr);
            if stream.is_null() {
                return Err(NativeError::Inference(
                    "failed to create offline stream".to_string(),
                ));
            }

            sherpa_rs_sys::SherpaOnnxAcceptWaveformOffline(
                stream,
                TARGET_SAMPLE_RATE as i32,
                samples.as_ptr(),
                samples.len() as i32,
            );
            sherpa_rs_sys::SherpaOnnxDecodeOfflineStream(self.ptr, stream);

            let result_ptr = sherpa_rs_sys::SherpaOnnxGetOfflineStreamResult(stream);
            let text = if result_ptr.is_null() || (*result_ptr).text.is_null() {
                String::new()
            } else {
                CStr::from_ptr((*result_ptr).text)
                    .to_string_lossy()
                    .to_string()
            };

            if !result_ptr.is_null() {
                sherpa_rs_sys::SherpaOnnxDestroyOfflineRecognizerResult(result_ptr);
            }
            sherpa_rs_sys::SherpaOnnxDestroyOfflineStream(stream);

            text
        };

        Ok(text)
    }
}

impl Drop for Recognizer {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                sherpa_rs_sys::SherpaOnnxDestroyOfflineRecognizer(self.ptr);
            }
            tracing::debug!("Destroyed GigaAM recognizer");
        }
    }
}

/// The two files of a sherpa-onnx GigaAM export.
#[derive(Debug, Clone)]
struct ModelFiles {
    model: PathBuf,
    tokens: PathBuf,
}

impl ModelFiles {
    fn locate(model_dir: &Path) -> Result<Self, NativeError> {
        let files = Self {
            model: model_dir.join("model.onnx"),
            tokens: model_dir.join("tokens.txt"),
        };
        for path in [&files.model, &files.tokens] {
            if !path.exists() {
                return Err(NativeError::ModelNotFound(format!("expected {}", path.display())));
            }
        }
        Ok(files)
    }
}

/// sherpa-onnx binds the execution provider when the recognizer is created,
/// so the recognizer only exists once `place_on` has picked a device.
pub struct SherpaGigaAmModel {
    files: ModelFiles,
    config: GigaAmRecognizerConfig,
    recognizer: Option<(ComputeDevice, Mutex<Recognizer>)>,
}

impl SherpaGigaAmModel {
    fn new(model_dir: &Path, config: GigaAmRecognizerConfig) -> Result<Self, NativeError> {
        Ok(Self {
            files: ModelFiles::locate(model_dir)?,
            config,
            recognizer: None,
        })
    }
}

// SAFETY: the recognizer pointer is only dereferenced while holding the mutex.
unsafe impl Send for SherpaGigaAmModel {}
unsafe impl Sync for SherpaGigaAmModel {}

impl NativeModel for SherpaGigaAmModel {
    fn interface(&self) -> ModelInterface {
        ModelInterface::Callable
    }

    fn place_on(&mut self, device: ComputeDevice) -> Result<Placement, NativeError> {
        if self
            .recognizer
            .as_ref()
            .is_some_and(|(placed, _)| *placed == device)
        {
            return Ok(Placement::Placed);
        }

        tracing::info!(model = %self.files.model.display(), provider = %device, "Initializing GigaAM recognizer");
        let recognizer = Recognizer::create(&self.files, &self.config, device)
            .map_err(|e| NativeError::Placement(e.to_string()))?;
        self.recognizer = Some((device, Mutex::new(recognizer)));
        Ok(Placement::Placed)
    }

    fn invoke(&self, audio_path: &Path, _options: &Map<String, Value>) -> Result<Value, NativeError> {
        let (_, recognizer) = self.recognizer.as_ref().ok_or_else(|| {
            NativeError::Inference("GigaAM recognizer is not placed on a device".to_string())
        })?;
        let samples = decode_audio_file(audio_path)?;

        let recognizer = recognizer
            .lock()
            .map_err(|_| NativeError::Inference("recognizer lock poisoned".to_string()))?;

        let text = recognizer.decode(&samples)?;

        tracing::info!(
            samples = samples.len(),
            chars = text.len(),
            "GigaAM transcription completed"
        );

        Ok(Value::String(text))
    }
}
