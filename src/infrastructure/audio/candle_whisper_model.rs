use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_nn::ops::{log_softmax, softmax};
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use serde_json::{Map, Value, json};
use tokenizers::Tokenizer;

use crate::application::ports::{ModelInterface, ModelLoader, NativeError, NativeModel, Placement};
use crate::domain::ComputeDevice;

use super::audio_decoder::{TARGET_SAMPLE_RATE, decode_audio_file};
use super::mel_filters::mel_filters;

const NO_SPEECH_THRESHOLD: f64 = 0.6;
const LOGPROB_THRESHOLD: f64 = -1.0;
const MULTILINGUAL_VOCAB_SIZE: usize = 51865;

const LANGUAGES: [(&str, &str); 100] = [
    ("en", "english"), ("zh", "chinese"), ("de", "german"), ("es", "spanish"),
    ("ru", "russian"), ("ko", "korean"), ("fr", "french"), ("ja", "japanese"),
    ("pt", "portuguese"), ("tr", "turkish"), ("pl", "polish"), ("ca", "catalan"),
    ("nl", "dutch"), ("ar", "arabic"), ("sv", "swedish"), ("it", "italian"),
    ("id", "indonesian"), ("hi", "hindi"), ("fi", "finnish"), ("vi", "vietnamese"),
    ("he", "hebrew"), ("uk", "ukrainian"), ("el", "greek"), ("ms", "malay"),
    ("cs", "czech"), ("ro", "romanian"), ("da", "danish"), ("hu", "hungarian"),
    ("ta", "tamil"), ("no", "norwegian"), ("th", "thai"), ("ur", "urdu"),
    ("hr", "croatian"), ("bg", "bulgarian"), ("lt", "lithuanian"), ("la", "latin"),
    ("mi", "maori"), ("ml", "malayalam"), ("cy", "welsh"), ("sk", "slovak"),
    ("te", "telugu"), ("fa", "persian"), ("lv", "latvian"), ("bn", "bengali"),
    ("sr", "serbian"), ("az", "azerbaijani"), ("sl", "slovenian"), ("kn", "kannada"),
    ("et", "estonian"), ("mk", "macedonian"), ("br", "breton"), ("eu", "basque"),
    ("is", "icelandic"), ("hy", "armenian"), ("ne", "nepali"), ("mn", "mongolian"),
    ("bs", "bosnian"), ("kk", "kazakh"), ("sq", "albanian"), ("sw", "swahili"),
    ("gl", "galician"), ("mr", "marathi"), ("pa", "punjabi"), ("si", "sinhala"),
    ("km", "khmer"), ("sn", "shona"), ("yo", "yoruba"), ("so", "somali"),
    ("af", "afrikaans"), ("oc", "occitan"), ("ka", "georgian"), ("be", "belarusian"),
    ("tg", "tajik"), ("sd", "sindhi"), ("gu", "gujarati"), ("am", "amharic"),
    ("yi", "yiddish"), ("lo", "lao"), ("uz", "uzbek"), ("fo", "faroese"),
    ("ht", "haitian creole"), ("ps", "pashto"), ("tk", "turkmen"), ("nn", "nynorsk"),
    ("mt", "maltese"), ("sa", "sanskrit"), ("lb", "luxembourgish"), ("my", "myanmar"),
    ("bo", "tibetan"), ("tl", "tagalog"), ("mg", "malagasy"), ("as", "assamese"),
    ("tt", "tatar"), ("haw", "hawaiian"), ("ln", "lingala"), ("ha", "hausa"),
    ("ba", "bashkir"), ("jw", "javanese"), ("su", "sundanese"), ("yue", "cantonese"),
];

/// Accepts a code or an English name in any case: `"RU"`, `" ru "` and
/// `"Russian"` all give `"ru"`.
fn language_code(language: &str) -> Option<&'static str> {
    let wanted = language.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|(code, name)| *code == wanted || *name == wanted)
        .map(|(code, _)| *code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Transcribe,
    Translate,
}

impl Task {
    fn parse(options: &Map<String, Value>) -> Result<Self, NativeError> {
        match options.get("task").and_then(Value::as_str) {
            None | Some("transcribe") => Ok(Task::Transcribe),
            Some("translate") => Ok(Task::Translate),
            Some(other) => Err(NativeError::Inference(format!("unsupported task: {}", other))),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Task::Transcribe => "transcribe",
            Task::Translate => "translate",
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Task::Transcribe => m::TRANSCRIBE_TOKEN,
            Task::Translate => m::TRANSLATE_TOKEN,
        }
    }
}

/// Everything needed to (re)build the network on any device.
struct WhisperFiles {
    config: Config,
    tokenizer: Tokenizer,
    weights: PathBuf,
}

/// Resolves whisper model ids against the Hugging Face hub or a local
/// directory. Bare sizes (`base`, `large-v3`, `tiny.en`) map to `openai/whisper-*`.
pub struct CandleWhisperLoader;

impl CandleWhisperLoader {
    pub fn repo_id(model_id: &str) -> String {
        if model_id.contains('/') {
            model_id.to_string()
        } else {
            format!("openai/whisper-{}", model_id)
        }
    }

    fn fetch_files(model_id: &str) -> Result<(PathBuf, PathBuf, PathBuf), NativeError> {
        let local = Path::new(model_id);
        if local.is_dir() {
            let files = (
                local.join("config.json"),
                local.join("tokenizer.json"),
                local.join("model.safetensors"),
            );
            for path in [&files.0, &files.1, &files.2] {
                if !path.exists() {
                    return Err(NativeError::ModelNotFound(format!(
                        "expected {}",
                        path.display()
                    )));
                }
            }
            return Ok(files);
        }

        let api = Api::new().map_err(|e| NativeError::Construction(e.to_string()))?;
        let repo = api.repo(Repo::new(Self::repo_id(model_id), RepoType::Model));
        let fetch = |name: &str| {
            repo.get(name)
                .map_err(|e| NativeError::ModelNotFound(format!("{}: {}", name, e)))
        };

        Ok((
            fetch("config.json")?,
            fetch("tokenizer.json")?,
            fetch("model.safetensors")?,
        ))
    }
}

impl ModelLoader for CandleWhisperLoader {
    /// Resolves and parses the model files. The network itself is built
    /// once, on the target device, by [`NativeModel::place_on`].
    fn load(&self, model_id: &str) -> Result<Box<dyn NativeModel>, NativeError> {
        let (config_path, tokenizer_path, weights) = Self::fetch_files(model_id)?;

        let config_contents = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| NativeError::Construction(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| NativeError::Construction(format!("tokenizer: {}", e)))?;

        let files = WhisperFiles {
            config,
            tokenizer,
            weights,
        };

        Ok(Box::new(CandleWhisperModel::new(model_id, files)))
    }
}

/// The network built on one device.
struct Network {
    device: Device,
    model: Mutex<m::model::Whisper>,
}

pub struct CandleWhisperModel {
    model_id: String,
    files: WhisperFiles,
    mel_filters: Vec<f32>,
    network: Option<Network>,
}

impl CandleWhisperModel {
    fn new(model_id: &str, files: WhisperFiles) -> Self {
        let mel_filters = mel_filters(
            TARGET_SAMPLE_RATE,
            m::N_FFT,
            files.config.num_mel_bins,
        );

        tracing::info!(
            model = model_id,
            mel_bins = files.config.num_mel_bins,
            multilingual = files.config.vocab_size >= MULTILINGUAL_VOCAB_SIZE,
            "Candle Whisper model files resolved"
        );

        Self {
            model_id: model_id.to_string(),
            files,
            mel_filters,
            network: None,
        }
    }

    pub fn select_dtype(device: &Device) -> DType {
        if device.is_cpu() {
            DType::F32
        } else {
            DType::F16
        }
    }

    fn is_multilingual(&self) -> bool {
        self.files.config.vocab_size >= MULTILINGUAL_VOCAB_SIZE
    }

    fn token_id(&self, token: &str) -> Result<u32, NativeError> {
        self.files
            .tokenizer
            .token_to_id(token)
            .ok_or_else(|| NativeError::Inference(format!("token not found: {}", token)))
    }

    fn mel_window(&self, samples: &[f32], device: &Device) -> Result<Tensor, NativeError> {
        let mut padded = samples.to_vec();
        padded.resize(m::N_SAMPLES, 0.0);

        let mel_data = m::audio::pcm_to_mel(&self.files.config, &padded, &self.mel_filters);
        let n_mel = self.files.config.num_mel_bins;
        let n_frames = mel_data.len() / n_mel;

        Tensor::from_vec(mel_data, (1, n_mel, n_frames), device)
            .and_then(|t| t.to_dtype(Self::select_dtype(device)))
            .map_err(|e| NativeError::Inference(format!("mel tensor: {}", e)))
    }

    fn detect_language(
        &self,
        model: &mut m::model::Whisper,
        audio_features: &Tensor,
        device: &Device,
    ) -> Result<&'static str, NativeError> {
        let candidates: Vec<(&'static str, u32)> = LANGUAGES
            .iter()
            .filter_map(|(code, _)| {
                self.files
                    .tokenizer
                    .token_to_id(&format!("<|{}|>", code))
                    .map(|id| (*code, id))
            })
            .collect();

        let sot = self.token_id(m::SOT_TOKEN)?;
        let ids: Vec<u32> = candidates.iter().map(|(_, id)| *id).collect();

        let best = (|| {
            let tokens = Tensor::new(&[[sot]], device)?;
            let ys = model.decoder.forward(&tokens, audio_features, true)?;
            let logits = model.decoder.final_linear(&ys.squeeze(0)?)?.get(0)?;
            let ids = Tensor::new(ids.as_slice(), device)?;
            logits.index_select(&ids, 0)?.argmax(0)?.to_scalar::<u32>()
        })()
        .map_err(|e| NativeError::Inference(format!("language detection: {}", e)))?;

        model.reset_kv_cache();

        candidates
            .get(best as usize)
            .map(|(code, _)| *code)
            .ok_or_else(|| NativeError::Inference("language detection failed".to_string()))
    }

    fn decode_window(
        &self,
        model: &mut m::model::Whisper,
        audio_features: &Tensor,
        prefix: &[u32],
        device: &Device,
    ) -> Result<WindowOutput, NativeError> {
        let eot = self.token_id(m::EOT_TOKEN)?;
        let no_speech = m::NO_SPEECH_TOKENS
            .iter()
            .find_map(|t| self.files.tokenizer.token_to_id(t));
        let max_tokens = self.files.config.max_target_positions / 2;

        let output = (|| {
            let mut tokens = prefix.to_vec();
            let mut sum_logprob = 0f64;
            let mut no_speech_prob = f64::NAN;

            for i in 0..max_tokens {
                let token_tensor = Tensor::new(tokens.as_slice(), device)?.unsqueeze(0)?;
                let ys = model.decoder.forward(&token_tensor, audio_features, i == 0)?;
                let logits = model
                    .decoder
                    .final_linear(&ys.squeeze(0)?)?
                    .to_dtype(DType::F32)?;

                if i == 0 {
                    if let Some(id) = no_speech {
                        no_speech_prob = softmax(&logits.get(0)?, 0)?
                            .get(id as usize)?
                            .to_scalar::<f32>()? as f64;
                    }
                }

                let last = logits.get(logits.dim(0)? - 1)?;
                let next_token = last.argmax(0)?.to_scalar::<u32>()?;
                sum_logprob += log_softmax(&last, 0)?
                    .get(next_token as usize)?
                    .to_scalar::<f32>()? as f64;

                if next_token == eot {
                    break;
                }
                tokens.push(next_token);
            }

            let generated = &tokens[prefix.len()..];
            Ok::<_, candle_core::Error>((generated.to_vec(), sum_logprob, no_speech_prob))
        })()
        .map_err(|e| NativeError::Inference(format!("decoder: {}", e)))?;

        model.reset_kv_cache();

        let (generated, sum_logprob, no_speech_prob) = output;
        let text = self
            .files
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| NativeError::Inference(format!("detokenize: {}", e)))?;

        Ok(WindowOutput {
            text,
            avg_logprob: sum_logprob / (generated.len() + 1) as f64,
            no_speech_prob,
        })
    }
}

struct WindowOutput {
    text: String,
    avg_logprob: f64,
    no_speech_prob: f64,
}

fn build_network(files: &WhisperFiles, device: &Device) -> candle_core::Result<m::model::Whisper> {
    let dtype = CandleWhisperModel::select_dtype(device);
    // SAFETY: safetensors files are memory-mapped read-only
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], dtype, device)? };
    m::model::Whisper::load(&vb, files.config.clone())
}

fn encode(model: &mut m::model::Whisper, mel: &Tensor) -> Result<Tensor, NativeError> {
    model
        .encoder
        .forward(mel, true)
        .map_err(|e| NativeError::Inference(format!("encoder: {}", e)))
}

impl NativeModel for CandleWhisperModel {
    fn interface(&self) -> ModelInterface {
        ModelInterface::DirectTranscribe
    }

    fn place_on(&mut self, device: ComputeDevice) -> Result<Placement, NativeError> {
        let target = match device {
            ComputeDevice::Cpu => Device::Cpu,
            ComputeDevice::Cuda => {
                Device::new_cuda(0).map_err(|e| NativeError::Placement(e.to_string()))?
            }
        };

        if self
            .network
            .as_ref()
            .is_some_and(|n| n.device.same_device(&target))
        {
            return Ok(Placement::Placed);
        }

        let started = Instant::now();
        let model = build_network(&self.files, &target)
            .map_err(|e| NativeError::Placement(format!("{}: {}", self.model_id, e)))?;

        tracing::info!(
            model = %self.model_id,
            device = %device,
            dtype = ?Self::select_dtype(&target),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Candle Whisper network built"
        );

        self.network = Some(Network {
            device: target,
            model: Mutex::new(model),
        });
        Ok(Placement::Placed)
    }

    fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<Value, NativeError> {
        let network = self.network.as_ref().ok_or_else(|| {
            NativeError::Inference(format!("{} is not placed on a device", self.model_id))
        })?;
        let device = &network.device;

        let task = Task::parse(options)?;

        let pcm = decode_audio_file(audio_path)?;
        let total_seconds = pcm.len() as f64 / TARGET_SAMPLE_RATE as f64;
        let window_seconds = m::N_SAMPLES as f64 / TARGET_SAMPLE_RATE as f64;

        let mut model = network
            .model
            .lock()
            .map_err(|_| NativeError::Inference("model lock poisoned".to_string()))?;

        let windows: Vec<&[f32]> = pcm.chunks(m::N_SAMPLES).collect();
        let first = windows
            .first()
            .ok_or_else(|| NativeError::Decoding("empty audio".to_string()))?;
        let first_features = encode(&mut model, &self.mel_window(first, device)?)?;

        let language = match language {
            _ if !self.is_multilingual() => "en",
            Some(requested) => language_code(requested).ok_or_else(|| {
                NativeError::Inference(format!("unsupported language: {}", requested))
            })?,
            None => self.detect_language(&mut model, &first_features, device)?,
        };
        let mut first_features = Some(first_features);

        let mut prefix = vec![self.token_id(m::SOT_TOKEN)?];
        if self.is_multilingual() {
            prefix.push(self.token_id(&format!("<|{}|>", language))?);
            prefix.push(self.token_id(task.token())?);
        }
        prefix.push(self.token_id(m::NO_TIMESTAMPS_TOKEN)?);

        let mut segments = Vec::with_capacity(windows.len());
        let mut text = String::new();

        for (i, window) in windows.iter().enumerate() {
            let features = match first_features.take() {
                Some(features) => features,
                None => encode(&mut model, &self.mel_window(window, device)?)?,
            };

            tracing::debug!(window = i, "Transcribing audio window");
            let out = self.decode_window(&mut model, &features, &prefix, device)?;

            if out.no_speech_prob > NO_SPEECH_THRESHOLD && out.avg_logprob < LOGPROB_THRESHOLD {
                tracing::debug!(window = i, no_speech_prob = out.no_speech_prob, "Skipping silent window");
                continue;
            }

            let start = i as f64 * window_seconds;
            segments.push(json!({
                "id": segments.len(),
                "start": start,
                "end": (start + window_seconds).min(total_seconds),
                "text": out.text,
                "avg_logprob": out.avg_logprob,
                "no_speech_prob": out.no_speech_prob,
            }));
            text.push_str(&out.text);
        }

        tracing::info!(
            windows = windows.len(),
            segments = segments.len(),
            chars = text.len(),
            "Whisper transcription completed"
        );

        Ok(json!({
            "text": text,
            "language": language,
            "segments": segments,
            "task": task.as_str(),
        }))
    }
}
