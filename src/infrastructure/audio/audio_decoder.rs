use std::fs::File;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::NativeError;

/// Both backends consume 16 kHz mono.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

const RESAMPLE_CHUNK: usize = 1024;

fn decoding(stage: &str) -> impl Fn(SymphoniaError) -> NativeError + '_ {
    move |e| NativeError::Decoding(format!("{}: {}", stage, e))
}

/// Decodes any container symphonia understands into 16 kHz mono PCM.
pub fn decode_audio_file(path: &Path) -> Result<Vec<f32>, NativeError> {
    let (mut format, track_id, params) = open_track(path)?;

    let source_rate = params
        .sample_rate
        .ok_or_else(|| NativeError::Decoding("unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(decoding("codec"))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(decoding("packet")(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => return Err(decoding("decode")(e)),
        };
        if decoded.frames() == 0 {
            continue;
        }

        let spec = *decoded.spec();
        let frame_channels = spec.channels.count().max(1);
        let needed = decoded.capacity() as u64;
        if buffer
            .as_ref()
            .is_none_or(|b| (b.capacity() as u64) < needed * frame_channels as u64)
        {
            buffer = Some(SampleBuffer::new(needed, spec));
        }
        let Some(buf) = buffer.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        mono.extend(
            buf.samples()
                .chunks_exact(frame_channels)
                .map(|frame| frame.iter().sum::<f32>() / frame_channels as f32),
        );
    }

    if mono.is_empty() {
        return Err(NativeError::Decoding("no audio samples decoded".to_string()));
    }

    let pcm = if source_rate == TARGET_SAMPLE_RATE {
        mono
    } else {
        resample(&mono, source_rate)?
    };

    tracing::debug!(
        path = %path.display(),
        source_rate,
        samples = pcm.len(),
        duration_secs = pcm.len() as f32 / TARGET_SAMPLE_RATE as f32,
        "Audio decoded"
    );

    Ok(pcm)
}

fn open_track(path: &Path) -> Result<(Box<dyn FormatReader>, u32, CodecParameters), NativeError> {
    let source = MediaSourceStream::new(Box::new(File::open(path)?), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decoding("probe"))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| NativeError::Decoding("no audio track found".to_string()))?;
    let (track_id, params) = (track.id, track.codec_params.clone());

    Ok((probed.format, track_id, params))
}

/// Sinc resampling to [`TARGET_SAMPLE_RATE`], with the filter delay trimmed
/// so output sample 0 lines up with input sample 0.
fn resample(samples: &[f32], from_rate: u32) -> Result<Vec<f32>, NativeError> {
    let ratio = TARGET_SAMPLE_RATE as f64 / from_rate as f64;
    let expected = (samples.len() as f64 * ratio) as usize;
    let failed = |e: &dyn std::fmt::Display| NativeError::Decoding(format!("resample: {}", e));

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLE_CHUNK, 1).map_err(|e| failed(&e))?;

    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay + RESAMPLE_CHUNK);
    let mut remaining = samples;

    while remaining.len() >= resampler.input_frames_next() {
        let (chunk, rest) = remaining.split_at(resampler.input_frames_next());
        let frames = resampler.process(&[chunk], None).map_err(|e| failed(&e))?;
        output.extend_from_slice(&frames[0]);
        remaining = rest;
    }

    if !remaining.is_empty() {
        let tail: [&[f32]; 1] = [remaining];
        let frames = resampler
            .process_partial(Some(&tail[..]), None)
            .map_err(|e| failed(&e))?;
        output.extend_from_slice(&frames[0]);
    }

    while output.len() < expected + delay {
        let frames = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| failed(&e))?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    Ok(output.into_iter().skip(delay).take(expected).collect())
}
