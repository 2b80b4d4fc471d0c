mod config;
mod encoder;
mod text;
mod vocab;

pub use config::{DataConfig, InferenceConfig, TrainConfig, VoiceConfig};
pub use encoder::{
    ids_to_symbols, intersperse_blank, symbols_to_ids, to_input_tensors, BLANK_ID,
};
pub use text::{filter_oov, remap_clause_breaks, substitute_chars, TextNormalizer};
pub use vocab::VocabularyTable;

use lantun_core::{
    AcousticModel, Audio, AudioInfo, LantunAudioResult, LantunError, LantunResult, Romanizer,
    SynthesisParams,
};
use ndarray::Array1;
use ort::{Session, SessionInputValue, SessionInputs, Value};
use std::path::Path;
use uroman_romanizer::UromanTool;

static INIT_RUNTIME: std::sync::Once = std::sync::Once::new();

/// Registers execution providers once per process: the parallel accelerator
/// when compiled in, plain CPU otherwise.
pub fn init_runtime() {
    INIT_RUNTIME.call_once(|| {
        let execution_providers = [
            #[cfg(feature = "cuda")]
            ort::CUDAExecutionProvider::default().build(),
            ort::CPUExecutionProvider::default().build(),
        ];
        ort::init()
            .with_name("lantun")
            .with_execution_providers(execution_providers)
            .commit()
            .expect("Failed to initialize onnxruntime");
    });
}

pub fn inference_device() -> &'static str {
    if cfg!(feature = "cuda") {
        "cuda"
    } else {
        "cpu"
    }
}

fn create_inference_session(model_path: &Path) -> Result<Session, ort::Error> {
    Session::builder()?
        .with_memory_pattern(false)?
        .commit_from_file(model_path)
}

/// A single-voice VITS network held as an onnxruntime session.
pub struct VitsModel {
    session: Session,
    sample_rate: u32,
}

impl VitsModel {
    /// Builds the inference session for a checkpoint. The presence check runs
    /// first so a missing file surfaces as a resource error, not a session
    /// construction failure.
    pub fn load(
        config: &VoiceConfig,
        num_symbols: usize,
        checkpoint_path: &Path,
    ) -> LantunResult<Self> {
        if !checkpoint_path.is_file() {
            return Err(LantunError::ResourceNotFound(format!(
                "Checkpoint file does not exist: `{}`",
                checkpoint_path.display()
            )));
        }
        init_runtime();
        log::debug!(
            "loading checkpoint `{}`: {} symbols, {} spectral channels, {} segment frames",
            checkpoint_path.display(),
            num_symbols,
            config.spectral_channels(),
            config.segment_frames()
        );
        let session = match create_inference_session(checkpoint_path) {
            Ok(session) => session,
            Err(err) => {
                return Err(LantunError::ModelLoadFailure(format!(
                    "Failed to initialize onnxruntime inference session for `{}`: `{}`",
                    checkpoint_path.display(),
                    err
                )))
            }
        };
        Ok(Self {
            session,
            sample_rate: config.data.sampling_rate,
        })
    }
}

impl AcousticModel for VitsModel {
    fn infer(&self, input_ids: &[i64], params: &SynthesisParams) -> LantunAudioResult {
        let (sequence, length) = encoder::to_input_tensors(input_ids);
        let scales = Array1::<f32>::from_iter([
            params.noise_scale,
            params.length_scale,
            params.noise_w,
        ]);

        let timer = std::time::Instant::now();
        let outputs = {
            let inputs = vec![
                SessionInputValue::from(Value::from_array(sequence).unwrap()),
                SessionInputValue::from(Value::from_array(length).unwrap()),
                SessionInputValue::from(Value::from_array(scales).unwrap()),
            ];
            match self.session.run(SessionInputs::from(inputs.as_slice())) {
                Ok(out) => out,
                Err(e) => {
                    return Err(LantunError::OperationError(format!(
                        "Failed to run model inference. Error: {}",
                        e
                    )))
                }
            }
        };
        let inference_ms = timer.elapsed().as_millis() as f32;

        let waveform = match outputs[0].try_extract_tensor::<f32>() {
            Ok(out) => out,
            Err(e) => {
                return Err(LantunError::OperationError(format!(
                    "Failed to run model inference. Error: {}",
                    e
                )))
            }
        };
        let samples = Vec::from(waveform.view().as_slice().unwrap());

        Ok(Audio::new(
            samples.into(),
            self.sample_rate as usize,
            Some(inference_ms),
        ))
    }

    fn audio_output_info(&self) -> AudioInfo {
        AudioInfo {
            sample_rate: self.sample_rate as usize,
            num_channels: 1usize,
            sample_width: 2usize,
        }
    }
}

/// Bridges the subprocess-backed uroman tool into the romanizer seam.
pub struct UromanRomanizer(UromanTool);

impl UromanRomanizer {
    pub fn new(script_path: impl Into<std::path::PathBuf>) -> Self {
        Self(UromanTool::new(script_path))
    }
}

impl Romanizer for UromanRomanizer {
    fn romanize(&self, text: &str, language_hint: &str) -> LantunResult<String> {
        self.0
            .romanize(text, language_hint)
            .map_err(|e| LantunError::RomanizerFailure(e.to_string()))
    }
}
