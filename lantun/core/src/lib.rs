use std::error::Error;
use std::fmt;

pub use audio_ops::{Audio, AudioInfo, AudioSamples, WaveWriterError};

pub type LantunResult<T> = Result<T, LantunError>;
pub type LantunAudioResult = LantunResult<Audio>;

#[derive(Debug)]
pub enum LantunError {
    /// A resource file (config, vocabulary, checkpoint) is missing or unreadable.
    ResourceNotFound(String),
    /// The vocabulary file violates a structural invariant.
    MalformedVocabulary(String),
    /// The external romanization tool failed or produced nothing.
    RomanizerFailure(String),
    /// A character survived normalization but has no vocabulary id.
    UnknownSymbol(String),
    /// The checkpoint could not be loaded into an inference session.
    ModelLoadFailure(String),
    OperationError(String),
}

impl Error for LantunError {}

impl fmt::Display for LantunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err_message = match self {
            LantunError::ResourceNotFound(msg) => {
                format!("Failed to load resource. Error `{}`", msg)
            }
            LantunError::MalformedVocabulary(msg) => {
                format!("Malformed vocabulary. Error `{}`", msg)
            }
            LantunError::RomanizerFailure(msg) => {
                format!("Romanization failed. Error `{}`", msg)
            }
            LantunError::UnknownSymbol(msg) => msg.to_string(),
            LantunError::ModelLoadFailure(msg) => {
                format!("Failed to load model checkpoint. Error `{}`", msg)
            }
            LantunError::OperationError(msg) => msg.to_string(),
        };
        write!(f, "{}", err_message)
    }
}

impl From<WaveWriterError> for LantunError {
    fn from(error: WaveWriterError) -> Self {
        LantunError::OperationError(error.to_string())
    }
}

/// Inference noise and duration parameters, in the order the acoustic
/// network consumes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub noise_scale: f32,
    pub length_scale: f32,
    pub noise_w: f32,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            noise_scale: 0.667,
            length_scale: 1.0,
            noise_w: 0.8,
        }
    }
}

/// Script-to-Latin transliteration capability. The single production
/// implementation shells out to an external tool; tests substitute fakes.
pub trait Romanizer {
    fn romanize(&self, text: &str, language_hint: &str) -> LantunResult<String>;
}

/// The sequence-to-waveform network seam: a symbol-id sequence in, one
/// utterance of audio out.
pub trait AcousticModel {
    fn infer(&self, input_ids: &[i64], params: &SynthesisParams) -> LantunAudioResult;
    fn audio_output_info(&self) -> AudioInfo;
}
