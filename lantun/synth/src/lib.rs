pub use lantun_core::*;

use lantun_vits::{
    intersperse_blank, remap_clause_breaks, symbols_to_ids, TextNormalizer, VitsModel, VoiceConfig,
    VocabularyTable, BLANK_ID,
};
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "config.json";
pub const VOCAB_FILENAME: &str = "vocab.txt";
pub const CHECKPOINT_FILENAME: &str = "model.onnx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    ConfigLoaded,
    ModelLoaded,
    Ready,
    Synthesizing,
    Done,
    Failed,
}

/// One voice, one linear lifecycle:
/// `Uninitialized → ConfigLoaded → ModelLoaded → Ready → Synthesizing → Done`,
/// with `Failed` reachable from every step. Once ready the pipeline serves
/// any number of independent requests; a failure parks it in `Failed` and it
/// is not restarted.
pub struct SynthesisPipeline {
    voice_dir: PathBuf,
    language: Option<String>,
    romanizer: Option<Box<dyn Romanizer + Send + Sync>>,
    state: PipelineState,
    config: Option<VoiceConfig>,
    vocab: Option<VocabularyTable>,
    normalizer: Option<TextNormalizer>,
    model: Option<Box<dyn AcousticModel + Send + Sync>>,
    params: SynthesisParams,
}

impl SynthesisPipeline {
    pub fn new(
        voice_dir: impl Into<PathBuf>,
        romanizer: Option<Box<dyn Romanizer + Send + Sync>>,
    ) -> Self {
        Self {
            voice_dir: voice_dir.into(),
            language: None,
            romanizer,
            state: PipelineState::Uninitialized,
            config: None,
            vocab: None,
            normalizer: None,
            model: None,
            params: SynthesisParams::default(),
        }
    }

    /// Overrides the voice config's language code for character rewrites.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Runs all three loading transitions and hands back a ready pipeline.
    pub fn initialize(
        voice_dir: impl Into<PathBuf>,
        romanizer: Option<Box<dyn Romanizer + Send + Sync>>,
    ) -> LantunResult<Self> {
        let mut pipeline = Self::new(voice_dir, romanizer);
        pipeline.load_config()?;
        pipeline.load_model()?;
        pipeline.select_device()?;
        Ok(pipeline)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn params(&self) -> SynthesisParams {
        self.params
    }

    pub fn set_params(&mut self, params: SynthesisParams) {
        self.params = params;
    }

    pub fn load_config(&mut self) -> LantunResult<()> {
        self.expect_state(PipelineState::Uninitialized)?;
        match self.try_load_config() {
            Ok(()) => {
                self.state = PipelineState::ConfigLoaded;
                Ok(())
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    fn try_load_config(&mut self) -> LantunResult<()> {
        let config = VoiceConfig::load(&self.voice_dir.join(CONFIG_FILENAME))?;
        let vocab = VocabularyTable::load(&self.voice_dir.join(VOCAB_FILENAME))?;
        let language = self.language.clone().or_else(|| config.language.clone());
        self.normalizer = Some(TextNormalizer::new(
            language,
            config.requires_romanization(),
            self.romanizer.take(),
        ));
        self.params = config.inference.to_params();
        self.config = Some(config);
        self.vocab = Some(vocab);
        Ok(())
    }

    pub fn load_model(&mut self) -> LantunResult<()> {
        self.expect_state(PipelineState::ConfigLoaded)?;
        match self.try_load_model() {
            Ok(model) => self.attach_model(Box::new(model)),
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    fn try_load_model(&self) -> LantunResult<VitsModel> {
        let config = self.config.as_ref().ok_or_else(Self::inconsistent_state)?;
        let vocab = self.vocab.as_ref().ok_or_else(Self::inconsistent_state)?;
        VitsModel::load(config, vocab.len(), &self.voice_dir.join(CHECKPOINT_FILENAME))
    }

    /// Installs the acoustic network behind the trait seam; `load_model` is
    /// the production caller, tests substitute fakes.
    pub fn attach_model(
        &mut self,
        model: Box<dyn AcousticModel + Send + Sync>,
    ) -> LantunResult<()> {
        self.expect_state(PipelineState::ConfigLoaded)?;
        self.model = Some(model);
        self.state = PipelineState::ModelLoaded;
        Ok(())
    }

    /// Execution providers are registered process-wide before the first
    /// session is built, so this transition records the outcome.
    pub fn select_device(&mut self) -> LantunResult<()> {
        self.expect_state(PipelineState::ModelLoaded)?;
        log::info!("inference device: {}", lantun_vits::inference_device());
        self.state = PipelineState::Ready;
        Ok(())
    }

    /// One request: normalize, encode, infer. The pipeline stays reusable
    /// after `Done`; any failure is terminal.
    pub fn synthesize(&mut self, text: &str) -> LantunAudioResult {
        match self.state {
            PipelineState::Ready | PipelineState::Done => {}
            _ => {
                return Err(LantunError::OperationError(format!(
                    "Pipeline is not ready for synthesis (state: {:?})",
                    self.state
                )))
            }
        }
        self.state = PipelineState::Synthesizing;
        match self.run_request(text) {
            Ok(audio) => {
                self.state = PipelineState::Done;
                Ok(audio)
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    pub fn synthesize_to_file(&mut self, filename: &Path, text: &str) -> LantunResult<()> {
        let audio = self.synthesize(text)?;
        if audio.is_empty() {
            return Err(LantunError::OperationError(
                "No speech data to write".to_string(),
            ));
        }
        Ok(audio.save_to_file(filename)?)
    }

    fn run_request(&self, text: &str) -> LantunAudioResult {
        let config = self.config.as_ref().ok_or_else(Self::inconsistent_state)?;
        let vocab = self.vocab.as_ref().ok_or_else(Self::inconsistent_state)?;
        let normalizer = self
            .normalizer
            .as_ref()
            .ok_or_else(Self::inconsistent_state)?;
        let model = self.model.as_ref().ok_or_else(Self::inconsistent_state)?;

        let text = remap_clause_breaks(text);
        let text = normalizer.normalize(&text, vocab)?;
        log::debug!("normalized text: `{}`", text);
        let ids = symbols_to_ids(text.trim(), vocab)?;
        let ids = if config.data.add_blank {
            intersperse_blank(ids, BLANK_ID)
        } else {
            ids
        };
        model.infer(&ids, &self.params)
    }

    fn expect_state(&self, expected: PipelineState) -> LantunResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LantunError::OperationError(format!(
                "Invalid pipeline transition: expected state {:?}, found {:?}",
                expected, self.state
            )))
        }
    }

    fn inconsistent_state() -> LantunError {
        LantunError::OperationError("Pipeline state is inconsistent".to_string())
    }
}
