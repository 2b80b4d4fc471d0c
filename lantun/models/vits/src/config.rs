use lantun_core::{LantunError, LantunResult, SynthesisParams};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// Training-file suffix that marks a voice trained on a romanized corpus.
const UROMAN_SUFFIX: &str = "uroman";

#[derive(Deserialize, Default)]
pub struct VoiceConfig {
    /// ISO 639-3 code; selects language specific character rewrites.
    #[serde(default)]
    pub language: Option<String>,
    pub data: DataConfig,
    pub train: TrainConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

#[derive(Deserialize, Default)]
pub struct DataConfig {
    #[allow(dead_code)]
    pub text_cleaners: Vec<String>,
    pub sampling_rate: u32,
    pub filter_length: u32,
    pub hop_length: u32,
    pub add_blank: bool,
    pub training_files: String,
}

#[derive(Deserialize, Default)]
pub struct TrainConfig {
    pub segment_size: u32,
}

#[derive(Deserialize, Default, Clone, Copy)]
pub struct InferenceConfig {
    pub noise_scale: Option<f32>,
    pub length_scale: Option<f32>,
    pub noise_w: Option<f32>,
}

impl InferenceConfig {
    pub fn to_params(self) -> SynthesisParams {
        let defaults = SynthesisParams::default();
        SynthesisParams {
            noise_scale: self.noise_scale.unwrap_or(defaults.noise_scale),
            length_scale: self.length_scale.unwrap_or(defaults.length_scale),
            noise_w: self.noise_w.unwrap_or(defaults.noise_w),
        }
    }
}

impl VoiceConfig {
    pub fn load(config_path: &Path) -> LantunResult<Self> {
        let file = match File::open(config_path) {
            Ok(file) => file,
            Err(why) => {
                return Err(LantunError::ResourceNotFound(format!(
                    "Failed to load voice config: `{}`. Caused by: `{}`",
                    config_path.display(),
                    why
                )))
            }
        };
        match serde_json::from_reader(file) {
            Ok(config) => Ok(config),
            Err(why) => Err(LantunError::ResourceNotFound(format!(
                "Failed to parse voice config from file: `{}`. Caused by: `{}`",
                config_path.display(),
                why
            ))),
        }
    }

    /// Voices trained on a romanized corpus expect romanized input text.
    pub fn requires_romanization(&self) -> bool {
        self.data.training_files.rsplit('.').next() == Some(UROMAN_SUFFIX)
    }

    pub fn spectral_channels(&self) -> u32 {
        self.data.filter_length / 2 + 1
    }

    pub fn segment_frames(&self) -> u32 {
        self.train.segment_size / self.data.hop_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_JSON: &str = r#"{
        "data": {
            "text_cleaners": ["multilingual_cleaners"],
            "sampling_rate": 16000,
            "filter_length": 1024,
            "hop_length": 256,
            "add_blank": true,
            "training_files": "train.ltr.uroman"
        },
        "train": {"segment_size": 8192}
    }"#;

    #[test]
    fn test_parse_minimal_config() {
        let config: VoiceConfig = serde_json::from_str(CONFIG_JSON).unwrap();
        assert_eq!(config.data.sampling_rate, 16000);
        assert!(config.data.add_blank);
        assert!(config.language.is_none());
    }

    #[test]
    fn test_uroman_suffix_detection() {
        let mut config: VoiceConfig = serde_json::from_str(CONFIG_JSON).unwrap();
        assert!(config.requires_romanization());
        config.data.training_files = "train.csv".to_string();
        assert!(!config.requires_romanization());
        // no dot at all still compares the whole identifier
        config.data.training_files = "uroman".to_string();
        assert!(config.requires_romanization());
    }

    #[test]
    fn test_inference_params_default_when_absent() {
        let config: VoiceConfig = serde_json::from_str(CONFIG_JSON).unwrap();
        let params = config.inference.to_params();
        assert_eq!(params.noise_scale, 0.667);
        assert_eq!(params.length_scale, 1.0);
        assert_eq!(params.noise_w, 0.8);
    }

    #[test]
    fn test_inference_params_override() {
        let raw = CONFIG_JSON.replace(
            "\"train\":",
            "\"inference\": {\"length_scale\": 1.4}, \"train\":",
        );
        let config: VoiceConfig = serde_json::from_str(&raw).unwrap();
        let params = config.inference.to_params();
        assert_eq!(params.length_scale, 1.4);
        assert_eq!(params.noise_scale, 0.667);
    }

    #[test]
    fn test_derived_dimensions() {
        let config: VoiceConfig = serde_json::from_str(CONFIG_JSON).unwrap();
        assert_eq!(config.spectral_channels(), 513);
        assert_eq!(config.segment_frames(), 32);
    }

    #[test]
    fn test_missing_config_file() {
        let result = VoiceConfig::load(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(LantunError::ResourceNotFound(_))));
    }
}
