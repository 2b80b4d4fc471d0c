const I16MIN_F32: f32 = i16::MIN as f32;
const I16MAX_F32: f32 = i16::MAX as f32;
const MAX_WAV_VALUE_I16: f32 = 32767.0;

#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub sample_rate: usize,
    pub num_channels: usize,
    pub sample_width: usize,
}

/// Raw mono waveform samples, nominally in `[-1, 1]`.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct AudioSamples(Vec<f32>);

impl AudioSamples {
    pub fn new(samples: Vec<f32>) -> Self {
        Self(samples)
    }
    pub fn as_slice(&self) -> &[f32] {
        self.0.as_slice()
    }
    pub fn as_vec(&self) -> &Vec<f32> {
        &self.0
    }
    pub fn as_mut_vec(&mut self) -> &mut Vec<f32> {
        &mut self.0
    }
    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
    pub fn take(&mut self) -> Vec<f32> {
        std::mem::take(self.0.as_mut())
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Scales by the absolute peak so the loudest sample hits full range.
    pub fn to_i16_vec(&self) -> Vec<i16> {
        if self.is_empty() {
            return Default::default();
        }
        let min_audio_value = self
            .0
            .iter()
            .min_by(|x, y| x.partial_cmp(y).unwrap())
            .unwrap();
        let max_audio_value = self
            .0
            .iter()
            .max_by(|x, y| x.partial_cmp(y).unwrap())
            .unwrap();
        let abs_max = max_audio_value
            .abs()
            .max(min_audio_value.abs())
            .max(f32::EPSILON);
        let audio_scale = MAX_WAV_VALUE_I16 / abs_max;
        Vec::from_iter(
            self.0
                .iter()
                .map(|f| (f * audio_scale).clamp(I16MIN_F32, I16MAX_F32) as i16),
        )
    }
    pub fn as_wave_bytes(&self) -> Vec<u8> {
        Vec::from_iter(self.to_i16_vec().into_iter().flat_map(|i| i.to_le_bytes()))
    }
    pub fn merge(&mut self, mut other: Self) {
        self.0.append(other.0.as_mut());
    }
}

impl From<AudioSamples> for Vec<f32> {
    fn from(other: AudioSamples) -> Self {
        other.into_vec()
    }
}

impl From<Vec<f32>> for AudioSamples {
    fn from(other: Vec<f32>) -> Self {
        Self::new(other)
    }
}

impl IntoIterator for AudioSamples {
    type Item = f32;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One synthesized utterance plus the time inference took to produce it.
#[derive(Debug, Clone)]
#[must_use]
pub struct Audio {
    pub samples: AudioSamples,
    pub info: AudioInfo,
    pub inference_ms: Option<f32>,
}

impl Audio {
    pub fn new(samples: AudioSamples, sample_rate: usize, inference_ms: Option<f32>) -> Self {
        Self {
            samples,
            inference_ms,
            info: AudioInfo {
                sample_rate,
                num_channels: 1,
                sample_width: 2,
            },
        }
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.samples.into_vec()
    }

    pub fn as_wave_bytes(&self) -> Vec<u8> {
        self.samples.as_wave_bytes()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> f32 {
        (self.len() as f32 / self.info.sample_rate as f32) * 1000.0f32
    }

    pub fn real_time_factor(&self) -> Option<f32> {
        let infer_ms = self.inference_ms?;
        let audio_duration = self.duration_ms();
        if audio_duration == 0.0 {
            return Some(0.0f32);
        }
        Some(infer_ms / audio_duration)
    }

    pub fn save_to_file(&self, filename: &std::path::Path) -> Result<(), crate::WaveWriterError> {
        crate::write_wave_samples_to_file(
            filename,
            self.samples.to_i16_vec().iter(),
            self.info.sample_rate as u32,
            self.info.num_channels as u32,
            self.info.sample_width as u32,
        )
    }
}

impl IntoIterator for Audio {
    type Item = f32;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_i16_scales_to_peak() {
        let samples = AudioSamples::from(vec![0.0, 0.5, -0.5]);
        let ints = samples.to_i16_vec();
        assert_eq!(ints[0], 0);
        assert_eq!(ints[1], 32767);
        assert_eq!(ints[2], -32767);
    }

    #[test]
    fn test_to_i16_empty() {
        let samples = AudioSamples::default();
        assert!(samples.to_i16_vec().is_empty());
    }

    #[test]
    fn test_wave_bytes_are_little_endian_pairs() {
        let samples = AudioSamples::from(vec![1.0]);
        let bytes = samples.as_wave_bytes();
        assert_eq!(bytes.len(), 2);
        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), 32767);
    }

    #[test]
    fn test_merge() {
        let mut s1 = AudioSamples::from(vec![1.0, 2.0]);
        let s2 = AudioSamples::from(vec![3.0]);
        s1.merge(s2);
        assert_eq!(s1.len(), 3);
    }

    #[test]
    fn test_duration() {
        let audio = Audio::new(vec![0.0f32; 16000].into(), 16000, None);
        assert_eq!(audio.duration_ms(), 1000.0);
    }

    #[test]
    fn test_real_time_factor() {
        let audio = Audio::new(vec![0.0f32; 16000].into(), 16000, Some(250.0));
        assert_eq!(audio.real_time_factor(), Some(0.25));
    }
}
