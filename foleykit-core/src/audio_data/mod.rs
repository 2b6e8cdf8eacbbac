//! In-memory audio clips shared between the world, mixer, and encoder.

mod loader;
mod resampler;

use std::sync::Arc;
use std::time::Duration;

pub use loader::{decode_wav_bytes, load_audio_file};

use crate::error::Result;
use crate::wav;

/// Immutable audio clip: interleaved f32 samples plus format metadata.
///
/// Cloning is cheap; the sample storage is shared behind an `Arc`, which is
/// what lets the audio thread hold onto a clip while the world keeps its own
/// reference.
#[derive(Debug, Clone)]
pub struct FoleyAudioData {
    inner: Arc<AudioDataInner>,
}

#[derive(Debug)]
struct AudioDataInner {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    duration: Duration,
    total_frames: usize,
}

impl FoleyAudioData {
    pub(crate) fn new(
        samples: Vec<f32>,
        sample_rate: u32,
        channels: u16,
        duration: Duration,
    ) -> Self {
        let total_frames = samples.len() / channels as usize;
        Self {
            inner: Arc::new(AudioDataInner {
                samples,
                sample_rate,
                channels,
                duration,
                total_frames,
            }),
        }
    }

    /// Wraps freshly generated mono samples as a clip.
    pub fn from_mono_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64);
        Self::new(samples, sample_rate, 1, duration)
    }

    /// Decodes a WAVE file held in memory into a clip.
    pub fn from_wav_bytes(bytes: Vec<u8>) -> Result<Self> {
        decode_wav_bytes(bytes)
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.inner.channels
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    pub fn samples(&self) -> &[f32] {
        &self.inner.samples
    }

    pub fn total_frames(&self) -> usize {
        self.inner.total_frames
    }

    pub fn is_empty(&self) -> bool {
        self.inner.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.samples.len()
    }

    /// Convert to mono by downmixing all channels
    pub fn to_mono(&self) -> Result<Self> {
        if self.inner.channels == 1 {
            return Ok(self.clone());
        }

        let mono_samples: Vec<f32> = self
            .inner
            .samples
            .chunks(self.inner.channels as usize)
            .map(|frame| {
                let sum: f32 = frame.iter().sum();
                sum / self.inner.channels as f32
            })
            .collect();

        let mono_duration =
            Duration::from_secs_f64(mono_samples.len() as f64 / self.inner.sample_rate as f64);

        Ok(Self::new(
            mono_samples,
            self.inner.sample_rate,
            1,
            mono_duration,
        ))
    }

    /// Resample to a different sample rate using rubato
    pub fn resample(&self, target_sample_rate: u32) -> Result<Self> {
        if target_sample_rate == self.inner.sample_rate {
            return Ok(self.clone());
        }

        let channels = self.inner.channels as usize;
        let mut planes = Vec::with_capacity(channels);
        for ch in 0..channels {
            let plane: Vec<f32> = self
                .inner
                .samples
                .chunks(channels)
                .map(|frame| frame.get(ch).copied().unwrap_or(0.0))
                .collect();
            planes.push(resampler::resample_channel(
                &plane,
                self.inner.sample_rate,
                target_sample_rate,
            )?);
        }

        let frames = planes.iter().map(|plane| plane.len()).min().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * channels);
        for frame_idx in 0..frames {
            for plane in &planes {
                samples.push(plane[frame_idx]);
            }
        }

        let duration = Duration::from_secs_f64(frames as f64 / target_sample_rate as f64);
        Ok(Self::new(
            samples,
            target_sample_rate,
            self.inner.channels,
            duration,
        ))
    }

    /// Encodes the clip as a mono 16-bit WAVE file.
    ///
    /// Multi-channel clips are downmixed first, so the output always matches
    /// the layout [`decode_wav_bytes`] expects back.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mono = self.to_mono()?;
        Ok(wav::encode_wav_to_vec(mono.samples(), mono.sample_rate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_clip_reports_its_shape() {
        let clip = FoleyAudioData::from_mono_samples(vec![0.0; 44100], 44100);
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.total_frames(), 44100);
        assert_eq!(clip.len(), 44100);
        assert_eq!(clip.duration(), Duration::from_secs(1));
        assert!(!clip.is_empty());
    }

    #[test]
    fn to_mono_averages_frames() {
        let interleaved = vec![0.2, 0.4, -1.0, 1.0, 0.0, 0.6];
        let stereo =
            FoleyAudioData::new(interleaved, 48000, 2, Duration::from_secs_f64(3.0 / 48000.0));

        let mono = stereo.to_mono().unwrap();
        assert_eq!(mono.channels(), 1);
        assert_eq!(mono.samples(), &[0.3, 0.0, 0.3]);
    }

    #[test]
    fn to_mono_on_mono_is_identity() {
        let clip = FoleyAudioData::from_mono_samples(vec![0.1, 0.2], 44100);
        let mono = clip.to_mono().unwrap();
        assert_eq!(mono.samples(), clip.samples());
    }

    #[test]
    fn resample_to_same_rate_is_identity() {
        let clip = FoleyAudioData::from_mono_samples(vec![0.5; 1000], 44100);
        let resampled = clip.resample(44100).unwrap();
        assert_eq!(resampled.samples(), clip.samples());
    }

    #[test]
    fn resample_keeps_channel_count_and_scales_frames() {
        let frames = 22050usize;
        let mut interleaved = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let t = i as f32 / 44100.0;
            interleaved.push((std::f32::consts::TAU * 220.0 * t).sin() * 0.4);
            interleaved.push((std::f32::consts::TAU * 330.0 * t).sin() * 0.4);
        }
        let stereo = FoleyAudioData::new(
            interleaved,
            44100,
            2,
            Duration::from_secs_f64(frames as f64 / 44100.0),
        );

        let resampled = stereo.resample(48000).unwrap();
        assert_eq!(resampled.channels(), 2);
        assert_eq!(resampled.sample_rate(), 48000);

        let exact = frames as f64 * 48000.0 / 44100.0;
        let deviation = (resampled.total_frames() as f64 - exact).abs() / exact;
        assert!(deviation < 0.05);
    }

    #[test]
    fn wav_round_trip_downmixes_to_mono() {
        let interleaved = vec![0.2, 0.4, -0.2, -0.4, 0.5, 0.5];
        let stereo =
            FoleyAudioData::new(interleaved, 44100, 2, Duration::from_secs_f64(3.0 / 44100.0));

        let bytes = stereo.to_wav_bytes().unwrap();
        let restored = FoleyAudioData::from_wav_bytes(bytes).unwrap();

        assert_eq!(restored.channels(), 1);
        assert_eq!(restored.total_frames(), 3);

        let expected = stereo.to_mono().unwrap();
        for (a, b) in expected.samples().iter().zip(restored.samples()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
