use std::sync::Arc;

use crate::audio_data::FoleyAudioData;
use crate::world::ClipId;

/// Commands sent from the world to the audio thread.
#[derive(Debug)]
pub enum PlaybackCommand {
    /// Start a one-shot voice for `clip`. The clip data rides along in the
    /// command so the audio thread never reaches back into the registry.
    Play {
        clip: ClipId,
        data: Arc<FoleyAudioData>,
        gain: f32,
    },
    StopAll,
}

/// One active playback of a clip.
///
/// Voices play once and are dropped by the mixer when they run out of
/// frames. The registry stores clips as mono, so a voice fans its sample
/// out to every output channel.
#[derive(Debug)]
pub struct Voice {
    clip: ClipId,
    data: Arc<FoleyAudioData>,
    gain: f32,
    position: usize,
}

impl Voice {
    pub fn new(clip: ClipId, data: Arc<FoleyAudioData>, gain: f32) -> Self {
        Self {
            clip,
            data,
            gain,
            position: 0,
        }
    }

    pub fn clip(&self) -> ClipId {
        self.clip
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Current playback position in frames.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.data.total_frames()
    }

    /// Mixes this voice into `buffer`, accumulating on top of whatever is
    /// already there. Returns the number of frames written.
    pub fn mix_into(&mut self, buffer: &mut [f32], channels: u16) -> usize {
        let channels = channels as usize;
        let frame_count = buffer.len() / channels;
        let samples = self.data.samples();
        let mut frames_filled = 0;

        for frame_idx in 0..frame_count {
            if self.position >= samples.len() {
                break;
            }

            let sample = samples[self.position] * self.gain;
            for channel in 0..channels {
                buffer[frame_idx * channels + channel] += sample;
            }

            self.position += 1;
            frames_filled += 1;
        }

        frames_filled
    }
}
