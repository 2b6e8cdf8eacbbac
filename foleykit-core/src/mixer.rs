// Mixer - drains playback commands and mixes active voices into the output
// buffer. Runs on the audio thread via the engine's fill callback.

use crossbeam_channel::{Receiver, Sender};

use crate::events::FoleyEvent;
use crate::playback::{PlaybackCommand, Voice};
use crate::world::ClipId;

/// Result of one mix pass.
pub struct MixResult {
    /// Largest number of frames any voice wrote.
    pub frames_filled: usize,
    /// Clips whose voices played their last frame during this pass.
    pub completed: Vec<ClipId>,
}

/// Pulls commands from the world and renders the active voices.
pub struct FoleyMixer {
    commands: Receiver<PlaybackCommand>,
    events: Sender<FoleyEvent>,
    voices: Vec<Voice>,
}

impl FoleyMixer {
    pub fn new(commands: Receiver<PlaybackCommand>, events: Sender<FoleyEvent>) -> Self {
        Self {
            commands,
            events,
            voices: Vec::new(),
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Drains pending commands, then accumulates every active voice into
    /// `buffer`. Finished voices are retired and reported both through the
    /// returned [`MixResult`] and as `ClipFinished` events.
    ///
    /// The buffer is not cleared here; the caller hands in a zeroed block.
    pub fn mix(&mut self, buffer: &mut [f32], channels: u16) -> MixResult {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                PlaybackCommand::Play { clip, data, gain } => {
                    log::debug!("Mixer: starting voice for clip {} at gain {}", clip, gain);
                    self.voices.push(Voice::new(clip, data, gain));
                    let _ = self.events.send(FoleyEvent::ClipStarted { clip });
                }
                PlaybackCommand::StopAll => {
                    log::debug!("Mixer: dropping {} active voices", self.voices.len());
                    self.voices.clear();
                }
            }
        }

        let mut frames_filled_max = 0;
        for voice in &mut self.voices {
            let frames_filled = voice.mix_into(buffer, channels);
            frames_filled_max = frames_filled_max.max(frames_filled);
        }

        let mut completed = Vec::new();
        self.voices.retain(|voice| {
            if voice.is_finished() {
                completed.push(voice.clip());
                false
            } else {
                true
            }
        });

        for clip in &completed {
            let _ = self.events.send(FoleyEvent::ClipFinished { clip: *clip });
        }

        MixResult {
            frames_filled: frames_filled_max,
            completed,
        }
    }
}
