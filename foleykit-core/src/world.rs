use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender};
use uuid::Uuid;

use crate::audio_data::FoleyAudioData;
use crate::config::FoleyWorldDesc;
use crate::error::{FoleyError, Result};
use crate::playback::PlaybackCommand;

/// Lightweight, type-safe handle for registered clips.
///
/// Returned when registering clip data with the world. Used to reference
/// clips for playback and release.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClipId(Uuid);

impl ClipId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClipId({})", self.0)
    }
}

/// Clip registry and control surface for playback.
///
/// `FoleyWorld` lives on the main thread: it owns the prepared clips and
/// turns play requests into commands for the audio thread. The audio thread
/// never touches the registry; each play command carries its clip data along.
pub struct FoleyWorld {
    desc: FoleyWorldDesc,
    clips: Mutex<HashMap<ClipId, Arc<FoleyAudioData>>>,
    command_sender: Sender<PlaybackCommand>,
    command_receiver: Receiver<PlaybackCommand>,
}

impl FoleyWorld {
    pub fn new(desc: FoleyWorldDesc) -> Result<Self> {
        desc.validate()?;
        let (command_sender, command_receiver) = crossbeam_channel::unbounded();
        Ok(Self {
            desc,
            clips: Mutex::new(HashMap::new()),
            command_sender,
            command_receiver,
        })
    }

    /// Returns the sample rate of the audio world.
    pub fn sample_rate(&self) -> u32 {
        self.desc.sample_rate
    }

    pub fn desc(&self) -> &FoleyWorldDesc {
        &self.desc
    }

    /// Registers a clip in the world's storage and returns a ClipId handle.
    ///
    /// This prepares the clip for playback but does not start playing it;
    /// call [`FoleyWorld::play`] with the returned id for that. Clips are
    /// stored mono at the world's sample rate, so multi-channel data is
    /// downmixed and mismatched rates are resampled here, once, rather than
    /// on the audio thread.
    pub fn register_clip(&self, data: Arc<FoleyAudioData>) -> Result<ClipId> {
        let mono = if data.channels() != 1 {
            Arc::new(data.to_mono()?)
        } else {
            data
        };

        let prepared = if mono.sample_rate() != self.desc.sample_rate {
            Arc::new(mono.resample(self.desc.sample_rate)?)
        } else {
            mono
        };

        let id = ClipId::new();
        self.clips.lock().unwrap().insert(id, prepared);
        Ok(id)
    }

    /// Retrieves a registered clip by its id.
    pub fn clip(&self, id: ClipId) -> Option<Arc<FoleyAudioData>> {
        self.clips.lock().unwrap().get(&id).cloned()
    }

    /// Removes a clip from the world, returning it if it existed.
    ///
    /// Voices already playing the clip keep their own reference and play out.
    pub fn release_clip(&self, id: ClipId) -> Option<Arc<FoleyAudioData>> {
        self.clips.lock().unwrap().remove(&id)
    }

    /// Returns the ids of every clip currently registered.
    pub fn clip_ids(&self) -> Vec<ClipId> {
        self.clips.lock().unwrap().keys().copied().collect()
    }

    pub fn contains_clip(&self, id: ClipId) -> bool {
        self.clips.lock().unwrap().contains_key(&id)
    }

    pub fn clip_count(&self) -> usize {
        self.clips.lock().unwrap().len()
    }

    /// Starts one-shot playback of a registered clip at the given gain.
    ///
    /// # Errors
    ///
    /// Returns an error if the clip id is not registered or the command
    /// cannot reach the audio thread.
    pub fn play(&self, id: ClipId, gain: f32) -> Result<()> {
        let Some(data) = self.clip(id) else {
            return Err(FoleyError::ClipNotFound(id.to_string()));
        };

        self.command_sender
            .send(PlaybackCommand::Play {
                clip: id,
                data,
                gain,
            })
            .map_err(|e| FoleyError::Engine(format!("Failed to send play command: {}", e)))?;

        Ok(())
    }

    /// Stops every active voice.
    pub fn stop_all(&self) -> Result<()> {
        self.command_sender
            .send(PlaybackCommand::StopAll)
            .map_err(|e| FoleyError::Engine(format!("Failed to send stop all command: {}", e)))?;

        Ok(())
    }

    /// Returns the command receiver the mixer drains on the audio thread.
    pub fn command_receiver(&self) -> &Receiver<PlaybackCommand> {
        &self.command_receiver
    }

    pub(crate) fn command_sender(&self) -> Sender<PlaybackCommand> {
        self.command_sender.clone()
    }
}
