//! Event types for foleykit

use std::time::Duration;

use crate::synth::EffectKind;
use crate::world::ClipId;

/// Events surfaced through [`crate::sequencer::FoleySequencer::poll_events`].
///
/// Cue events come from the dispatch thread, clip events from the mixer on
/// the audio thread, output events from the sequencer itself.
#[derive(Debug, Clone, PartialEq)]
pub enum FoleyEvent {
    /// The door cue began dispatching.
    CueStarted { at: Duration },
    /// A scheduled clip was handed to the audio thread at its cue offset.
    ClipTriggered {
        effect: EffectKind,
        offset: Duration,
        gain: f32,
    },
    /// The cue ran its full span; a new cue may start now.
    CueCompleted { elapsed: Duration },
    /// The mixer picked up a voice for this clip.
    ClipStarted { clip: ClipId },
    /// A voice played its last frame and was retired.
    ClipFinished { clip: ClipId },
    OutputStarted,
    OutputStopped,
}

impl FoleyEvent {
    pub fn clip_id(&self) -> Option<ClipId> {
        match self {
            Self::ClipStarted { clip } | Self::ClipFinished { clip } => Some(*clip),
            _ => None,
        }
    }

    pub fn is_cue_event(&self) -> bool {
        matches!(
            self,
            Self::CueStarted { .. } | Self::ClipTriggered { .. } | Self::CueCompleted { .. }
        )
    }

    pub fn is_clip_event(&self) -> bool {
        matches!(self, Self::ClipStarted { .. } | Self::ClipFinished { .. })
    }
}
