//! # FoleyKit Core
//!
//! Procedural foley for a door scene: synthesized door, footstep, and room
//! tone effects, a canonical WAVE encoder, and a scheduled playback cue.
//!
//! FoleyKit renders every clip from scratch (no bundled assets), registers
//! them in a clip world, and plays the fixed door-scene cue through the
//! default output device. The clock and the output backend are both
//! injectable, so the full cue is testable without real time or real
//! hardware.
//!
//! ## Quick Start
//!
//! ```no_run
//! use foleykit_core::*;
//!
//! // Describe the audio world
//! let desc = FoleyWorldDesc::default();
//!
//! // Build the sequencer on the default output device
//! let mut sequencer = FoleySequencer::new(desc)?;
//!
//! // Render and register the cue clips, then start the stream
//! sequencer.preload()?;
//!
//! // Fire the door cue and wait for it to finish
//! let handle = sequencer.play_door_cue();
//! handle.wait();
//!
//! // See what happened
//! for event in sequencer.poll_events() {
//!     match event {
//!         FoleyEvent::CueCompleted { elapsed } => {
//!             println!("Cue finished after {:?}", elapsed);
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok::<(), FoleyError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`FoleySequencer`]**: Owns the world, mixer, and output; runs the door cue
//! - **[`FoleyWorld`]**: Clip registry and playback control surface on the main thread
//! - **[`FoleyEngine`]**: cpal-backed output stream behind the [`AudioOutput`] trait
//! - **[`EffectKind`]**: The four synthesized effect families
//! - **[`FoleyAudioData`](audio_data::FoleyAudioData)**: Immutable clips, WAV in and out
//! - **[`FoleyEvent`]**: Events emitted during preload, dispatch, and playback
//!
//! ## Architecture
//!
//! Three threads cooperate per cue run:
//!
//! 1. **Main Thread**: Owns the sequencer, renders clips, issues commands
//! 2. **Dispatch Thread**: Walks the cue schedule against the clock and sends play commands
//! 3. **Audio Callback**: Drains commands and mixes voices; skips a pass rather than block
//!
//! ## Features
//!
//! - Procedural effect rendering with a deterministic seeded mode
//! - Canonical 44-byte-header mono WAVE encoding, byte-stable across runs
//! - Fixed door cue with absolute-deadline dispatch and single-flight playback
//! - Injectable clock and output backend for device-free deterministic tests
//! - Automatic downmix and resampling to the world's format at registration

pub mod audio_data;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod mixer;
pub mod playback;
pub mod sequencer;
pub mod synth;
pub mod wav;
pub mod world;

pub use audio_data::FoleyAudioData;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::FoleyWorldDesc;
pub use engine::{AudioFillCallback, AudioOutput, FoleyEngine};
pub use error::FoleyError;
pub use events::FoleyEvent;
pub use mixer::{FoleyMixer, MixResult};
pub use playback::{PlaybackCommand, Voice};
pub use sequencer::{CueHandle, CueStep, DOOR_CUE_TOTAL, FoleySequencer, door_cue};
pub use synth::{EffectKind, render, render_with_rng};
pub use world::{ClipId, FoleyWorld};
