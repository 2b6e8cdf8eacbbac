//! The door-scene cue: a fixed schedule of rendered clips played once.
//!
//! [`FoleySequencer`] owns the world, the mixer, and the output backend. A
//! cue run resolves every schedule entry up front, then a dispatch thread
//! walks the entries against the clock using absolute deadlines from the cue
//! start, so a late wakeup on one step never pushes the following steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::audio_data::FoleyAudioData;
use crate::clock::{Clock, SystemClock};
use crate::config::FoleyWorldDesc;
use crate::engine::{AudioOutput, FoleyEngine};
use crate::error::Result;
use crate::events::FoleyEvent;
use crate::mixer::FoleyMixer;
use crate::playback::PlaybackCommand;
use crate::synth::{self, EffectKind};
use crate::world::{ClipId, FoleyWorld};

/// Span of the door cue from start to completion.
pub const DOOR_CUE_TOTAL: Duration = Duration::from_millis(2500);

/// One entry of the cue schedule: which effect plays, when, and how loud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueStep {
    pub offset: Duration,
    pub effect: EffectKind,
    pub gain: f32,
}

fn step(offset_ms: u64, effect: EffectKind, gain: f32) -> CueStep {
    CueStep {
        offset: Duration::from_millis(offset_ms),
        effect,
        gain,
    }
}

/// The fixed door-scene schedule: ambient bed and opening door together,
/// four footsteps walking in, then the door closing behind them.
pub fn door_cue() -> [CueStep; 7] {
    [
        step(0, EffectKind::Ambient, 0.3),
        step(0, EffectKind::DoorOpen, 0.8),
        step(800, EffectKind::Footstep { step: 1 }, 0.6),
        step(1200, EffectKind::Footstep { step: 2 }, 0.7),
        step(1600, EffectKind::Footstep { step: 3 }, 0.6),
        step(2000, EffectKind::Footstep { step: 4 }, 0.5),
        step(2200, EffectKind::DoorClose, 0.6),
    ]
}

/// Registered clip ids for every effect the schedule references.
#[derive(Debug, Clone, Copy)]
struct CueClips {
    ambient: ClipId,
    door_open: ClipId,
    door_close: ClipId,
    footsteps: [ClipId; 4],
}

impl CueClips {
    fn clip_for(&self, effect: EffectKind) -> ClipId {
        match effect {
            EffectKind::Ambient => self.ambient,
            EffectKind::DoorOpen => self.door_open,
            EffectKind::DoorClose => self.door_close,
            EffectKind::Footstep { step } => {
                self.footsteps[(step.saturating_sub(1) % 4) as usize]
            }
        }
    }

    fn all(&self) -> [ClipId; 7] {
        [
            self.ambient,
            self.door_open,
            self.door_close,
            self.footsteps[0],
            self.footsteps[1],
            self.footsteps[2],
            self.footsteps[3],
        ]
    }
}

/// Handle for one `play_door_cue` call.
pub struct CueHandle {
    started: bool,
    completed: Option<Receiver<()>>,
}

impl CueHandle {
    fn not_started() -> Self {
        Self {
            started: false,
            completed: None,
        }
    }

    /// Whether this call actually started the cue. `false` means the call
    /// was rejected: another cue was in flight or nothing was preloaded.
    pub fn started(&self) -> bool {
        self.started
    }

    /// Blocks until the cue completes. Returns immediately for handles of
    /// rejected calls.
    pub fn wait(&self) {
        if let Some(completed) = &self.completed {
            let _ = completed.recv();
        }
    }
}

/// Plays the door cue against a clip world, an output backend, and a clock.
///
/// The default instantiation runs on the cpal engine and the wall clock;
/// [`FoleySequencer::with_output`] swaps either for tests or embedding.
pub struct FoleySequencer<O: AudioOutput = FoleyEngine> {
    world: FoleyWorld,
    output: O,
    mixer: Arc<Mutex<FoleyMixer>>,
    clock: Arc<dyn Clock>,
    clips: Option<CueClips>,
    loaded: bool,
    in_flight: Arc<AtomicBool>,
    event_sender: Sender<FoleyEvent>,
    event_receiver: Receiver<FoleyEvent>,
}

impl FoleySequencer<FoleyEngine> {
    /// Builds a sequencer backed by the default output device and wall clock.
    ///
    /// The engine's fill callback is wired to the mixer here; the audio
    /// thread skips a pass instead of blocking when the mixer is busy.
    pub fn new(desc: FoleyWorldDesc) -> Result<Self> {
        let engine = FoleyEngine::new(desc.clone())?;
        let mut sequencer = Self::with_output(desc, engine, Arc::new(SystemClock::new()))?;

        let mixer = Arc::clone(&sequencer.mixer);
        sequencer
            .output
            .set_fill_callback(move |buffer, _sample_rate, channels| {
                match mixer.try_lock() {
                    Ok(mut mixer) => mixer.mix(buffer, channels).frames_filled,
                    Err(_) => 0,
                }
            });

        Ok(sequencer)
    }
}

impl<O: AudioOutput> FoleySequencer<O> {
    /// Builds a sequencer on a caller-supplied output backend and clock.
    ///
    /// The caller owns the wiring between the output and [`FoleySequencer::mixer`];
    /// [`FoleySequencer::new`] does that automatically for the cpal engine.
    pub fn with_output(desc: FoleyWorldDesc, output: O, clock: Arc<dyn Clock>) -> Result<Self> {
        let world = FoleyWorld::new(desc)?;
        let (event_sender, event_receiver) = crossbeam_channel::unbounded();
        let mixer = Arc::new(Mutex::new(FoleyMixer::new(
            world.command_receiver().clone(),
            event_sender.clone(),
        )));

        Ok(Self {
            world,
            output,
            mixer,
            clock,
            clips: None,
            loaded: false,
            in_flight: Arc::new(AtomicBool::new(false)),
            event_sender,
            event_receiver,
        })
    }

    /// Renders all seven cue clips, registers them with the world, and
    /// starts the output stream.
    ///
    /// Preloading again re-renders: clips from the previous load are
    /// released first so the registry never accumulates strays. On any
    /// failure, everything this call registered is released again and the
    /// sequencer stays unloaded; `play_door_cue` keeps rejecting until a
    /// preload succeeds.
    pub fn preload(&mut self) -> Result<()> {
        if let Some(clips) = self.clips.take() {
            self.loaded = false;
            for id in clips.all() {
                self.world.release_clip(id);
            }
        }

        let mut registered: Vec<ClipId> = Vec::with_capacity(7);
        match self.render_cue_clips(&mut registered) {
            Ok(clips) => {
                if let Err(e) = self.output.start() {
                    for id in registered {
                        self.world.release_clip(id);
                    }
                    return Err(e);
                }
                let _ = self.event_sender.send(FoleyEvent::OutputStarted);
                self.clips = Some(clips);
                self.loaded = true;
                log::info!("Door cue preloaded: {} clips ready", registered.len());
                Ok(())
            }
            Err(e) => {
                for id in registered {
                    self.world.release_clip(id);
                }
                Err(e)
            }
        }
    }

    fn render_cue_clips(&self, registered: &mut Vec<ClipId>) -> Result<CueClips> {
        let rate = self.world.sample_rate();
        let mut register = |kind: EffectKind| -> Result<ClipId> {
            let clip = synth::render(kind, rate);
            let id = self.world.register_clip(Arc::new(clip))?;
            registered.push(id);
            Ok(id)
        };

        Ok(CueClips {
            ambient: register(EffectKind::Ambient)?,
            door_open: register(EffectKind::DoorOpen)?,
            door_close: register(EffectKind::DoorClose)?,
            footsteps: [
                register(EffectKind::Footstep { step: 1 })?,
                register(EffectKind::Footstep { step: 2 })?,
                register(EffectKind::Footstep { step: 3 })?,
                register(EffectKind::Footstep { step: 4 })?,
            ],
        })
    }

    /// Starts the door cue. Exactly one cue runs at a time.
    ///
    /// A call while a cue is in flight, or before a successful preload, is
    /// rejected rather than queued; the returned handle then reports
    /// `started() == false` and its `wait()` returns immediately.
    pub fn play_door_cue(&self) -> CueHandle {
        if !self.loaded {
            log::warn!("play_door_cue called before preload; ignoring");
            return CueHandle::not_started();
        }

        if self.in_flight.swap(true, Ordering::SeqCst) {
            log::debug!("Door cue already in flight; rejecting");
            return CueHandle::not_started();
        }

        let Some(clips) = self.clips else {
            self.in_flight.store(false, Ordering::SeqCst);
            return CueHandle::not_started();
        };

        // Resolve every step up front so the dispatch thread owns its data
        // and never touches the registry.
        let steps: Vec<(CueStep, ClipId, Arc<FoleyAudioData>)> = door_cue()
            .iter()
            .filter_map(|step| {
                let id = clips.clip_for(step.effect);
                self.world.clip(id).map(|data| (*step, id, data))
            })
            .collect();

        let commands = self.world.command_sender();
        let events = self.event_sender.clone();
        let clock = Arc::clone(&self.clock);
        let in_flight = Arc::clone(&self.in_flight);
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        // The cue's zero point is the moment of this call, not whenever the
        // dispatch thread gets scheduled.
        let start = clock.now();

        let spawned = std::thread::Builder::new()
            .name("foleykit-door-cue".into())
            .spawn(move || {
                let _ = events.send(FoleyEvent::CueStarted { at: start });

                for (step, id, data) in steps {
                    clock.sleep_until(start + step.offset);

                    let command = PlaybackCommand::Play {
                        clip: id,
                        data,
                        gain: step.gain,
                    };
                    if commands.send(command).is_err() {
                        // Audio side is gone. Keep walking the schedule so
                        // the cue still completes on time.
                        log::warn!(
                            "Dropping {} at {:?}: audio thread unavailable",
                            step.effect,
                            step.offset
                        );
                    }

                    let _ = events.send(FoleyEvent::ClipTriggered {
                        effect: step.effect,
                        offset: step.offset,
                        gain: step.gain,
                    });
                }

                clock.sleep_until(start + DOOR_CUE_TOTAL);
                let elapsed = clock.now() - start;
                in_flight.store(false, Ordering::SeqCst);
                let _ = events.send(FoleyEvent::CueCompleted { elapsed });
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(_) => CueHandle {
                started: true,
                completed: Some(done_rx),
            },
            Err(e) => {
                log::error!("Failed to spawn cue dispatch thread: {}", e);
                self.in_flight.store(false, Ordering::SeqCst);
                CueHandle::not_started()
            }
        }
    }

    /// Whether a successful preload has happened.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a cue is currently in flight.
    pub fn is_playing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Drains every event accumulated since the last poll.
    pub fn poll_events(&self) -> Vec<FoleyEvent> {
        self.event_receiver.try_iter().collect()
    }

    pub fn world(&self) -> &FoleyWorld {
        &self.world
    }

    /// The mixer shared with the audio thread. Callers embedding their own
    /// [`AudioOutput`] drive this from their output's fill callback.
    pub fn mixer(&self) -> &Arc<Mutex<FoleyMixer>> {
        &self.mixer
    }

    /// Stops all voices and shuts down the output stream.
    pub fn stop(&mut self) -> Result<()> {
        self.world.stop_all()?;
        if self.output.is_running() {
            self.output.stop()?;
            let _ = self.event_sender.send(FoleyEvent::OutputStopped);
        }
        Ok(())
    }
}

impl<O: AudioOutput> Drop for FoleySequencer<O> {
    fn drop(&mut self) {
        let _ = self.world.stop_all();
        if self.output.is_running() {
            let _ = self.output.stop();
            let _ = self.event_sender.send(FoleyEvent::OutputStopped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::FoleyError;

    struct NullOutput {
        running: bool,
    }

    impl NullOutput {
        fn new() -> Self {
            Self { running: false }
        }
    }

    impl AudioOutput for NullOutput {
        fn start(&mut self) -> Result<()> {
            self.running = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.running = false;
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    struct FailingOutput;

    impl AudioOutput for FailingOutput {
        fn start(&mut self) -> Result<()> {
            Err(FoleyError::AudioDevice("no output device".into()))
        }

        fn stop(&mut self) -> Result<()> {
            Ok(())
        }

        fn is_running(&self) -> bool {
            false
        }
    }

    fn sequencer_with_clock() -> (FoleySequencer<NullOutput>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let sequencer = FoleySequencer::with_output(
            FoleyWorldDesc::default(),
            NullOutput::new(),
            clock.clone(),
        )
        .unwrap();
        (sequencer, clock)
    }

    #[test]
    fn schedule_is_ordered_and_spans_the_cue() {
        let cue = door_cue();
        assert_eq!(cue.len(), 7);
        for pair in cue.windows(2) {
            assert!(pair[0].offset <= pair[1].offset);
        }
        assert!(cue.iter().all(|s| s.offset < DOOR_CUE_TOTAL));
        assert!(cue.iter().all(|s| s.gain > 0.0 && s.gain <= 1.0));
    }

    #[test]
    fn preload_renders_the_cue_and_starts_output() {
        let (mut sequencer, _clock) = sequencer_with_clock();
        assert!(!sequencer.is_loaded());

        sequencer.preload().unwrap();

        assert!(sequencer.is_loaded());
        assert_eq!(sequencer.world().clip_count(), 7);
        assert!(sequencer.poll_events().contains(&FoleyEvent::OutputStarted));
    }

    #[test]
    fn repeated_preload_does_not_accumulate_clips() {
        let (mut sequencer, _clock) = sequencer_with_clock();
        sequencer.preload().unwrap();
        let first_ids = sequencer.world().clip_ids();

        sequencer.preload().unwrap();

        assert_eq!(sequencer.world().clip_count(), 7);
        for id in first_ids {
            assert!(!sequencer.world().contains_clip(id));
        }
    }

    #[test]
    fn failed_preload_rolls_back_and_blocks_playback() {
        let clock = Arc::new(ManualClock::new());
        let mut sequencer =
            FoleySequencer::with_output(FoleyWorldDesc::default(), FailingOutput, clock).unwrap();

        let result = sequencer.preload();

        assert!(matches!(result, Err(FoleyError::AudioDevice(_))));
        assert!(!sequencer.is_loaded());
        assert_eq!(sequencer.world().clip_count(), 0);

        let handle = sequencer.play_door_cue();
        assert!(!handle.started());
        handle.wait(); // resolves immediately
        assert!(sequencer.poll_events().iter().all(|e| !e.is_cue_event()));
    }

    #[test]
    fn play_before_preload_is_rejected() {
        let (sequencer, _clock) = sequencer_with_clock();
        let handle = sequencer.play_door_cue();
        assert!(!handle.started());
        assert!(!sequencer.is_playing());
    }

    #[test]
    fn cue_dispatches_on_schedule_exactly_once() {
        let (mut sequencer, clock) = sequencer_with_clock();
        sequencer.preload().unwrap();
        sequencer.poll_events(); // discard OutputStarted

        let handle = sequencer.play_door_cue();
        assert!(handle.started());
        assert!(sequencer.is_playing());

        // A second call while in flight is rejected, never queued.
        let rejected = sequencer.play_door_cue();
        assert!(!rejected.started());
        rejected.wait();

        clock.advance_to(Duration::from_millis(2500));
        handle.wait();
        assert!(!sequencer.is_playing());

        let events = sequencer.poll_events();

        let started_count = events
            .iter()
            .filter(|e| matches!(e, FoleyEvent::CueStarted { .. }))
            .count();
        assert_eq!(started_count, 1);

        let triggered: Vec<(u64, EffectKind, f32)> = events
            .iter()
            .filter_map(|e| match e {
                FoleyEvent::ClipTriggered {
                    effect,
                    offset,
                    gain,
                } => Some((offset.as_millis() as u64, *effect, *gain)),
                _ => None,
            })
            .collect();
        assert_eq!(
            triggered,
            vec![
                (0, EffectKind::Ambient, 0.3),
                (0, EffectKind::DoorOpen, 0.8),
                (800, EffectKind::Footstep { step: 1 }, 0.6),
                (1200, EffectKind::Footstep { step: 2 }, 0.7),
                (1600, EffectKind::Footstep { step: 3 }, 0.6),
                (2000, EffectKind::Footstep { step: 4 }, 0.5),
                (2200, EffectKind::DoorClose, 0.6),
            ]
        );

        assert!(events.contains(&FoleyEvent::CueCompleted {
            elapsed: Duration::from_millis(2500)
        }));

        // All seven commands are waiting for the mixer; one pass picks them
        // all up and produces audible output.
        let mixer = Arc::clone(sequencer.mixer());
        let mut mixer = mixer.lock().unwrap();
        let mut buffer = vec![0.0f32; 1024];
        let result = mixer.mix(&mut buffer, 2);
        assert_eq!(result.frames_filled, 512);
        assert_eq!(mixer.voice_count(), 7);
        assert!(buffer.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn cue_can_replay_after_completion() {
        let (mut sequencer, clock) = sequencer_with_clock();
        sequencer.preload().unwrap();

        let first = sequencer.play_door_cue();
        assert!(first.started());
        clock.advance_to(Duration::from_millis(2500));
        first.wait();

        let second = sequencer.play_door_cue();
        assert!(second.started());
        assert!(sequencer.is_playing());
        clock.advance_to(Duration::from_millis(5000));
        second.wait();
        assert!(!sequencer.is_playing());
    }

    #[test]
    fn stop_shuts_down_the_output() {
        let (mut sequencer, _clock) = sequencer_with_clock();
        sequencer.preload().unwrap();
        sequencer.poll_events();

        sequencer.stop().unwrap();

        assert!(sequencer.poll_events().contains(&FoleyEvent::OutputStopped));
    }
}
