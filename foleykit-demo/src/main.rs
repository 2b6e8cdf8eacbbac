use std::fs;
use std::path::Path;

use anyhow::Result;
use foleykit_core::config::FoleyWorldDesc;
use foleykit_core::events::FoleyEvent;
use foleykit_core::sequencer::FoleySequencer;
use foleykit_core::synth::{self, EffectKind};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let export_only = args.iter().any(|arg| arg == "--export-only");

    let out_dir = Path::new("foley-out");
    export_wavs(out_dir)?;

    if export_only {
        return Ok(());
    }

    play_door_cue()
}

/// Renders every cue effect and writes it out as a standalone WAV file.
fn export_wavs(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    let desc = FoleyWorldDesc::default();

    for kind in cue_effects() {
        let clip = synth::render(kind, desc.sample_rate);
        let bytes = clip.to_wav_bytes()?;
        let path = out_dir.join(format!("{}.wav", kind));
        fs::write(&path, &bytes)?;
        log::info!(
            "Wrote {} ({} frames, {} bytes)",
            path.display(),
            clip.total_frames(),
            bytes.len()
        );
    }

    Ok(())
}

fn cue_effects() -> [EffectKind; 7] {
    [
        EffectKind::Ambient,
        EffectKind::DoorOpen,
        EffectKind::Footstep { step: 1 },
        EffectKind::Footstep { step: 2 },
        EffectKind::Footstep { step: 3 },
        EffectKind::Footstep { step: 4 },
        EffectKind::DoorClose,
    ]
}

fn play_door_cue() -> Result<()> {
    let mut sequencer = FoleySequencer::new(FoleyWorldDesc::default())?;

    if let Err(e) = sequencer.preload() {
        // Headless machines land here; the exported WAVs are still on disk.
        log::error!("Audio output unavailable, skipping playback: {}", e);
        return Ok(());
    }

    log::info!("Playing the door cue...");
    let handle = sequencer.play_door_cue();
    handle.wait();

    for event in sequencer.poll_events() {
        match event {
            FoleyEvent::ClipTriggered {
                effect,
                offset,
                gain,
            } => {
                log::info!("{:>5} ms  {} at gain {}", offset.as_millis(), effect, gain);
            }
            FoleyEvent::CueCompleted { elapsed } => {
                log::info!("Cue completed after {} ms", elapsed.as_millis());
            }
            _ => {}
        }
    }

    // The door-close tail rings past the cue span; let it finish.
    std::thread::sleep(std::time::Duration::from_millis(900));
    sequencer.stop()?;
    log::info!("Done");

    Ok(())
}
