use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};

use crate::config::FoleyWorldDesc;
use crate::error::{FoleyError, Result};

/// Callback function type for filling audio samples
///
/// The callback receives:
/// - `buffer`: mutable slice to fill with audio samples
/// - `sample_rate`: target sample rate for the samples
/// - `channels`: number of audio channels
///
/// Returns the number of frames actually filled (frames = samples / channels)
pub type AudioFillCallback = dyn Fn(&mut [f32], u32, u16) -> usize + Send + Sync;

/// Minimal control surface for an audio backend.
///
/// [`FoleyEngine`] is the cpal-backed implementation; tests substitute their
/// own to drive the sequencer without a real device. Implementations are not
/// required to be `Send` because cpal streams stay pinned to the thread that
/// built them.
pub trait AudioOutput {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn is_running(&self) -> bool;
}

/// Audio engine that manages the real-time output stream.
pub struct FoleyEngine {
    desc: FoleyWorldDesc,
    stream: Option<cpal::Stream>,
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
    fill_callback: Option<Arc<AudioFillCallback>>,
}

impl FoleyEngine {
    /// Create a new audio engine with the given configuration
    pub fn new(desc: FoleyWorldDesc) -> Result<Self> {
        Ok(Self {
            desc,
            stream: None,
            is_running: Arc::new(AtomicBool::new(false)),
            frames_processed: Arc::new(AtomicUsize::new(0)),
            fill_callback: None,
        })
    }

    /// Set the callback function that will be called to fill audio buffers
    pub fn set_fill_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut [f32], u32, u16) -> usize + Send + Sync + 'static,
    {
        self.fill_callback = Some(Arc::new(callback));
    }

    /// Start the audio engine with the configured callback.
    ///
    /// The configuration and callback are checked before any device is
    /// probed, so misconfiguration fails fast even on machines without an
    /// output device.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running.load(Ordering::Relaxed) {
            return Ok(());
        }

        self.desc.validate()?;

        let fill_callback = self
            .fill_callback
            .clone()
            .ok_or_else(|| FoleyError::Engine("No fill callback set".into()))?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| FoleyError::AudioDevice("No default output device available".into()))?;

        // Configure the stream with the world's sample rate and settings
        let config = cpal::StreamConfig {
            channels: self.desc.channels,
            sample_rate: cpal::SampleRate(self.desc.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.desc.block_size as u32),
        };

        let is_running = self.is_running.clone();
        let frames_processed = self.frames_processed.clone();
        let sample_rate = self.desc.sample_rate;
        let channels = self.desc.channels;

        // Create the stream based on the device's default format
        let default_config = device.default_output_config().map_err(|e| {
            FoleyError::AudioDevice(format!("Failed to get default config: {}", e))
        })?;

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => self.create_stream::<f32>(
                &device,
                &config,
                fill_callback,
                is_running,
                frames_processed,
                sample_rate,
                channels,
            )?,
            cpal::SampleFormat::I16 => self.create_stream::<i16>(
                &device,
                &config,
                fill_callback,
                is_running,
                frames_processed,
                sample_rate,
                channels,
            )?,
            cpal::SampleFormat::U16 => self.create_stream::<u16>(
                &device,
                &config,
                fill_callback,
                is_running,
                frames_processed,
                sample_rate,
                channels,
            )?,
            _ => {
                return Err(FoleyError::AudioFormat("Unsupported sample format".into()));
            }
        };

        stream
            .play()
            .map_err(|e| FoleyError::AudioDevice(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        self.is_running.store(true, Ordering::Relaxed);
        log::info!(
            "Audio output started: {} Hz, {} channels",
            sample_rate,
            channels
        );

        Ok(())
    }

    /// Stop the audio engine
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            self.is_running.store(false, Ordering::Relaxed);
            drop(stream); // This stops the stream
        }
        Ok(())
    }

    /// Check if the engine is currently running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Get the number of audio frames processed since start
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    /// Get the engine configuration
    pub fn desc(&self) -> &FoleyWorldDesc {
        &self.desc
    }

    /// Create a typed audio stream
    fn create_stream<T>(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        fill_callback: Arc<AudioFillCallback>,
        is_running: Arc<AtomicBool>,
        frames_processed: Arc<AtomicUsize>,
        sample_rate: u32,
        channels: u16,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        // Fill with silence if not running
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    // Mix into a temporary f32 buffer, then convert out
                    let mut temp_buffer = vec![0.0f32; data.len()];
                    let frames_filled = fill_callback(&mut temp_buffer, sample_rate, channels);

                    for (sample, value) in data.iter_mut().zip(temp_buffer.iter()) {
                        *sample = T::from_sample(*value);
                    }

                    frames_processed.fetch_add(frames_filled, Ordering::Relaxed);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| FoleyError::AudioDevice(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }
}

impl AudioOutput for FoleyEngine {
    fn start(&mut self) -> Result<()> {
        FoleyEngine::start(self)
    }

    fn stop(&mut self) -> Result<()> {
        FoleyEngine::stop(self)
    }

    fn is_running(&self) -> bool {
        FoleyEngine::is_running(self)
    }
}

impl Drop for FoleyEngine {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
