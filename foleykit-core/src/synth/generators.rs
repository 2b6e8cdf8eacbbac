//! Sample math for each effect family.
//!
//! Generators return raw partial sums without clamping; quantization in
//! [`crate::wav`] applies the only clamp, so transient peaks above unity
//! survive mixing at reduced gain.

use std::f32::consts::TAU;

use rand::Rng;

use super::EffectKind;

/// One exponentially decaying sine partial.
fn decaying_sine(t: f32, freq: f32, decay: f32, gain: f32) -> f32 {
    (TAU * freq * t).sin() * (-decay * t).exp() * gain
}

/// Uniform noise in [-0.5, 0.5] shaped by `envelope` and `gain`.
fn shaped_noise<R: Rng>(rng: &mut R, envelope: f32, gain: f32) -> f32 {
    rng.gen_range(-0.5f32..=0.5) * envelope * gain
}

pub(super) fn door_open<R: Rng>(sample_rate: u32, rng: &mut R) -> Vec<f32> {
    let count = EffectKind::DoorOpen.sample_count(sample_rate);
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f32 / sample_rate as f32;
        // Slow hinge creak with a brighter squeak riding on top.
        let mut s = decaying_sine(t, 82.0, 1.6, 0.40);
        s += decaying_sine(t, 540.0, 3.5, 0.22);
        s += decaying_sine(t, 1080.0, 5.0, 0.08);
        // Latch click up front, then faint air movement for the rest.
        s += shaped_noise(rng, (-28.0 * t).exp(), 0.5);
        s += shaped_noise(rng, (-1.2 * t).exp(), 0.06);
        samples.push(s);
    }
    samples
}

pub(super) fn door_close<R: Rng>(sample_rate: u32, rng: &mut R) -> Vec<f32> {
    let count = EffectKind::DoorClose.sample_count(sample_rate);
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f32 / sample_rate as f32;
        // Heavy slab thud plus a tighter knock and its overtone.
        let mut s = decaying_sine(t, 64.0, 7.0, 0.75);
        s += decaying_sine(t, 150.0, 9.0, 0.40);
        s += decaying_sine(t, 300.0, 12.0, 0.18);
        // Latch engages 50 ms after impact.
        if t >= 0.05 {
            s += shaped_noise(rng, (-32.0 * (t - 0.05)).exp(), 0.45);
        }
        // Short slapback of the thud off the frame.
        if t >= 0.18 {
            s += decaying_sine(t - 0.18, 64.0, 9.0, 0.22);
        }
        samples.push(s);
    }
    samples
}

pub(super) fn footstep<R: Rng>(sample_rate: u32, step: u32, rng: &mut R) -> Vec<f32> {
    let count = EffectKind::Footstep { step }.sample_count(sample_rate);
    // Feet alternate: even steps land a quarter brighter than odd ones.
    let pitch = if step % 2 == 0 { 1.25 } else { 1.0 };
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f32 / sample_rate as f32;
        let mut s = decaying_sine(t, 72.0 * pitch, 26.0, 0.85);
        s += decaying_sine(t, 190.0 * pitch, 34.0, 0.30);
        // Heel strike, then the sole scuffing out.
        s += shaped_noise(rng, (-70.0 * t).exp(), 0.55);
        s += shaped_noise(rng, (-16.0 * t).exp(), 0.12);
        samples.push(s);
    }
    samples
}

pub(super) fn ambient<R: Rng>(sample_rate: u32, rng: &mut R) -> Vec<f32> {
    let duration = EffectKind::Ambient.duration_secs();
    let count = EffectKind::Ambient.sample_count(sample_rate);
    let mut samples = Vec::with_capacity(count);
    for i in 0..count {
        let t = i as f32 / sample_rate as f32;
        // 400 ms attack, 500 ms release, so the bed never pops at the edges.
        let env = (t / 0.4).min(1.0) * ((duration - t) / 0.5).clamp(0.0, 1.0);
        let mut s = (TAU * 50.0 * t).sin() * 0.10;
        s += (TAU * 100.0 * t).sin() * 0.05;
        s += (TAU * 150.0 * t).sin() * 0.02;
        s *= env;
        s += shaped_noise(rng, env, 0.035);
        samples.push(s);
    }
    samples
}
