//! Procedurally synthesized sound effects.
//!
//! Every effect is generated sample by sample through bevy's custom audio
//! source support, so the game ships without audio files.

use std::f32::consts::TAU;
use std::time::Duration;

use bevy::audio::{AddAudioSource, Decodable, PlaybackSettings, Source, Volume};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;
use crate::simulation::{LanderState, Touchdown};

pub const SAMPLE_RATE: u32 = 44_100;

const THRUSTER_GAIN: f32 = 0.15;
const THRUSTER_CENTER_HZ: f32 = 1000.0;

const EXPLOSION_SECS: f32 = 1.5;
const EXPLOSION_NOISE_SECS: f32 = 0.5;
const EXPLOSION_CUTOFF_HZ: f32 = 1000.0;

const LANDING_SECS: f32 = 1.0;
const LANDING_ATTACK_SECS: f32 = 0.1;
const LANDING_NOTES: [(f32, f32); 3] = [(0.0, 440.0), (0.2, 523.25), (0.4, 659.25)]; // A4, C5, E5

const FILTER_Q: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Thruster,
    Explosion,
    Landing,
}

impl SoundEffect {
    /// `None` for the looping thruster noise.
    pub fn duration(self) -> Option<Duration> {
        match self {
            SoundEffect::Thruster => None,
            SoundEffect::Explosion => Some(Duration::from_secs_f32(EXPLOSION_SECS)),
            SoundEffect::Landing => Some(Duration::from_secs_f32(LANDING_SECS)),
        }
    }

    fn sample_count(self) -> Option<usize> {
        let secs = match self {
            SoundEffect::Thruster => return None,
            SoundEffect::Explosion => EXPLOSION_SECS,
            SoundEffect::Landing => LANDING_SECS,
        };
        Some((secs * SAMPLE_RATE as f32).round() as usize)
    }
}

#[derive(Asset, TypePath, Debug, Clone, Copy)]
pub struct SynthSound {
    pub effect: SoundEffect,
    pub seed: u64, // noise generator seed
}

impl Decodable for SynthSound {
    type DecoderItem = f32;
    type Decoder = SynthDecoder;

    fn decoder(&self) -> Self::Decoder {
        SynthDecoder::new(self.effect, self.seed)
    }
}

/// Second-order IIR filter (RBJ cookbook coefficients, normalized by a0).
#[derive(Debug, Clone)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    fn new(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn lowpass(cutoff: f32, q: f32) -> Self {
        let w0 = TAU * cutoff / SAMPLE_RATE as f32;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        Self::new(
            (1.0 - cos) / 2.0,
            1.0 - cos,
            (1.0 - cos) / 2.0,
            1.0 + alpha,
            -2.0 * cos,
            1.0 - alpha,
        )
    }

    fn bandpass(center: f32, q: f32) -> Self {
        let w0 = TAU * center / SAMPLE_RATE as f32;
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        Self::new(alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Exponential glide from `from` to `to` over `duration`, holding `to` afterwards.
fn exp_ramp(from: f32, to: f32, t: f32, duration: f32) -> f32 {
    let progress = (t / duration).clamp(0.0, 1.0);
    from * (to / from).powf(progress)
}

fn sawtooth(phase: f32) -> f32 {
    2.0 * phase - 1.0
}

fn square(phase: f32) -> f32 {
    if phase < 0.5 {
        1.0
    } else {
        -1.0
    }
}

fn triangle(phase: f32) -> f32 {
    1.0 - 4.0 * (phase - 0.5).abs()
}

fn sine(phase: f32) -> f32 {
    (phase * TAU).sin()
}

pub struct SynthDecoder {
    effect: SoundEffect,
    index: usize,
    total: Option<usize>,
    noise: StdRng,
    filter: Biquad,
    phases: [f32; 2],
}

impl SynthDecoder {
    pub fn new(effect: SoundEffect, seed: u64) -> Self {
        let filter = match effect {
            SoundEffect::Thruster => Biquad::bandpass(THRUSTER_CENTER_HZ, FILTER_Q),
            _ => Biquad::lowpass(EXPLOSION_CUTOFF_HZ, FILTER_Q),
        };
        Self {
            effect,
            index: 0,
            total: effect.sample_count(),
            noise: StdRng::seed_from_u64(seed),
            filter,
            phases: [0.0; 2],
        }
    }

    // Advances oscillator `i` by one sample at `frequency` and returns its phase in [0, 1).
    fn advance_phase(&mut self, i: usize, frequency: f32) -> f32 {
        let phase = self.phases[i];
        self.phases[i] = (phase + frequency / SAMPLE_RATE as f32).fract();
        phase
    }

    fn white_noise(&mut self) -> f32 {
        self.noise.gen_range(-1.0..1.0)
    }

    fn thruster(&mut self) -> f32 {
        let noise = self.white_noise();
        self.filter.process(noise) * THRUSTER_GAIN
    }

    fn explosion(&mut self, t: f32) -> f32 {
        let saw = sawtooth(self.advance_phase(0, exp_ramp(110.0, 55.0, t, 0.4)));
        let sq = square(self.advance_phase(1, exp_ramp(60.0, 30.0, t, 0.3)));
        let rumble = if t < EXPLOSION_NOISE_SECS {
            let noise = self.white_noise();
            self.filter.process(noise)
        } else {
            self.filter.process(0.0)
        };
        let gain = exp_ramp(0.8, 0.01, t, EXPLOSION_SECS);
        (saw + sq + rumble) * gain
    }

    fn landing(&mut self, t: f32) -> f32 {
        let frequency = LANDING_NOTES
            .iter()
            .rev()
            .find(|(start, _)| t >= *start)
            .map_or(LANDING_NOTES[0].1, |(_, hz)| *hz);
        let melody = sine(self.advance_phase(0, frequency));
        let harmony = triangle(self.advance_phase(1, frequency / 2.0));
        let gain = if t < LANDING_ATTACK_SECS {
            exp_ramp(0.01, 0.5, t, LANDING_ATTACK_SECS)
        } else {
            exp_ramp(0.5, 0.01, t - LANDING_ATTACK_SECS, LANDING_SECS - LANDING_ATTACK_SECS)
        };
        (melody + harmony) * gain
    }
}

impl Iterator for SynthDecoder {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.total.is_some_and(|total| self.index >= total) {
            return None;
        }
        let t = self.index as f32 / SAMPLE_RATE as f32;
        let sample = match self.effect {
            SoundEffect::Thruster => self.thruster(),
            SoundEffect::Explosion => self.explosion(t),
            SoundEffect::Landing => self.landing(t),
        };
        self.index += 1;
        // Clip at the output stage
        Some(sample.clamp(-1.0, 1.0))
    }
}

impl Source for SynthDecoder {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        self.effect.duration()
    }
}

#[derive(Resource)]
pub struct SoundBank {
    thruster: Handle<SynthSound>,
    explosion: Handle<SynthSound>,
    landing: Handle<SynthSound>,
}

impl SoundBank {
    fn handle(&self, effect: SoundEffect) -> Handle<SynthSound> {
        match effect {
            SoundEffect::Thruster => self.thruster.clone(),
            SoundEffect::Explosion => self.explosion.clone(),
            SoundEffect::Landing => self.landing.clone(),
        }
    }
}

/// A playing sound. One-shots despawn themselves when they finish.
#[derive(Component)]
pub struct SfxVoice(pub SoundEffect);

pub struct SfxPlugin;

impl Plugin for SfxPlugin {
    fn build(&self, app: &mut App) {
        app.add_audio_source::<SynthSound>()
            .add_systems(Startup, setup_sound_bank);
    }
}

fn setup_sound_bank(mut commands: Commands, mut sounds: ResMut<Assets<SynthSound>>) {
    let mut add = |effect, seed| sounds.add(SynthSound { effect, seed });
    commands.insert_resource(SoundBank {
        thruster: add(SoundEffect::Thruster, 1),
        explosion: add(SoundEffect::Explosion, 2),
        landing: add(SoundEffect::Landing, 3),
    });
}

fn play(commands: &mut Commands, bank: &SoundBank, effect: SoundEffect, volume: f32) {
    commands.spawn((
        AudioPlayer(bank.handle(effect)),
        PlaybackSettings::DESPAWN.with_volume(Volume::new(volume)),
        SfxVoice(effect),
    ));
}

pub fn thruster_sound_system(
    mut commands: Commands,
    lander: Res<LanderState>,
    bank: Res<SoundBank>,
    config: Res<GameConfig>,
    voices: Query<(Entity, &SfxVoice)>,
) {
    let mut thruster_voices = voices
        .iter()
        .filter(|(_, voice)| voice.0 == SoundEffect::Thruster)
        .map(|(entity, _)| entity)
        .peekable();

    if lander.thruster_active {
        if thruster_voices.peek().is_none() {
            play(&mut commands, &bank, SoundEffect::Thruster, config.volume);
        }
    } else {
        for entity in thruster_voices {
            commands.entity(entity).despawn();
        }
    }
}

pub fn touchdown_sound_system(
    mut commands: Commands,
    mut touchdowns: EventReader<Touchdown>,
    bank: Res<SoundBank>,
    config: Res<GameConfig>,
    voices: Query<&SfxVoice>,
) {
    for touchdown in touchdowns.read() {
        let effect = if touchdown.is_safe() {
            SoundEffect::Landing
        } else {
            SoundEffect::Explosion
        };
        if voices.iter().any(|voice| voice.0 == effect) {
            continue;
        }
        play(&mut commands, &bank, effect, config.volume);
    }
}
