use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::config::GameRng;
use crate::constants::{MAX_FRAME_DT, NOZZLE_OFFSET};
use crate::simulation::{LanderState, Touchdown};
use crate::visualization::RoundSpecific;

// Constants for particle system
const PARTICLE_RADIUS: f32 = 0.5;
const PARTICLE_DRAG: f32 = 0.95; // Velocity multiplier per update
const MIN_SCALE: f32 = 0.5; // Scale reached at the end of a particle's life

const EXHAUST_PARTICLES_PER_SPAWN: usize = 3;
const EXHAUST_SPAWN_INTERVAL: f32 = 1.0 / 60.0;
const EXHAUST_SPREAD: f32 = 0.25;
const EXHAUST_SPEED: f32 = 2.0;
const EXHAUST_OPACITY: f32 = 0.8;
const EXHAUST_LIFETIME_MIN: f32 = 0.5;
const EXHAUST_LIFETIME_MAX: f32 = 1.0;

const EXPLOSION_PARTICLE_COUNT: usize = 100;
const EXPLOSION_SPEED: f32 = 3.0;
const EXPLOSION_LIFETIME_MIN: f32 = 2.0;
const EXPLOSION_LIFETIME_MAX: f32 = 4.0;

const FLAME_ORANGE: Color = Color::srgb(1.0, 0.333, 0.0); // #FF5500
const FLAME_AMBER: Color = Color::srgb(1.0, 0.667, 0.0); // #FFAA00

#[derive(Component, Debug)]
pub struct Particle {
    velocity: Vec3,
    lifetime: Timer,
}

impl Particle {
    pub fn new(velocity: Vec3, lifetime_secs: f32) -> Self {
        Self {
            velocity,
            lifetime: Timer::from_seconds(lifetime_secs, TimerMode::Once),
        }
    }

    /// Ages the particle and returns how far it moved, or `None` once expired.
    pub fn advance(&mut self, delta: Duration) -> Option<Vec3> {
        self.lifetime.tick(delta);
        if self.lifetime.finished() {
            return None;
        }
        let displacement = self.velocity * delta.as_secs_f32();
        self.velocity *= PARTICLE_DRAG;
        Some(displacement)
    }

    /// Fraction of the lifetime used up, 0.0 to 1.0.
    pub fn progress(&self) -> f32 {
        self.lifetime.fraction()
    }

    pub fn opacity(&self) -> f32 {
        1.0 - self.progress()
    }

    pub fn scale(&self) -> f32 {
        1.0 - self.progress() * (1.0 - MIN_SCALE)
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

#[derive(Resource)]
pub struct ParticleSpawnTimer(pub Timer);

impl Default for ParticleSpawnTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            EXHAUST_SPAWN_INTERVAL,
            TimerMode::Repeating,
        ))
    }
}

#[derive(Resource)]
pub struct ParticleMesh(pub Handle<Mesh>);

pub fn particle_mesh() -> Mesh {
    Sphere::new(PARTICLE_RADIUS).mesh().uv(8, 8)
}

fn flame_color(rng: &mut impl Rng) -> Color {
    if rng.gen_bool(0.5) {
        FLAME_AMBER
    } else {
        FLAME_ORANGE
    }
}

/// World position of the exhaust plume origin, below the lander in its own frame.
pub fn nozzle_position(state: &LanderState) -> Vec3 {
    let rotation = Quat::from_rotation_z(state.rotation);
    state.position.extend(0.0) + rotation * Vec3::new(0.0, -NOZZLE_OFFSET, 0.0)
}

pub fn exhaust_particle(rng: &mut impl Rng, state: &LanderState) -> Particle {
    let down = Quat::from_rotation_z(state.rotation) * Vec3::NEG_Y;
    let velocity = Vec3::new(
        down.x + rng.gen_range(-EXHAUST_SPREAD..EXHAUST_SPREAD),
        down.y,
        down.z + rng.gen_range(-EXHAUST_SPREAD..EXHAUST_SPREAD),
    ) * EXHAUST_SPEED;
    Particle::new(
        velocity,
        rng.gen_range(EXHAUST_LIFETIME_MIN..EXHAUST_LIFETIME_MAX),
    )
}

pub fn explosion_particle(rng: &mut impl Rng) -> Particle {
    let velocity = Vec3::new(
        rng.gen_range(-0.5..0.5) * EXPLOSION_SPEED,
        rng.gen_range(0.0..1.0) * EXPLOSION_SPEED,
        rng.gen_range(-0.5..0.5) * EXPLOSION_SPEED,
    );
    Particle::new(
        velocity,
        rng.gen_range(EXPLOSION_LIFETIME_MIN..EXPLOSION_LIFETIME_MAX),
    )
}

fn spawn_particle(
    commands: &mut Commands,
    mesh: &ParticleMesh,
    materials: &mut Assets<StandardMaterial>,
    position: Vec3,
    particle: Particle,
    color: Color,
) {
    commands.spawn((
        Mesh3d(mesh.0.clone()),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: color,
            emissive: color.to_linear(),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        })),
        Transform::from_translation(position),
        particle,
        RoundSpecific,
    ));
}

// Make something Rico would appreciate
pub fn kaboom(
    commands: &mut Commands,
    mesh: &ParticleMesh,
    materials: &mut Assets<StandardMaterial>,
    rng: &mut impl Rng,
    origin: Vec3,
) {
    for _ in 0..EXPLOSION_PARTICLE_COUNT {
        let particle = explosion_particle(rng);
        let color = flame_color(rng);
        spawn_particle(commands, mesh, materials, origin, particle, color);
    }
}

pub fn exhaust_system(
    mut commands: Commands,
    time: Res<Time>,
    mut timer: ResMut<ParticleSpawnTimer>,
    lander_state: Res<LanderState>,
    mesh: Res<ParticleMesh>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<GameRng>,
) {
    if !lander_state.thruster_active {
        return;
    }

    timer.0.tick(time.delta());
    if !timer.0.just_finished() {
        return;
    }

    let origin = nozzle_position(&lander_state);
    for _ in 0..EXHAUST_PARTICLES_PER_SPAWN {
        let particle = exhaust_particle(&mut rng.0, &lander_state);
        let color = flame_color(&mut rng.0).with_alpha(EXHAUST_OPACITY);
        spawn_particle(
            &mut commands,
            &mesh,
            &mut materials,
            origin,
            particle,
            color,
        );
    }
}

pub fn explosion_system(
    mut commands: Commands,
    mut touchdowns: EventReader<Touchdown>,
    mesh: Res<ParticleMesh>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<GameRng>,
) {
    for touchdown in touchdowns.read() {
        if !touchdown.is_safe() {
            kaboom(
                &mut commands,
                &mesh,
                &mut materials,
                &mut rng.0,
                touchdown.position.extend(0.0),
            );
        }
    }
}

pub fn particle_system(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(
        Entity,
        &mut Transform,
        &mut Particle,
        &MeshMaterial3d<StandardMaterial>,
    )>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let delta = Duration::from_secs_f32(time.delta_secs().min(MAX_FRAME_DT));

    for (entity, mut transform, mut particle, material) in &mut particles {
        let Some(displacement) = particle.advance(delta) else {
            commands.entity(entity).despawn();
            continue;
        };

        transform.translation += displacement;
        transform.scale = Vec3::splat(particle.scale());
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color.set_alpha(particle.opacity());
        }
    }
}
