use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::config::GameRng;
use crate::constants::{
    MAX_FRAME_DT, MAX_FUEL, TANK_PICKUP_RADIUS, TANK_REFUEL_AMOUNT, TANK_RESPAWN_DELAY, TANK_SPAWN_HALF_WIDTH,
    TANK_SPAWN_MAX_Y, TANK_SPAWN_MIN_Y,
};
use crate::simulation::{simulation_system, LanderState};
use crate::ui::GameState;
use crate::visualization::RoundSpecific;

/// Tank pickup and respawning, active only while the lander is in play.
pub struct FuelPlugin;

impl Plugin for FuelPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FuelCollected>()
            .init_resource::<TankRespawns>()
            .add_systems(
                Update,
                (fuel_pickup_system, tank_respawn_system)
                    .chain()
                    .after(simulation_system)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

#[derive(Component)]
pub struct FuelTank;

#[derive(Resource)]
pub struct TankAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct FuelCollected {
    pub position: Vec2,
    pub fuel: f32, // after refuelling
}

/// Tanks waiting to reappear after being collected.
#[derive(Resource, Default)]
pub struct TankRespawns {
    pending: Vec<Timer>,
}

impl TankRespawns {
    pub fn schedule(&mut self) {
        self.pending
            .push(Timer::from_seconds(TANK_RESPAWN_DELAY, TimerMode::Once));
    }

    /// Advances every pending respawn and returns how many came due.
    pub fn tick(&mut self, delta: Duration) -> usize {
        for timer in &mut self.pending {
            timer.tick(delta);
        }
        let before = self.pending.len();
        self.pending.retain(|timer| !timer.finished());
        before - self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

pub fn within_pickup_range(lander: Vec2, tank: Vec2) -> bool {
    lander.distance(tank) < TANK_PICKUP_RADIUS
}

pub fn refuel(fuel: f32) -> f32 {
    (fuel + TANK_REFUEL_AMOUNT).min(MAX_FUEL)
}

pub fn random_tank_position(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen_range(-TANK_SPAWN_HALF_WIDTH..TANK_SPAWN_HALF_WIDTH),
        rng.gen_range(TANK_SPAWN_MIN_Y..TANK_SPAWN_MAX_Y),
    )
}

pub fn spawn_tank(commands: &mut Commands, assets: &TankAssets, position: Vec2) {
    commands.spawn((
        Mesh3d(assets.mesh.clone()),
        MeshMaterial3d(assets.material.clone()),
        Transform::from_xyz(position.x, position.y, 0.0)
            .with_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
        FuelTank,
        RoundSpecific,
    ));
}

pub fn spawn_tanks(
    commands: &mut Commands,
    assets: &TankAssets,
    rng: &mut impl Rng,
    count: usize,
) {
    for _ in 0..count {
        spawn_tank(commands, assets, random_tank_position(rng));
    }
}

pub fn fuel_pickup_system(
    mut commands: Commands,
    mut lander: ResMut<LanderState>,
    tanks: Query<(Entity, &Transform), With<FuelTank>>,
    mut respawns: ResMut<TankRespawns>,
    mut collected: EventWriter<FuelCollected>,
) {
    if !lander.is_flying() {
        return;
    }

    for (entity, transform) in &tanks {
        let position = transform.translation.truncate();
        if within_pickup_range(lander.position, position) {
            lander.fuel = refuel(lander.fuel);
            commands.entity(entity).despawn();
            respawns.schedule();
            collected.send(FuelCollected {
                position,
                fuel: lander.fuel,
            });
        }
    }
}

pub fn tank_respawn_system(
    mut commands: Commands,
    time: Res<Time>,
    mut respawns: ResMut<TankRespawns>,
    assets: Res<TankAssets>,
    mut rng: ResMut<GameRng>,
) {
    let delta = time.delta().min(Duration::from_secs_f32(MAX_FRAME_DT));
    for _ in 0..respawns.tick(delta) {
        let position = random_tank_position(&mut rng.0);
        debug!("Respawning tank at {position}");
        spawn_tank(&mut commands, &assets, position);
    }
}
