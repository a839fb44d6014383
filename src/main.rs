use bevy::prelude::*;
use bevy_egui::EguiPlugin;

mod audio;
mod config;
mod constants;
mod fuel;
mod particles;
mod simulation;
mod terrain;
mod ui;
mod visualization;

use audio::{thruster_sound_system, touchdown_sound_system, SfxPlugin, SfxVoice};
use config::{ConfigPlugin, GameConfig, GameRng};
use fuel::{spawn_tanks, FuelCollected, FuelPlugin, TankAssets, TankRespawns};
use particles::{exhaust_system, explosion_system, particle_system, ParticleSpawnTimer};
use simulation::{read_pilot_input, simulation_system, LanderState, PilotInput, Touchdown};
use ui::{briefing_system, game_over_system, hud_system, scene_active, GameState};
use visualization::{RoundSpecific, VisualizationPlugin};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Lunar Lander".into(),
                resolution: (1280., 720.).into(),
                canvas: Some("#lander-canvas".into()),
                fit_canvas_to_parent: true,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .init_state::<GameState>()
        .add_plugins((ConfigPlugin, SfxPlugin, VisualizationPlugin, FuelPlugin))
        .add_event::<Touchdown>()
        .insert_resource(LanderState::default())
        .init_resource::<PilotInput>()
        .init_resource::<ParticleSpawnTimer>()
        .add_systems(
            OnTransition {
                exited: GameState::GameOver,
                entered: GameState::Playing,
            },
            reset_round,
        )
        .add_systems(
            Update,
            (read_pilot_input, simulation_system)
                .chain()
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            (
                exhaust_system,
                explosion_system,
                particle_system,
                thruster_sound_system,
                touchdown_sound_system,
                report_fuel_pickups,
            )
                .after(simulation_system)
                .run_if(scene_active),
        )
        .add_systems(
            Update,
            (
                briefing_system.run_if(in_state(GameState::Briefing)),
                hud_system.run_if(scene_active),
                game_over_system.run_if(in_state(GameState::GameOver)),
            ),
        )
        .run();
}

// Puts everything back the way a fresh round starts: lander at the top,
// full tank set, no debris and no engine noise.
fn reset_round(
    mut commands: Commands,
    leftovers: Query<Entity, Or<(With<RoundSpecific>, With<SfxVoice>)>>,
    mut lander_state: ResMut<LanderState>,
    mut respawns: ResMut<TankRespawns>,
    tank_assets: Res<TankAssets>,
    config: Res<GameConfig>,
    mut rng: ResMut<GameRng>,
) {
    for entity in &leftovers {
        commands.entity(entity).despawn_recursive();
    }
    respawns.clear();
    lander_state.reset();
    spawn_tanks(
        &mut commands,
        &tank_assets,
        &mut rng.0,
        config.fuel_tank_count,
    );
    info!("Round restarted");
}

fn report_fuel_pickups(mut collected: EventReader<FuelCollected>) {
    for pickup in collected.read() {
        info!(
            "Fuel tank collected at {}, fuel now {:.0}%",
            pickup.position, pickup.fuel
        );
    }
}
