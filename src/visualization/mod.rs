mod camera;
mod components;
mod scene;

use bevy::prelude::*;

use crate::simulation::{FlightStatus, LanderState};
use crate::ui::GameState;

use camera::follow_camera_system;
use components::Lander;
use scene::spawn_scene;

// Re-export the types other modules need
pub use components::RoundSpecific;

/// Scene construction plus the per-frame sync of lander and camera.
pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .add_systems(OnExit(GameState::Loading), spawn_scene)
            .add_systems(
                Update,
                (sync_lander_system, follow_camera_system)
                    .chain()
                    .run_if(not(in_state(GameState::Loading))),
            );
    }
}

/// Transform of the lander model for the given state.
pub fn lander_transform(state: &LanderState) -> Transform {
    Transform::from_translation(state.position.extend(0.0))
        .with_rotation(Quat::from_rotation_z(state.rotation))
}

pub fn sync_lander_system(
    state: Res<LanderState>,
    mut landers: Query<(&mut Transform, &mut Visibility), With<Lander>>,
) {
    for (mut transform, mut visibility) in &mut landers {
        *transform = lander_transform(&state);
        *visibility = match state.status {
            FlightStatus::Crashed => Visibility::Hidden,
            _ => Visibility::Inherited,
        };
    }
}
