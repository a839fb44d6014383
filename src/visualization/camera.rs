use bevy::prelude::*;

use super::components::MainCamera;
use crate::simulation::LanderState;

const CAMERA_HEIGHT_ABOVE_LANDER: f32 = 50.0;
const CAMERA_DISTANCE: f32 = 100.0;
const CAMERA_PAN_FACTOR: f32 = 0.5; // Camera follows half of the lander's horizontal travel
const CAMERA_FOV: f32 = 75.0; // degrees, vertical

/// Chase-camera pose for a lander at `target`: above and in front of it,
/// always looking at it.
pub fn camera_rig(target: Vec2) -> Transform {
    Transform::from_xyz(
        target.x * CAMERA_PAN_FACTOR,
        target.y + CAMERA_HEIGHT_ABOVE_LANDER,
        CAMERA_DISTANCE,
    )
    .looking_at(target.extend(0.0), Vec3::Y)
}

pub fn spawn_camera(commands: &mut Commands, lander: &LanderState) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        camera_rig(lander.position),
        MainCamera,
    ));
}

pub fn follow_camera_system(
    lander: Res<LanderState>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    if let Ok(mut transform) = cameras.get_single_mut() {
        *transform = camera_rig(lander.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_sits_above_and_in_front() {
        let rig = camera_rig(Vec2::new(40.0, 120.0));
        assert_eq!(rig.translation, Vec3::new(20.0, 170.0, CAMERA_DISTANCE));
    }

    #[test]
    fn rig_looks_at_the_lander() {
        let target = Vec2::new(-60.0, 30.0);
        let rig = camera_rig(target);
        let to_target = (target.extend(0.0) - rig.translation).normalize();
        assert!(rig.forward().dot(to_target) > 0.9999);
    }
}
