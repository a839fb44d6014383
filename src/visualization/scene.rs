use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::asset::RenderAssetUsages;
use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use rand::Rng;

use super::camera::spawn_camera;
use super::components::Lander;
use crate::config::{GameConfig, GameRng};
use crate::constants::{LANDER_FOOT_CLEARANCE, PAD_HALF_WIDTH, TERRAIN_DEPTH};
use crate::fuel::{spawn_tanks, TankAssets};
use crate::particles::{particle_mesh, ParticleMesh};
use crate::simulation::LanderState;
use crate::terrain::{LandingPad, TerrainProfile};

const TERRAIN_BASE: f32 = -40.0; // Bottom edge of the terrain's front wall
const PAD_THICKNESS: f32 = 1.0; // Top face sits flush with the ground at y = 0
const STAR_RADIUS: f32 = 0.5;
const STAR_SHELL_MIN: f32 = 450.0;
const STAR_SHELL_MAX: f32 = 500.0;

// Lander geometry, in world units relative to its center
const BODY_RADIUS: f32 = 3.0;
const BODY_LENGTH: f32 = 2.0;
const LEG_RADIUS: f32 = 0.3;
const HIP_RADIUS: f32 = 2.5;
const HIP_HEIGHT: f32 = -2.0;
const FOOT_RADIUS: f32 = 0.5;
const FOOT_SPREAD: f32 = 4.5;
const NOZZLE_RADIUS: f32 = 1.5;
const NOZZLE_HEIGHT: f32 = 2.0;

/// Top surface and front wall of the terrain, extruded along z.
pub fn terrain_mesh(profile: &TerrainProfile) -> Mesh {
    let half_depth = TERRAIN_DEPTH / 2.0;
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    let mut push_quad = |corners: [Vec3; 4], normal: Vec3| {
        let base = positions.len() as u32;
        for (corner, uv) in corners.iter().zip([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]) {
            positions.push(corner.to_array());
            normals.push(normal.to_array());
            uvs.push(uv);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    };

    for segment in profile.points().windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let edge = b - a;
        let up = Vec3::new(-edge.y, edge.x, 0.0).normalize();

        push_quad(
            [
                Vec3::new(a.x, a.y, half_depth),
                Vec3::new(b.x, b.y, half_depth),
                Vec3::new(b.x, b.y, -half_depth),
                Vec3::new(a.x, a.y, -half_depth),
            ],
            up,
        );
        push_quad(
            [
                Vec3::new(a.x, TERRAIN_BASE, half_depth),
                Vec3::new(b.x, TERRAIN_BASE, half_depth),
                Vec3::new(b.x, b.y, half_depth),
                Vec3::new(a.x, a.y, half_depth),
            ],
            Vec3::Z,
        );
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Random point on the star shell surrounding the arena.
pub fn star_position(rng: &mut impl Rng) -> Vec3 {
    let phi = rng.gen_range(0.0..TAU);
    let theta = rng.gen_range(0.0..PI);
    let radius = rng.gen_range(STAR_SHELL_MIN..STAR_SHELL_MAX);
    Vec3::new(
        radius * theta.sin() * phi.cos(),
        radius * theta.sin() * phi.sin(),
        radius * theta.cos(),
    )
}

fn pad_transform(pad: &LandingPad) -> Transform {
    Transform::from_xyz(pad.center_x, -PAD_THICKNESS / 2.0, 0.0)
}

/// Leg running from the hip on the body to a foot on the ground plane.
fn leg_transform(angle: f32) -> (Transform, f32) {
    let (sin, cos) = angle.sin_cos();
    let hip = Vec3::new(cos * HIP_RADIUS, HIP_HEIGHT, sin * HIP_RADIUS);
    let foot = foot_position(angle);
    let transform = Transform::from_translation((hip + foot) / 2.0)
        .with_rotation(Quat::from_rotation_arc(Vec3::Y, (hip - foot).normalize()));
    (transform, hip.distance(foot))
}

fn foot_position(angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(
        cos * FOOT_SPREAD,
        -LANDER_FOOT_CLEARANCE + FOOT_RADIUS,
        sin * FOOT_SPREAD,
    )
}

fn spawn_lander(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    state: &LanderState,
) {
    let hull = materials.add(StandardMaterial {
        base_color: Color::srgb(0.8, 0.8, 0.8),
        perceptual_roughness: 0.4,
        metallic: 0.8,
        ..default()
    });
    let strut = materials.add(StandardMaterial {
        base_color: Color::srgb(0.53, 0.53, 0.53),
        perceptual_roughness: 0.5,
        metallic: 0.7,
        ..default()
    });
    let engine = materials.add(StandardMaterial {
        base_color: Color::srgb(0.33, 0.33, 0.33),
        perceptual_roughness: 0.3,
        metallic: 0.9,
        ..default()
    });
    let foot_mesh = meshes.add(Sphere::new(FOOT_RADIUS).mesh().uv(8, 8));

    commands
        .spawn((
            Mesh3d(meshes.add(Capsule3d::new(BODY_RADIUS, BODY_LENGTH))),
            MeshMaterial3d(hull),
            Transform::from_translation(state.position.extend(0.0)),
            Visibility::default(),
            Lander,
        ))
        .with_children(|parent| {
            for i in 0..4 {
                let angle = i as f32 * FRAC_PI_2;
                let (transform, length) = leg_transform(angle);
                parent.spawn((
                    Mesh3d(meshes.add(Cylinder::new(LEG_RADIUS, length))),
                    MeshMaterial3d(strut.clone()),
                    transform,
                ));
                parent.spawn((
                    Mesh3d(foot_mesh.clone()),
                    MeshMaterial3d(strut.clone()),
                    Transform::from_translation(foot_position(angle)),
                ));
            }

            // Cone tip points up by default; flip it so the bell opens downward
            parent.spawn((
                Mesh3d(meshes.add(Cone {
                    radius: NOZZLE_RADIUS,
                    height: NOZZLE_HEIGHT,
                })),
                MeshMaterial3d(engine),
                Transform::from_xyz(0.0, -(BODY_RADIUS + BODY_LENGTH / 2.0), 0.0)
                    .with_rotation(Quat::from_rotation_x(PI)),
            ));
        });
}

fn spawn_stars(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    rng: &mut impl Rng,
    count: usize,
) {
    let mesh = meshes.add(Sphere::new(STAR_RADIUS).mesh().uv(8, 8));
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        emissive: LinearRgba::WHITE,
        unlit: true,
        ..default()
    });
    for _ in 0..count {
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(star_position(rng)),
            NotShadowCaster,
        ));
    }
}

/// Builds the whole scene once the config is known: terrain and pad, lander,
/// fuel tanks, sky and lights.
pub fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<GameRng>,
    config: Res<GameConfig>,
    lander: Res<LanderState>,
) {
    let rng = &mut rng.0;
    let pad = LandingPad::place(rng, config.pad_placement);
    let terrain = TerrainProfile::generate(rng, pad.center_x);
    info!(
        "Generated terrain with landing pad at x={:.1} ({:?} bounds)",
        pad.center_x, config.bounds
    );

    commands.insert_resource(AmbientLight {
        color: Color::srgb_u8(0x33, 0x33, 0x33),
        brightness: 400.0,
    });
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(50.0, 200.0, 100.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    spawn_stars(
        &mut commands,
        &mut meshes,
        &mut materials,
        rng,
        config.star_count,
    );

    commands.spawn((
        Mesh3d(meshes.add(terrain_mesh(&terrain))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.53, 0.53, 0.53),
            perceptual_roughness: 1.0,
            metallic: 0.2,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::default(),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(
            PAD_HALF_WIDTH * 2.0,
            PAD_THICKNESS,
            PAD_HALF_WIDTH * 2.0,
        ))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.27, 0.27, 0.27),
            emissive: Color::srgb(0.13, 0.13, 0.13).to_linear(),
            perceptual_roughness: 0.8,
            metallic: 0.5,
            ..default()
        })),
        pad_transform(&pad),
    ));

    spawn_lander(&mut commands, &mut meshes, &mut materials, &lander);
    spawn_camera(&mut commands, &lander);

    let tank_assets = TankAssets {
        mesh: meshes.add(Cylinder::new(2.0, 5.0)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.0, 0.0),
            emissive: Color::srgb(0.2, 0.0, 0.0).to_linear(),
            perceptual_roughness: 0.3,
            metallic: 0.7,
            ..default()
        }),
    };
    spawn_tanks(&mut commands, &tank_assets, rng, config.fuel_tank_count);

    commands.insert_resource(tank_assets);
    commands.insert_resource(ParticleMesh(meshes.add(particle_mesh())));
    commands.insert_resource(pad);
    commands.insert_resource(terrain);
}
