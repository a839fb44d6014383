use bevy::prelude::*;

#[derive(Component)]
pub struct MainCamera;

#[derive(Component)]
pub struct Lander;

/// Despawned when a round restarts (fuel tanks, particles).
#[derive(Component)]
pub struct RoundSpecific;
