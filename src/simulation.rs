use bevy::prelude::*;

use crate::config::{BoundsMode, GameConfig};
use crate::constants::{
    CEILING, FUEL_BURN_RATE, GRAVITY, INITIAL_ALTITUDE, INITIAL_FUEL, LANDER_FOOT_CLEARANCE,
    MAX_FRAME_DT, MAX_HORIZONTAL_TOUCHDOWN_SPEED, MAX_TOUCHDOWN_TILT, ROTATION_SPEED,
    SAFE_LANDING_VELOCITY, TERRAIN_HALF_WIDTH, THRUST_ACCELERATION, WORLD_SCALE,
};
use crate::terrain::{LandingPad, TerrainProfile};
use crate::ui::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    Flying,
    Landed,
    Crashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashReason {
    TooFast,
    Drifting,
    Tilted,
    OffPad,
}

impl CrashReason {
    fn describe(self) -> &'static str {
        match self {
            CrashReason::TooFast => "Descent too fast.",
            CrashReason::Drifting => "Too much horizontal drift.",
            CrashReason::Tilted => "Lander was not level.",
            CrashReason::OffPad => "Missed the landing pad.",
        }
    }
}

/// Result of the lander's feet reaching the terrain.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct Touchdown {
    pub position: Vec2,
    pub velocity: Vec2, // at the moment of contact
    pub rotation: f32,
    pub reasons: Vec<CrashReason>,
}

impl Touchdown {
    pub fn evaluate(position: Vec2, velocity: Vec2, rotation: f32, pad: &LandingPad) -> Self {
        let mut reasons = Vec::new();
        if velocity.y.abs() > SAFE_LANDING_VELOCITY {
            reasons.push(CrashReason::TooFast);
        }
        if velocity.x.abs() >= MAX_HORIZONTAL_TOUCHDOWN_SPEED {
            reasons.push(CrashReason::Drifting);
        }
        if rotation.abs() >= MAX_TOUCHDOWN_TILT {
            reasons.push(CrashReason::Tilted);
        }
        if !pad.contains(position.x) {
            reasons.push(CrashReason::OffPad);
        }
        Self {
            position,
            velocity,
            rotation,
            reasons,
        }
    }

    pub fn is_safe(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn message(&self) -> String {
        if self.is_safe() {
            return "TOUCHDOWN! Safe landing.".to_string();
        }
        let mut message = String::from("LANDER DESTROYED!");
        for reason in &self.reasons {
            message.push(' ');
            message.push_str(reason.describe());
        }
        message
    }
}

/// Pilot commands for the current frame.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct PilotInput {
    pub thrust: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

impl PilotInput {
    pub fn from_keys(keys: &ButtonInput<KeyCode>) -> Self {
        Self {
            thrust: keys.pressed(KeyCode::ArrowUp),
            rotate_left: keys.pressed(KeyCode::ArrowLeft),
            rotate_right: keys.pressed(KeyCode::ArrowRight),
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LanderState {
    pub position: Vec2,        // world units
    pub velocity: Vec2,        // m/s
    pub rotation: f32,         // radians, counter-clockwise
    pub fuel: f32,             // percent
    pub thruster_active: bool, // engine actually firing this frame
    pub status: FlightStatus,
    pub touchdown: Option<Touchdown>,
}

impl Default for LanderState {
    fn default() -> Self {
        Self {
            position: Vec2::new(0.0, INITIAL_ALTITUDE),
            velocity: Vec2::ZERO,
            rotation: 0.0,
            fuel: INITIAL_FUEL,
            thruster_active: false,
            status: FlightStatus::Flying,
            touchdown: None,
        }
    }
}

impl LanderState {
    pub fn altitude(&self) -> f32 {
        self.position.y
    }

    pub fn is_flying(&self) -> bool {
        self.status == FlightStatus::Flying
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advances the lander by one frame. Returns the touchdown when the feet
    /// reach the terrain during this step.
    pub fn step(
        &mut self,
        input: &PilotInput,
        dt: f32,
        terrain: &TerrainProfile,
        pad: &LandingPad,
        bounds: BoundsMode,
    ) -> Option<Touchdown> {
        if !self.is_flying() {
            self.thruster_active = false;
            return None;
        }

        self.velocity.y -= GRAVITY * dt;

        self.thruster_active = input.thrust && self.fuel > 0.0;
        if self.thruster_active {
            // Thrust pushes along the lander's local up axis
            let direction = Vec2::new(-self.rotation.sin(), self.rotation.cos());
            self.velocity += direction * THRUST_ACCELERATION * dt;
            self.fuel = (self.fuel - FUEL_BURN_RATE * dt).max(0.0);
        }

        if input.rotate_left {
            self.rotation += ROTATION_SPEED * dt;
        }
        if input.rotate_right {
            self.rotation -= ROTATION_SPEED * dt;
        }

        self.position += self.velocity * dt * WORLD_SCALE;

        let ground = terrain.height_at(self.position.x);
        if self.position.y - ground <= LANDER_FOOT_CLEARANCE {
            return Some(self.touch_down(ground, pad));
        }

        self.apply_bounds(bounds);
        None
    }

    fn touch_down(&mut self, ground: f32, pad: &LandingPad) -> Touchdown {
        let touchdown = Touchdown::evaluate(self.position, self.velocity, self.rotation, pad);
        if touchdown.is_safe() {
            self.status = FlightStatus::Landed;
            self.position.y = ground + LANDER_FOOT_CLEARANCE;
            self.velocity = Vec2::ZERO;
        } else {
            self.status = FlightStatus::Crashed;
        }
        self.thruster_active = false;
        self.touchdown = Some(touchdown.clone());
        touchdown
    }

    fn apply_bounds(&mut self, mode: BoundsMode) {
        match mode {
            BoundsMode::Clamp => {
                if self.position.x.abs() > TERRAIN_HALF_WIDTH {
                    self.position.x =
                        self.position.x.clamp(-TERRAIN_HALF_WIDTH, TERRAIN_HALF_WIDTH);
                    self.velocity.x = 0.0;
                }
            }
            BoundsMode::Wrap => {
                self.position.x = wrap_horizontal(self.position.x);
            }
        }

        if self.position.y > CEILING {
            self.position.y = CEILING;
            self.velocity.y = 0.0;
        }
    }
}

pub fn wrap_horizontal(x: f32) -> f32 {
    (x + TERRAIN_HALF_WIDTH).rem_euclid(2.0 * TERRAIN_HALF_WIDTH) - TERRAIN_HALF_WIDTH
}

pub fn read_pilot_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PilotInput>) {
    *input = PilotInput::from_keys(&keys);
}

pub fn simulation_system(
    time: Res<Time>,
    input: Res<PilotInput>,
    mut state: ResMut<LanderState>,
    terrain: Res<TerrainProfile>,
    pad: Res<LandingPad>,
    config: Res<GameConfig>,
    mut touchdowns: EventWriter<Touchdown>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    // Cap long frames so a hitch cannot carry the lander through the terrain
    let dt = time.delta_secs().min(MAX_FRAME_DT);

    if let Some(touchdown) = state.step(&input, dt, &terrain, &pad, config.bounds) {
        if touchdown.is_safe() {
            info!("Landed at x={:.1}", touchdown.position.x);
        } else {
            info!(
                "Crashed at x={:.1} with velocity {:?}: {:?}",
                touchdown.position.x, touchdown.velocity, touchdown.reasons
            );
        }
        touchdowns.send(touchdown);
        next_state.set(GameState::GameOver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn flat() -> TerrainProfile {
        TerrainProfile::from_points(vec![
            Vec2::new(-TERRAIN_HALF_WIDTH, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(TERRAIN_HALF_WIDTH, 0.0),
        ])
    }

    fn step(state: &mut LanderState, input: PilotInput) -> Option<Touchdown> {
        state.step(
            &input,
            DT,
            &flat(),
            &LandingPad::default(),
            BoundsMode::Clamp,
        )
    }

    fn thrust() -> PilotInput {
        PilotInput {
            thrust: true,
            ..default()
        }
    }

    #[test]
    fn gravity_pulls_the_lander_down() {
        let mut state = LanderState::default();
        step(&mut state, PilotInput::default());
        assert!((state.velocity.y + GRAVITY * DT).abs() < 1e-6);
        assert!(state.position.y < INITIAL_ALTITUDE);
        assert_eq!(state.fuel, INITIAL_FUEL);
        assert!(!state.thruster_active);
    }

    #[test]
    fn position_uses_the_updated_velocity_and_world_scale() {
        let mut state = LanderState::default();
        step(&mut state, PilotInput::default());
        let expected = INITIAL_ALTITUDE - GRAVITY * DT * DT * WORLD_SCALE;
        assert!((state.position.y - expected).abs() < 1e-4);
    }

    #[test]
    fn upright_thrust_beats_gravity_and_burns_fuel() {
        let mut state = LanderState::default();
        step(&mut state, thrust());
        let expected = (THRUST_ACCELERATION - GRAVITY) * DT;
        assert!((state.velocity.y - expected).abs() < 1e-6);
        assert_eq!(state.velocity.x, 0.0);
        assert!((state.fuel - (INITIAL_FUEL - FUEL_BURN_RATE * DT)).abs() < 1e-4);
        assert!(state.thruster_active);
    }

    #[test]
    fn tilted_thrust_pushes_sideways() {
        let mut state = LanderState {
            rotation: std::f32::consts::FRAC_PI_2,
            ..default()
        };
        step(&mut state, thrust());
        // Nose pointing left: thrust accelerates towards -x
        assert!(state.velocity.x < 0.0);
        assert!((state.velocity.x + THRUST_ACCELERATION * DT).abs() < 1e-5);
    }

    #[test]
    fn empty_tank_cannot_thrust() {
        let mut state = LanderState {
            fuel: 0.0,
            ..default()
        };
        step(&mut state, thrust());
        assert!(!state.thruster_active);
        assert!((state.velocity.y + GRAVITY * DT).abs() < 1e-6);
        assert_eq!(state.fuel, 0.0);
    }

    #[test]
    fn fuel_never_goes_negative() {
        let mut state = LanderState {
            fuel: 0.001,
            ..default()
        };
        step(&mut state, thrust());
        assert_eq!(state.fuel, 0.0);
    }

    #[test]
    fn arrow_keys_rotate() {
        let mut state = LanderState::default();
        step(
            &mut state,
            PilotInput {
                rotate_left: true,
                ..default()
            },
        );
        assert!((state.rotation - ROTATION_SPEED * DT).abs() < 1e-6);

        step(
            &mut state,
            PilotInput {
                rotate_right: true,
                ..default()
            },
        );
        assert!(state.rotation.abs() < 1e-6);

        step(
            &mut state,
            PilotInput {
                rotate_left: true,
                rotate_right: true,
                ..default()
            },
        );
        assert!(state.rotation.abs() < 1e-6);
    }

    #[test]
    fn gentle_touchdown_on_the_pad_lands() {
        let mut state = LanderState {
            position: Vec2::new(0.0, LANDER_FOOT_CLEARANCE + 0.05),
            velocity: Vec2::new(0.5, -0.5),
            ..default()
        };
        let touchdown = step(&mut state, PilotInput::default()).expect("should touch down");
        assert!(touchdown.is_safe());
        assert_eq!(state.status, FlightStatus::Landed);
        assert_eq!(state.position.y, LANDER_FOOT_CLEARANCE);
        assert_eq!(state.velocity, Vec2::ZERO);
        assert_eq!(state.touchdown, Some(touchdown));
    }

    #[test]
    fn hard_touchdown_crashes() {
        let mut state = LanderState {
            position: Vec2::new(0.0, LANDER_FOOT_CLEARANCE + 0.1),
            velocity: Vec2::new(0.0, -4.0),
            ..default()
        };
        let touchdown = step(&mut state, PilotInput::default()).expect("should touch down");
        assert_eq!(touchdown.reasons, vec![CrashReason::TooFast]);
        assert_eq!(state.status, FlightStatus::Crashed);
        assert!(!state.thruster_active);
    }

    #[test]
    fn touchdown_lists_every_failed_check() {
        let pad = LandingPad::default();
        let touchdown =
            Touchdown::evaluate(Vec2::new(40.0, 5.0), Vec2::new(-3.0, -2.0), -0.5, &pad);
        assert_eq!(
            touchdown.reasons,
            vec![
                CrashReason::TooFast,
                CrashReason::Drifting,
                CrashReason::Tilted,
                CrashReason::OffPad,
            ]
        );
        assert_eq!(
            touchdown.message(),
            "LANDER DESTROYED! Descent too fast. Too much horizontal drift. \
             Lander was not level. Missed the landing pad."
        );
    }

    #[test]
    fn touchdown_thresholds() {
        let pad = LandingPad::default();
        let at_limit = Touchdown::evaluate(
            Vec2::ZERO,
            Vec2::new(2.99, -SAFE_LANDING_VELOCITY),
            0.29,
            &pad,
        );
        assert!(at_limit.is_safe());
        assert_eq!(at_limit.message(), "TOUCHDOWN! Safe landing.");

        let drifting = Touchdown::evaluate(Vec2::ZERO, Vec2::new(3.0, 0.0), 0.0, &pad);
        assert_eq!(drifting.reasons, vec![CrashReason::Drifting]);

        let tilted = Touchdown::evaluate(Vec2::ZERO, Vec2::ZERO, 0.3, &pad);
        assert_eq!(tilted.reasons, vec![CrashReason::Tilted]);
    }

    #[test]
    fn settled_lander_ignores_input() {
        let mut state = LanderState {
            status: FlightStatus::Landed,
            ..default()
        };
        let before = state.clone();
        assert!(step(&mut state, thrust()).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn clamp_mode_stops_at_the_edge() {
        let mut state = LanderState {
            position: Vec2::new(TERRAIN_HALF_WIDTH - 0.1, 100.0),
            velocity: Vec2::new(20.0, 0.0),
            ..default()
        };
        step(&mut state, PilotInput::default());
        assert_eq!(state.position.x, TERRAIN_HALF_WIDTH);
        assert_eq!(state.velocity.x, 0.0);
    }

    #[test]
    fn wrap_mode_reenters_from_the_other_side() {
        let mut state = LanderState {
            position: Vec2::new(TERRAIN_HALF_WIDTH - 0.1, 100.0),
            velocity: Vec2::new(20.0, 0.0),
            ..default()
        };
        state.step(
            &PilotInput::default(),
            DT,
            &flat(),
            &LandingPad::default(),
            BoundsMode::Wrap,
        );
        assert!(state.position.x < -TERRAIN_HALF_WIDTH + 5.0);
        assert_eq!(state.velocity.x, 20.0);
    }

    #[test]
    fn wrap_is_periodic() {
        assert_eq!(wrap_horizontal(0.0), 0.0);
        assert!((wrap_horizontal(TERRAIN_HALF_WIDTH + 10.0) - (-TERRAIN_HALF_WIDTH + 10.0)).abs() < 1e-3);
        assert!((wrap_horizontal(-TERRAIN_HALF_WIDTH - 10.0) - (TERRAIN_HALF_WIDTH - 10.0)).abs() < 1e-3);
    }

    #[test]
    fn ceiling_caps_the_climb() {
        let mut state = LanderState {
            position: Vec2::new(0.0, CEILING - 0.1),
            velocity: Vec2::new(0.0, 5.0),
            ..default()
        };
        step(&mut state, thrust());
        assert_eq!(state.position.y, CEILING);
        assert_eq!(state.velocity.y, 0.0);
    }

    #[test]
    fn pilot_input_reads_arrow_keys() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::ArrowUp);
        keys.press(KeyCode::ArrowRight);
        assert_eq!(
            PilotInput::from_keys(&keys),
            PilotInput {
                thrust: true,
                rotate_left: false,
                rotate_right: true,
            }
        );
    }

    #[test]
    fn reset_returns_to_the_start() {
        let mut state = LanderState {
            position: Vec2::new(40.0, 3.0),
            velocity: Vec2::new(2.0, -9.0),
            fuel: 12.0,
            status: FlightStatus::Crashed,
            ..default()
        };
        state.reset();
        assert_eq!(state, LanderState::default());
        assert_eq!(state.altitude(), INITIAL_ALTITUDE);
    }
}
