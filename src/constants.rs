// Physics
pub const GRAVITY: f32 = 1.62; // m/s² (lunar gravity)
pub const THRUST_ACCELERATION: f32 = 3.5; // m/s² along the lander's up axis
pub const ROTATION_SPEED: f32 = 0.5; // rad/s
pub const FUEL_BURN_RATE: f32 = 0.5; // percent per second of thrust
pub const MAX_FRAME_DT: f32 = 0.1; // seconds

// Touchdown limits
pub const SAFE_LANDING_VELOCITY: f32 = 1.0; // m/s, vertical
pub const MAX_HORIZONTAL_TOUCHDOWN_SPEED: f32 = 3.0; // m/s
pub const MAX_TOUCHDOWN_TILT: f32 = 0.3; // radians

// Fuel is tracked as a percentage of a full tank
pub const INITIAL_FUEL: f32 = 100.0;
pub const MAX_FUEL: f32 = 100.0;

// World geometry, in world units (WORLD_SCALE units per meter travelled)
pub const WORLD_SCALE: f32 = 10.0;
pub const INITIAL_ALTITUDE: f32 = 150.0;
pub const LANDER_FOOT_CLEARANCE: f32 = 5.0; // Distance from lander center to its feet
pub const NOZZLE_OFFSET: f32 = 8.0; // Distance from lander center to the exhaust plume origin
pub const CEILING: f32 = 200.0;

// Terrain
pub const TERRAIN_WIDTH: f32 = 500.0;
pub const TERRAIN_HALF_WIDTH: f32 = TERRAIN_WIDTH / 2.0;
pub const TERRAIN_SEGMENTS: usize = 100;
pub const TERRAIN_DEPTH: f32 = 120.0;
pub const FLAT_ZONE_HALF_WIDTH: f32 = 50.0;
pub const PAD_HALF_WIDTH: f32 = 10.0;

// Fuel tanks
pub const TANK_PICKUP_RADIUS: f32 = 10.0;
pub const TANK_REFUEL_AMOUNT: f32 = 25.0;
pub const TANK_RESPAWN_DELAY: f32 = 5.0; // seconds
pub const TANK_SPAWN_HALF_WIDTH: f32 = 200.0;
pub const TANK_SPAWN_MIN_Y: f32 = 50.0;
pub const TANK_SPAWN_MAX_Y: f32 = 150.0;
