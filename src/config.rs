use bevy::asset::{io::Reader, AssetLoader, LoadContext, LoadState};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;

use crate::ui::GameState;

const CONFIG_PATH: &str = "config/game.ron";

/// What happens when the lander reaches the horizontal edge of the arena.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsMode {
    #[default]
    Clamp, // Stop at the edge and lose horizontal velocity
    Wrap, // Re-enter from the opposite edge
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadPlacement {
    Centered,
    #[default]
    Random,
}

/// Presentation and session options. Physics constants live in `constants`.
#[derive(Asset, TypePath, Resource, Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub bounds: BoundsMode,
    pub pad_placement: PadPlacement,
    pub fuel_tank_count: usize,
    pub star_count: usize,
    pub volume: f32,       // 0.0 to 1.0
    pub seed: Option<u64>, // fixed seed for terrain, pad and tanks
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bounds: BoundsMode::Clamp,
            pad_placement: PadPlacement::Random,
            fuel_tank_count: 5,
            star_count: 500,
            volume: 0.8,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        let mut config: GameConfig = ron::de::from_str(content)?;
        config.volume = config.volume.clamp(0.0, 1.0);
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Default)]
pub struct GameConfigLoader;

impl AssetLoader for GameConfigLoader {
    type Asset = GameConfig;
    type Settings = ();
    type Error = ConfigLoadError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext,
    ) -> impl bevy::utils::ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        Box::pin(async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            let content = String::from_utf8_lossy(&bytes);
            Ok(GameConfig::from_ron(&content)?)
        })
    }

    fn extensions(&self) -> &[&str] {
        &["ron"]
    }
}

/// Session-wide random source. Seeded from the config when a seed is given.
#[derive(Resource)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

#[derive(Resource)]
struct ConfigHandle(Handle<GameConfig>);

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<GameConfig>()
            .init_asset_loader::<GameConfigLoader>()
            .add_systems(Startup, request_config)
            .add_systems(
                Update,
                finish_loading.run_if(in_state(GameState::Loading)),
            );
    }
}

fn request_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(ConfigHandle(asset_server.load(CONFIG_PATH)));
}

// Waits for the config asset to settle, then leaves the loading state.
// A missing or broken file is not fatal.
fn finish_loading(
    mut commands: Commands,
    handle: Res<ConfigHandle>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<GameConfig>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let config = match asset_server.load_state(&handle.0) {
        LoadState::Loaded => match configs.get(&handle.0) {
            Some(config) => {
                info!("Loaded {CONFIG_PATH}: {config:?}");
                config.clone()
            }
            None => return,
        },
        LoadState::Failed(err) => {
            error!("Falling back to default config: {err}");
            GameConfig::default()
        }
        _ => return,
    };

    commands.insert_resource(GameRng::new(config.seed));
    commands.insert_resource(config);
    next_state.set(GameState::Briefing);
}
