use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::simulation::LanderState;

const FUEL_BAR_WIDTH: f32 = 200.0;

#[derive(States, Default, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum GameState {
    #[default]
    Loading, // waiting for the config asset
    Briefing,
    Playing,
    GameOver,
}

/// True while the lander is on screen.
pub fn scene_active(state: Res<State<GameState>>) -> bool {
    matches!(state.get(), GameState::Playing | GameState::GameOver)
}

/// Colour band of the fuel bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelGauge {
    Green,
    Yellow,
    Red,
}

impl FuelGauge {
    pub fn for_fuel(fuel: f32) -> Self {
        if fuel > 50.0 {
            FuelGauge::Green
        } else if fuel > 25.0 {
            FuelGauge::Yellow
        } else {
            FuelGauge::Red
        }
    }

    fn color(self) -> egui::Color32 {
        match self {
            FuelGauge::Green => egui::Color32::GREEN,
            FuelGauge::Yellow => egui::Color32::YELLOW,
            FuelGauge::Red => egui::Color32::RED,
        }
    }
}

pub fn fuel_readout(fuel: f32) -> String {
    format!("{}%", fuel.max(0.0).floor() as u32)
}

pub fn velocity_readout(velocity: Vec2) -> String {
    format!("{:.1} m/s", velocity.y.abs())
}

pub fn altitude_readout(lander: &LanderState) -> String {
    format!("{:.1} m", lander.altitude())
}

fn restart_requested(keys: &ButtonInput<KeyCode>) -> bool {
    keys.just_pressed(KeyCode::KeyR) || keys.just_pressed(KeyCode::Enter)
}

// Telemetry overlay in the top-left corner
pub fn hud_system(mut contexts: EguiContexts, lander: Res<LanderState>) {
    egui::Window::new("hud")
        .title_bar(false)
        .resizable(false)
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .frame(egui::Frame::none().fill(egui::Color32::from_black_alpha(160)).inner_margin(8.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                ui.label("Fuel:");
                ui.add(
                    egui::ProgressBar::new((lander.fuel / 100.0).clamp(0.0, 1.0))
                        .desired_width(FUEL_BAR_WIDTH)
                        .fill(FuelGauge::for_fuel(lander.fuel).color())
                        .text(fuel_readout(lander.fuel)),
                );
            });
            ui.label(format!("Velocity: {}", velocity_readout(lander.velocity)));
            ui.label(format!("Altitude: {}", altitude_readout(&lander)));
        });
}

pub fn briefing_system(
    mut contexts: EguiContexts,
    keys: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<NextState<GameState>>,
) {
    let mut start = keys.just_pressed(KeyCode::Enter);

    egui::Window::new("Lunar Lander")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Land gently on the landing pad.");
            ui.add_space(8.0);
            ui.label("Up arrow: fire the main engine");
            ui.label("Left / Right arrows: rotate");
            ui.add_space(8.0);
            ui.label("Touch down slower than 1 m/s, nearly level and without drifting.");
            ui.label("Fly through the red tanks to refuel.");
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui.button("Start").clicked() {
                    start = true;
                }
            });
        });

    if start {
        info!("Starting game");
        state.set(GameState::Playing);
    }
}

pub fn game_over_system(
    mut contexts: EguiContexts,
    keys: Res<ButtonInput<KeyCode>>,
    lander: Res<LanderState>,
    mut state: ResMut<NextState<GameState>>,
) {
    let mut restart = restart_requested(&keys);

    let (message, color) = match &lander.touchdown {
        Some(touchdown) if touchdown.is_safe() => (touchdown.message(), egui::Color32::GREEN),
        Some(touchdown) => (touchdown.message(), egui::Color32::RED),
        None => (String::new(), egui::Color32::WHITE),
    };

    egui::Window::new("Game Over")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(contexts.ctx_mut(), |ui| {
            ui.colored_label(color, egui::RichText::new(message).size(18.0));
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui.button("Restart").clicked() {
                    restart = true;
                }
            });
        });

    if restart {
        state.set(GameState::Playing);
    }
}
