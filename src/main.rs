//! Hex fade grid demo.
//!
//! Hover a tile to flicker it, click one to flicker its honeycomb, and drive the
//! rest of the API from the control panel. Tab toggles the world inspector and
//! Esc quits.

use std::sync::{Arc, Mutex, PoisonError};

use bevy::app::AppExit;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use hex_fade_grid::widget::GridTweens;
use hex_fade_grid::{
    ActiveGrid, Coord, FadeOptions, HexGridConfig, HexGridPlugin, TeardownGrid, TileEvent,
};

/// Demo state, used to gate the inspector.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
enum DemoState {
    /// Grid interaction only.
    #[default]
    Running,
    /// World inspector visible (Tab to toggle).
    Inspecting,
}

/// Timings and target used by the control panel and pointer handlers.
#[derive(Resource, Clone, Debug, Reflect)]
struct DemoConfig {
    /// Timing of the panel's fades.
    fade: FadeOptions,
    /// Timing of hover and click flickers.
    flicker: FadeOptions,
    /// Coordinate the panel's tile, honeycomb and line buttons act on.
    origin: Coord,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fade: FadeOptions::default(),
            flicker: FadeOptions::FLICKER,
            origin: Coord::new(2, 2),
        }
    }
}

/// Coordinates clicked since the last frame, filled by tile listeners.
#[derive(Resource, Clone, Default)]
struct ClickedTiles(Arc<Mutex<Vec<Coord>>>);

impl ClickedTiles {
    fn push(&self, coord: Coord) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(coord);
    }

    fn drain(&self) -> Vec<Coord> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(feature = "native")]
#[derive(clap::Parser, Debug)]
#[command(name = "hex-fade-grid")]
#[command(about = "Interactive hex tile grid with fade animations")]
struct Args {
    /// Tile size in pixels; a tile is four times as wide
    #[arg(long, default_value_t = 10.0)]
    tile_size: f32,

    /// Fixed surface width (follows the window when unset)
    #[arg(long, requires = "height")]
    width: Option<f32>,

    /// Fixed surface height (follows the window when unset)
    #[arg(long, requires = "width")]
    height: Option<f32>,

    /// Duration of panel fades in seconds
    #[arg(long, default_value_t = 1.0)]
    fade_speed: f32,
}

#[cfg(feature = "native")]
fn configs() -> (HexGridConfig, DemoConfig) {
    use clap::Parser;

    let args = Args::parse();
    let grid = HexGridConfig {
        tile_size: args.tile_size,
        surface_size: args.width.zip(args.height).map(|(w, h)| Vec2::new(w, h)),
        ..default()
    };
    let demo = DemoConfig {
        fade: FadeOptions::with_speed(args.fade_speed),
        ..default()
    };
    (grid, demo)
}

#[cfg(not(feature = "native"))]
fn configs() -> (HexGridConfig, DemoConfig) {
    (HexGridConfig::default(), DemoConfig::default())
}

fn main() {
    let (grid_config, demo_config) = configs();
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Hex Fade Grid".into(),
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                filter: "wgpu=error,naga=warn,hex_fade_grid=debug".into(),
                ..default()
            }),
    )
    .register_type::<DemoState>()
    .register_type::<DemoConfig>()
    .init_state::<DemoState>()
    .insert_resource(demo_config)
    .init_resource::<ClickedTiles>()
    .add_plugins(EguiPlugin::default())
    .add_plugins(HexGridPlugin(grid_config))
    .add_systems(
        Update,
        subscribe_tile_events.run_if(resource_added::<ActiveGrid>),
    )
    .add_systems(Update, flicker_clicked_honeycombs)
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_systems(EguiPrimaryContextPass, control_panel)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(DemoState::Inspecting)));

    app.run();
}

/// Hover flickers the tile itself; clicks are queued for the honeycomb system.
fn subscribe_tile_events(grid: Res<ActiveGrid>, clicked: Res<ClickedTiles>, demo: Res<DemoConfig>) {
    let hover = demo.flicker;
    for tile in grid.grid().tiles() {
        let clicked = clicked.clone();
        tile.on(TileEvent::Click, move |t| clicked.push(t.coord()));
        tile.on(TileEvent::PointerOver, move |t| {
            let _ = t.flicker(hover);
        });
    }
    info!("listening to {} tiles", grid.grid().tiles().len());
}

fn flicker_clicked_honeycombs(
    grid: Option<Res<ActiveGrid>>,
    clicked: Res<ClickedTiles>,
    demo: Res<DemoConfig>,
) {
    let coords = clicked.drain();
    let Some(grid) = grid else { return };
    for coord in coords {
        let _ = grid.flicker_honeycomb(coord, demo.flicker);
    }
}

fn control_panel(
    mut contexts: EguiContexts,
    grid: Option<Res<ActiveGrid>>,
    tweens: Option<Res<GridTweens>>,
    mut demo: ResMut<DemoConfig>,
    mut teardown: MessageWriter<TeardownGrid>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::Window::new("Hex grid")
        .default_width(240.0)
        .show(ctx, |ui| {
            let Some(grid) = grid.as_deref() else {
                ui.label("Grid torn down.");
                return;
            };
            let active = tweens.as_deref().map_or(0, |t| t.active_count());
            ui.label(format!(
                "{} x {} tiles, {active} tweens running",
                grid.grid().columns(),
                grid.grid().rows()
            ));

            ui.separator();
            ui.add(egui::Slider::new(&mut demo.fade.speed, 0.1..=5.0).text("fade speed"));
            ui.add(egui::Slider::new(&mut demo.fade.delay, 0.0..=2.0).text("fade delay"));
            ui.horizontal(|row| {
                row.label("origin");
                row.add(egui::DragValue::new(&mut demo.origin.x).prefix("x "));
                row.add(egui::DragValue::new(&mut demo.origin.y).prefix("y "));
            });
            let (origin, fade, flicker) = (demo.origin, demo.fade, demo.flicker);

            ui.separator();
            ui.horizontal(|row| {
                row.label("tile");
                let mut started = Vec::new();
                if row.button("in").clicked() {
                    started.push(grid.fade_tile_in(origin, fade));
                }
                if row.button("out").clicked() {
                    started.push(grid.fade_tile_out(origin, fade));
                }
                if row.button("flicker").clicked() {
                    started.push(grid.flicker_tile(origin, flicker));
                }
                if started.iter().any(Option::is_none) {
                    warn!("no tile at {origin}");
                }
            });
            ui.horizontal(|row| {
                row.label("honeycomb");
                if row.button("in").clicked() {
                    let _ = grid.fade_honeycomb_in(origin, fade);
                }
                if row.button("out").clicked() {
                    let _ = grid.fade_honeycomb_out(origin, fade);
                }
                if row.button("flicker").clicked() {
                    let _ = grid.flicker_honeycomb(origin, flicker);
                }
                if row.button("staggered").clicked() {
                    let _ = grid.honeycomb(origin).staggered_fade_in(fade);
                }
            });
            ui.horizontal(|row| {
                row.label("line");
                if row.button("staggered in").clicked() {
                    let _ = grid.line(origin).staggered_fade_in(fade);
                }
                if row.button("staggered out").clicked() {
                    let _ = grid.line(origin).staggered_fade_out(fade);
                }
            });
            ui.horizontal(|row| {
                row.label("all");
                if row.button("in").clicked() {
                    let _ = grid.all().fade_in(fade);
                }
                if row.button("out").clicked() {
                    let _ = grid.all().fade_out(fade);
                }
                if row.button("flicker").clicked() {
                    let _ = grid.all().flicker(flicker);
                }
            });

            ui.separator();
            ui.horizontal(|row| {
                if row.button("Kill animations").clicked() {
                    grid.kill_all_animations();
                }
                if row.button("Tear down").clicked() {
                    teardown.write(TeardownGrid);
                }
            });
        });
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<DemoState>>,
    mut next: ResMut<NextState<DemoState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            DemoState::Running => DemoState::Inspecting,
            DemoState::Inspecting => DemoState::Running,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
