//! gridcaster: first-person grid raycaster
//!
//! Classic pseudo-3D renderer over a 2D tile map:
//! - One ray per screen column, stepped across grid lines
//! - Fisheye-corrected, texture-mapped wall strips
//! - Far-to-near strip compositing over a scrolling sky
//! - Software framebuffer presented through macroquad

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod compositor;
mod config;
mod minimap;
mod rasterizer;
mod raycast;
mod world;

use macroquad::prelude::*;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use app::AppState;
use config::{Settings, SETTINGS_PATH};
use world::MoveInput;

/// Where F5 writes the current level and pose
const SNAPSHOT_PATH: &str = "assets/levels/snapshot.ron";

fn window_conf() -> Conf {
    // Runs before main, only to size the window. main reads the file again
    // so parse errors are reported once the subscriber is installed.
    let settings = Settings::load(SETTINGS_PATH)
        .ok()
        .flatten()
        .unwrap_or_default();
    let scale = settings.window_scale.max(1);

    Conf {
        window_title: format!("gridcaster v{}", VERSION),
        window_width: (settings.width * scale) as i32,
        window_height: (settings.height * scale) as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Decode keyboard and mouse state into movement intent.
/// Mouse turning only while the right button is held.
fn read_input(last_mouse: &mut (f32, f32)) -> MoveInput {
    let axis = |pos: KeyCode, neg: KeyCode| {
        let mut v = 0.0;
        if is_key_down(pos) {
            v += 1.0;
        }
        if is_key_down(neg) {
            v -= 1.0;
        }
        v
    };

    let mouse = mouse_position();
    let mouse_dx = if is_mouse_button_down(MouseButton::Right) {
        mouse.0 - last_mouse.0
    } else {
        0.0
    };
    *last_mouse = mouse;

    MoveInput {
        forward: axis(KeyCode::W, KeyCode::S),
        strafe: axis(KeyCode::D, KeyCode::A),
        turn: axis(KeyCode::E, KeyCode::Q) + axis(KeyCode::Right, KeyCode::Left),
        mouse_dx,
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let loaded = Settings::load(SETTINGS_PATH);
    let log_level = match &loaded {
        Ok(Some(settings)) => settings.tracing_level().unwrap_or(tracing::Level::INFO),
        _ => tracing::Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global tracing subscriber was already installed");
    }

    let settings = match loaded {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            warn!(path = SETTINGS_PATH, "settings file not found, using defaults");
            Settings::default()
        }
        Err(e) => {
            error!("failed to read {}: {}", SETTINGS_PATH, e);
            std::process::exit(1);
        }
    };

    let mut app = match AppState::load(settings) {
        Ok(app) => app,
        Err(e) => {
            error!("startup failed: {}", e);
            std::process::exit(1);
        }
    };

    info!("=== gridcaster v{} ===", VERSION);

    let mut last_mouse = mouse_position();
    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if is_key_pressed(KeyCode::M) {
            app.show_minimap = !app.show_minimap;
            debug!(enabled = app.show_minimap, "minimap toggled");
        }
        if is_key_pressed(KeyCode::F5) {
            if let Err(e) = app.save_snapshot(SNAPSHOT_PATH) {
                error!("failed to save {}: {}", SNAPSHOT_PATH, e);
            }
        }

        let input = read_input(&mut last_mouse);
        app.frame(&input, get_frame_time());

        // Convert framebuffer to texture and stretch it over the window
        let texture = Texture2D::from_rgba8(app.fb.width as u16, app.fb.height as u16, &app.fb.pixels);
        texture.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );
        draw_text(&format!("{} fps", get_fps()), 10.0, 20.0, 20.0, WHITE);

        next_frame().await;
    }

    info!("exiting");
}
