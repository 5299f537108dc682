mod assets;
mod cache;
mod camera;
mod config;
mod constants;
mod draw_list;
mod error;
mod materials;
mod model;
mod pipelines;
mod renderer;
mod scene;
mod simulation;
mod species;
mod textures;
mod uniforms;
mod utils;

use anyhow::Context;
use assets::directory::DirectoryAssets;
use config::AquariumConfig;
use constants::{FPS_UPDATE_INTERVAL_SECS, WINDOW_HEIGHT, WINDOW_WIDTH};
use renderer::Renderer;
use std::{path::PathBuf, sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

const ASSET_ROOT_ENV: &str = "AQUARIUM_ASSETS";

// --- Controls ---

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum KeyAction {
    None,
    TogglePause,
    Exit,
}

/// Applies a key press to the snapshot; pause and exit are left to the loop.
fn handle_key(config: &mut AquariumConfig, key: KeyCode) -> KeyAction {
    match key {
        KeyCode::ArrowUp => config.adjust_speed(true),
        KeyCode::ArrowDown => config.adjust_speed(false),
        KeyCode::KeyV => config.cycle_view(),
        KeyCode::KeyF => config.options.fog = !config.options.fog,
        KeyCode::KeyT => config.options.tank = !config.options.tank,
        KeyCode::KeyB => config.options.bubbles = !config.options.bubbles,
        KeyCode::KeyL => config.options.lasers = !config.options.lasers,
        KeyCode::KeyR => config.options.light_rays = !config.options.light_rays,
        KeyCode::KeyN => config.options.normal_maps = !config.options.normal_maps,
        KeyCode::KeyM => config.options.reflection = !config.options.reflection,
        KeyCode::Space => return KeyAction::TogglePause,
        KeyCode::Escape => return KeyAction::Exit,
        other => {
            if let Some(index) = fish_preset_index(other) {
                config.select_fish_preset(index);
            }
        }
    }
    KeyAction::None
}

/// Digit keys 1-9 pick presets 0-8; 0 picks the last one.
fn fish_preset_index(key: KeyCode) -> Option<usize> {
    let index = match key {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        KeyCode::Digit6 => 5,
        KeyCode::Digit7 => 6,
        KeyCode::Digit8 => 7,
        KeyCode::Digit9 => 8,
        KeyCode::Digit0 => 9,
        _ => return None,
    };
    Some(index)
}

fn asset_root() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ASSET_ROOT_ENV).ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Main Function ---
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let root = asset_root();
    log::info!("Loading aquarium assets from {}", root.display());
    let source = DirectoryAssets::new(root);

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Reefglass")
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .build(&event_loop)?,
    );
    let mut config = AquariumConfig::new();
    let mut renderer = pollster::block_on(Renderer::new(window.clone(), &source, &config))
        .with_context(|| format!("failed to initialise aquarium from {}", source.root().display()))?;
    renderer.start();

    let mut last_frame_time = Instant::now();
    let mut last_fps_update_time = Instant::now();
    let mut frames_since_last_fps_update = 0;
    let mut current_fps = 0.0;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => window.request_redraw(),
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => renderer.resize(physical_size),
                WindowEvent::ScaleFactorChanged { .. } => renderer.resize(window.inner_size()),
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        if let PhysicalKey::Code(code) = key_event.physical_key {
                            match handle_key(&mut config, code) {
                                KeyAction::TogglePause if renderer.is_running() => renderer.stop(),
                                KeyAction::TogglePause => {
                                    last_frame_time = Instant::now();
                                    renderer.start();
                                }
                                KeyAction::Exit => elwt.exit(),
                                KeyAction::None => {}
                            }
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let delta = now.duration_since(last_frame_time).as_secs_f32();
                    last_frame_time = now;

                    frames_since_last_fps_update += 1;
                    let elapsed_secs = now.duration_since(last_fps_update_time).as_secs_f64();
                    if elapsed_secs >= FPS_UPDATE_INTERVAL_SECS {
                        current_fps = frames_since_last_fps_update as f64 / elapsed_secs;
                        last_fps_update_time = now;
                        frames_since_last_fps_update = 0;
                    }

                    match renderer.render(delta, &config) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            renderer.reconfigure()
                        }
                        Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout, skipping frame"),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Surface out of memory");
                            elwt.exit();
                        }
                        Err(e) => log::error!("Surface error: {e:?}"),
                    }

                    let paused_text = if renderer.is_running() { "" } else { " [PAUSED]" };
                    window.set_title(&format!(
                        "Reefglass - Fish: {} - Speed: {:.2}x - FPS: {:.1}{}",
                        renderer.fish_total(),
                        config.globals.speed,
                        current_fps,
                        paused_text
                    ));
                }
                _ => {}
            },
            _ => {}
        }
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::FISH_COUNT_PRESETS;

    #[test]
    fn digits_select_fish_presets() {
        let mut config = AquariumConfig::new();
        handle_key(&mut config, KeyCode::Digit4);
        assert_eq!(config.fish_count, FISH_COUNT_PRESETS[3]);
        handle_key(&mut config, KeyCode::Digit0);
        assert_eq!(config.fish_count, FISH_COUNT_PRESETS[9]);
    }

    #[test]
    fn letters_flip_toggles() {
        let mut config = AquariumConfig::new();
        let before = config.options.clone();
        for key in [KeyCode::KeyF, KeyCode::KeyT, KeyCode::KeyB, KeyCode::KeyL] {
            assert_eq!(handle_key(&mut config, key), KeyAction::None);
        }
        assert_eq!(config.options.fog, !before.fog);
        assert_eq!(config.options.tank, !before.tank);
        assert_eq!(config.options.bubbles, !before.bubbles);
        assert_eq!(config.options.lasers, !before.lasers);
        handle_key(&mut config, KeyCode::KeyL);
        assert_eq!(config.options.lasers, before.lasers);
    }

    #[test]
    fn loop_keys_are_reported() {
        let mut config = AquariumConfig::new();
        assert_eq!(handle_key(&mut config, KeyCode::Space), KeyAction::TogglePause);
        assert_eq!(handle_key(&mut config, KeyCode::Escape), KeyAction::Exit);
        assert_eq!(handle_key(&mut config, KeyCode::KeyQ), KeyAction::None);
        assert_eq!(config, AquariumConfig::new());
    }

    #[test]
    fn view_key_cycles_presets() {
        let mut config = AquariumConfig::new();
        handle_key(&mut config, KeyCode::KeyV);
        assert_eq!(config.view_index, 1);
        assert_eq!(config.globals.eye_height, 38.0);
    }
}
