mod food;
mod game;
mod grid;
mod item;
mod render;
mod snake;
mod texture;

use std::path::Path;
use std::time::{Duration, Instant};

use image::{ImageBuffer, Rgba, RgbaImage};
use winit::dpi::LogicalSize;
use winit::event::{Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

use crate::food::{CosmeticMode, FOOD_TEXTURES};
use crate::game::Game;
use crate::render::BatchRenderer;
use crate::snake::{Direction, SnakeState, TickOutcome};
use crate::texture::{TextureAtlas, SLOT_EXTENT};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const TICK_MS: u64 = 150;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();
    let window = WindowBuilder::new()
        .with_title("gridsnake")
        .with_inner_size(LogicalSize::new(WIDTH, HEIGHT))
        .with_resizable(false)
        .build(&event_loop)?;

    let mut renderer = pollster::block_on(BatchRenderer::new(&window, WIDTH, HEIGHT))?;
    register_textures(renderer.atlas_mut())?;

    let mut game = Game::new(WIDTH, HEIGHT, CosmeticMode::Textured);
    game.set_game_over_hook(Box::new(|| {
        log::info!("game over, press R to restart");
    }));

    let tick = Duration::from_millis(TICK_MS);
    let mut last_update = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            if let Err(e) = renderer.render(&game.frame_items()) {
                log::error!("render failed: {e:#}");
                *control_flow = ControlFlow::Exit;
            }
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape)
                || input.close_requested()
                || input.destroyed()
            {
                *control_flow = ControlFlow::Exit;
                return;
            }

            if input.key_pressed(VirtualKeyCode::R) && game.state() == SnakeState::GameOver {
                game.reset();
                last_update = Instant::now();
            }

            if input.key_pressed(VirtualKeyCode::Up) || input.key_pressed(VirtualKeyCode::W) {
                game.change_direction(Direction::Up);
            }
            if input.key_pressed(VirtualKeyCode::Down) || input.key_pressed(VirtualKeyCode::S) {
                game.change_direction(Direction::Down);
            }
            if input.key_pressed(VirtualKeyCode::Left) || input.key_pressed(VirtualKeyCode::A) {
                game.change_direction(Direction::Left);
            }
            if input.key_pressed(VirtualKeyCode::Right) || input.key_pressed(VirtualKeyCode::D) {
                game.change_direction(Direction::Right);
            }

            if let Some(size) = input.window_resized() {
                renderer.resize(size.width, size.height);
            }

            if last_update.elapsed() >= tick {
                if game.tick() == TickOutcome::Died {
                    log::info!("final score: {}", game.score());
                }
                last_update = Instant::now();
            }

            window.request_redraw();
        }
    });
}

/// Which textures exist is configuration, not computed by the core: load
/// from assets/ when present, fall back to flat procedural sprites so the
/// game runs without any files on disk.
fn register_textures(atlas: &mut TextureAtlas) -> anyhow::Result<()> {
    let sources: Vec<(&str, [u8; 4])> = std::iter::once(("logo", [90, 200, 120, 255]))
        .chain(FOOD_TEXTURES.iter().copied().zip([
            [220, 60, 60, 255],
            [230, 170, 60, 255],
            [90, 120, 230, 255],
            [200, 80, 200, 255],
        ]))
        .collect();
    for (name, rgba) in sources {
        let path = format!("assets/{name}.png");
        if Path::new(&path).is_file() {
            atlas.register(name, path)?;
        } else {
            atlas.register_pixels(name, flat_sprite(rgba))?;
        }
    }
    Ok(())
}

fn flat_sprite(rgba: [u8; 4]) -> RgbaImage {
    ImageBuffer::from_pixel(SLOT_EXTENT, SLOT_EXTENT, Rgba(rgba))
}
