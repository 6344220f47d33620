use anyhow::Context;
use game::{Game, GameState};
use gridcast::config::Settings;
use gridcast::map::GridMap;
use sdl2::event::Event;
use sdl2::pixels::PixelFormatEnum;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod game;

// helper trait to convert strings into std::error types
trait StringToAnyhow<T> {
    fn ah(self) -> anyhow::Result<T>;
}

impl<T> StringToAnyhow<T> for Result<T, String> {
    fn ah(self) -> anyhow::Result<T> {
        self.map_err(|err| anyhow::anyhow!("{err}"))
    }
}

const DEFAULT_MAP: &str = "map/map.txt";
const DEFAULT_WALL: &str = "map/wall.txt";

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("GRIDCAST_LOG");

    let mut args = std::env::args().skip(1);
    let map_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_MAP.into()));
    let wall_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_WALL.into()));

    let map = GridMap::load(&map_path)?;
    let settings = Settings::default().with_map(&map);
    settings.validate().context("invalid settings")?;

    // sdl boilerplate
    log::info!("initializing sdl2");
    let sdl_ctx = sdl2::init().ah()?;
    log::info!("initializing video");
    let video = sdl_ctx.video().ah()?;

    let (width, height) = (
        settings.width * settings.scale,
        settings.height * settings.scale,
    );
    log::info!("initializing {width}x{height} window");
    let mut window = video
        .window("gridcast", width, height)
        .position_centered()
        .build()?;
    window.set_resizable(false);
    log::info!("creating canvas");
    let canvas = window.into_canvas().build()?;
    log::info!("pumping events");
    let mut events = sdl_ctx.event_pump().ah()?;

    let wall = game::load_wall(&wall_path)?;

    let mut keys = HashSet::new();

    // initialize game
    log::info!("initializing game state");
    let delta = Duration::from_millis(1_000 / settings.target_fps);
    let texture_creator = canvas.texture_creator();
    let screen = texture_creator.create_texture_streaming(
        PixelFormatEnum::RGB24,
        settings.width,
        settings.height,
    )?;
    let mut game = Game::new(canvas, screen, map, wall, settings)?;

    'main_loop: loop {
        let prev = Instant::now();

        // handle events
        for ev in events.poll_iter() {
            match ev {
                Event::Quit { .. } => break 'main_loop,
                Event::KeyDown {
                    keycode: Some(k),
                    repeat,
                    ..
                } => {
                    keys.insert(k);

                    if !repeat {
                        game.playing_key_once(k);
                        game.update = true;
                    }
                }
                Event::KeyUp {
                    keycode: Some(k), ..
                } => {
                    keys.remove(&k);
                }
                _ => {}
            }
        }

        if game.game_state == GameState::Exit {
            break 'main_loop;
        }

        for k in keys.iter() {
            game.playing_key(*k);
            game.update = true;
        }

        // draw game
        if game.update {
            if let Err(err) = game.playing_draw() {
                log::error!("error while in game state {:?}: {err}", game.game_state);
                Err(err)?;
            }
            game.canvas.present();

            game.update = false;
        }

        let diff = Instant::now() - prev;
        if diff < delta {
            std::thread::sleep(delta - diff);
        }
    }

    log::info!("exiting");
    Ok(())
}
