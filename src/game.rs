use crate::StringToAnyhow;
use anyhow::Context;
use gridcast::config::Settings;
use gridcast::map::GridMap;
use gridcast::movement::{Actor, Intent};
use gridcast::render::{draw_minimap, render_frame, Framebuffer};
use gridcast::texture::Texture;
use sdl2::image::LoadSurface;
use sdl2::keyboard::Keycode;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::render::{self, Canvas};
use sdl2::surface::Surface;
use sdl2::video::Window;
use std::path::Path;

#[derive(Clone, Copy, PartialEq, Debug)]
pub(crate) enum GameState {
    Playing,
    Minimap,
    Exit,
}

/// Palette digit grids end in `.txt`; anything else goes through SDL2_image.
pub(crate) fn load_wall(path: &Path) -> anyhow::Result<Texture> {
    if path.extension().is_some_and(|ext| ext == "txt") {
        return Texture::load(path);
    }

    log::info!("decoding image texture at {}", path.display());
    let surface = Surface::from_file(path)
        .ah()
        .with_context(|| format!("could not decode {}", path.display()))?
        .convert_format(PixelFormatEnum::RGB24)
        .ah()?;
    let (width, height) = (surface.width(), surface.height());
    let pitch = surface.pitch() as usize;
    let texels = surface.with_lock(|px| {
        (0..height as usize)
            .flat_map(|y| {
                (0..width as usize).map(move |x| {
                    let i = y * pitch + x * 3;
                    Color::RGB(px[i], px[i + 1], px[i + 2])
                })
            })
            .collect::<Vec<_>>()
    });

    Texture::new(width, height, texels)
}

pub(crate) struct Game<'tex> {
    map: GridMap,
    actor: Actor,
    wall: Texture,
    settings: Settings,
    frame: Framebuffer,
    /// Streaming RGB24 texture the framebuffer is uploaded into each frame.
    screen: render::Texture<'tex>,
    pub game_state: GameState,
    pub canvas: Canvas<Window>,
    pub update: bool,
}

impl<'tex> Game<'tex> {
    /// initialize game
    pub fn new(
        canvas: Canvas<Window>,
        screen: render::Texture<'tex>,
        map: GridMap,
        wall: Texture,
        settings: Settings,
    ) -> anyhow::Result<Self> {
        let spawn = map.spawn().context("no spawn in map")?;
        if !map.fits(spawn.pos, settings.half_width) {
            anyhow::bail!(
                "spawn at {} overlaps a wall with half-width {}",
                spawn.pos,
                settings.half_width
            );
        }
        let actor = Actor::new(spawn, settings.half_width);
        log::info!("spawning at {} facing {}", spawn.pos, spawn.angle);

        let game_state = if settings.show_minimap {
            GameState::Minimap
        } else {
            GameState::Playing
        };

        Ok(Self {
            frame: Framebuffer::new(settings.width, settings.height),
            map,
            actor,
            wall,
            settings,
            screen,
            game_state,
            canvas,
            update: true,
        })
    }

    /// handle key presses for while in "playing" state
    pub fn playing_key_once(&mut self, key: Keycode) {
        match key {
            // minimap toggle
            Keycode::M => {
                if self.game_state == GameState::Minimap {
                    self.game_state = GameState::Playing
                } else {
                    self.game_state = GameState::Minimap;
                }
                log::debug!("now {:?}", self.game_state);
            }
            Keycode::F => {
                self.settings.show_fov = !self.settings.show_fov;
                log::debug!("fov edges shown: {}", self.settings.show_fov);
            }
            Keycode::Q | Keycode::Escape => self.game_state = GameState::Exit,
            _ => {}
        }
    }

    /// handle key repeating for while in "playing" state
    pub fn playing_key(&mut self, key: Keycode) {
        let intent = match key {
            Keycode::W => Intent::Forward,
            Keycode::S => Intent::Back,
            Keycode::A => Intent::StrafeLeft,
            Keycode::D => Intent::StrafeRight,
            Keycode::Z | Keycode::Left => Intent::TurnLeft,
            Keycode::C | Keycode::Right => Intent::TurnRight,
            _ => return,
        };

        self.actor.apply(intent, &self.settings, &self.map);
    }

    // draw while in "playing" state
    pub fn playing_draw(&mut self) -> anyhow::Result<()> {
        render_frame(
            &mut self.frame,
            &self.map,
            &self.actor,
            &self.wall,
            &self.settings,
        );

        if self.game_state == GameState::Minimap {
            draw_minimap(&mut self.frame, &self.map, &self.actor, &self.settings);
        }

        self.screen.update(None, self.frame.as_bytes(), self.frame.pitch())?;
        self.canvas.copy(&self.screen, None, None).ah()?;

        Ok(())
    }
}
