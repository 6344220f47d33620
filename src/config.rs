use crate::map::GridMap;
use sdl2::pixels::Color;
use std::f32::consts::FRAC_PI_4;

/// Renderer and simulation tunables.
#[derive(Clone, PartialEq, Debug)]
pub struct Settings {
    /// Internal resolution in pixels; one ray per column.
    pub width: u32,
    pub height: u32,
    /// Window pixels per internal pixel.
    pub scale: u32,
    /// Screen row that infinitely distant walls shrink towards.
    pub horizon: i32,
    /// Field of view in degrees.
    pub fov: f32,
    /// Cells moved per tick while a move key is held.
    pub walk_speed: f32,
    /// Columns of view turned per tick while a turn key is held.
    pub turn_columns: f32,
    pub half_width: f32,
    pub minimap_scale: u32,
    pub show_minimap: bool,
    pub show_fov: bool,
    pub ceiling: Color,
    pub floor: Color,
    pub target_fps: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            scale: 2,
            horizon: 120,
            fov: 60.,
            walk_speed: 1. / 8.,
            turn_columns: 7.,
            half_width: 1. / 4.,
            minimap_scale: 4,
            show_minimap: true,
            show_fov: false,
            ceiling: Color::RGB(0xE9, 0xC3, 0x5B),
            floor: Color::RGB(0xD3, 0x84, 0x41),
            target_fps: 30,
        }
    }
}

impl Settings {
    /// Takes band colours from the map when it names them.
    pub fn with_map(mut self, map: &GridMap) -> Self {
        if let Some(ceiling) = map.ceiling {
            self.ceiling = ceiling;
        }
        if let Some(floor) = map.floor {
            self.floor = floor;
        }
        self
    }

    pub fn fov_rad(&self) -> f32 {
        self.fov.to_radians()
    }

    /// Angle between neighbouring columns, also the half-width of the axial
    /// ray bands.
    pub fn column_step(&self) -> f32 {
        self.fov_rad() / self.width as f32
    }

    pub fn turn_step(&self) -> f32 {
        self.turn_columns * self.column_step()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 || self.scale == 0 {
            anyhow::bail!(
                "resolution must be positive, got {}x{} at scale {}",
                self.width,
                self.height,
                self.scale
            );
        }
        if self.horizon < 0 || self.horizon >= self.height as i32 {
            anyhow::bail!("horizon {} is off a {} pixel screen", self.horizon, self.height);
        }
        if !(self.fov > 0. && self.fov < 180.) {
            anyhow::bail!("field of view must be between 0 and 180 degrees, got {}", self.fov);
        }
        if self.column_step() >= FRAC_PI_4 {
            anyhow::bail!(
                "{} columns are too few for a {} degree field of view",
                self.width,
                self.fov
            );
        }
        if !(self.half_width > 0. && self.half_width < 0.5) {
            anyhow::bail!("actor half-width must be in (0, 0.5), got {}", self.half_width);
        }
        if self.target_fps == 0 {
            anyhow::bail!("target fps must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert!((settings.column_step() - 60f32.to_radians() / 320.).abs() < 1e-9);
        assert!((settings.turn_step() - 7. * settings.column_step()).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_settings() {
        let bad = [
            Settings {
                width: 0,
                ..Default::default()
            },
            Settings {
                horizon: 240,
                ..Default::default()
            },
            Settings {
                fov: 180.,
                ..Default::default()
            },
            Settings {
                width: 1,
                ..Default::default()
            },
            Settings {
                half_width: 0.5,
                ..Default::default()
            },
        ];
        for settings in bad {
            assert!(settings.validate().is_err(), "{settings:?}");
        }
    }

    #[test]
    fn map_colours_override_defaults() {
        let map = GridMap::parse("!!!!META\ncolors,floor=#000000\n\n!!!!MAIN\n###\n# #\n###")
            .unwrap();
        let settings = Settings::default().with_map(&map);
        assert_eq!(settings.floor, Color::RGB(0, 0, 0));
        assert_eq!(settings.ceiling, Settings::default().ceiling);
    }
}
