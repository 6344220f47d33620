use crate::config::Settings;
use crate::map::{Cell, GridMap};
use crate::movement::Actor;
use crate::projector::{perpendicular, segment_height, texture_u, WallSpan};
use crate::ray::cast;
use crate::texture::{Sampler, PALETTE};
use crate::trace::{trace, Hit};
use glam::Vec2;
use sdl2::pixels::Color;

/// Pixel sink the renderer draws into. Writes outside the surface are dropped.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn set_pixel(&mut self, x: i32, y: i32, color: Color);

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        let (sw, sh) = self.size();
        let (x0, y0) = (x.max(0), y.max(0));
        let x1 = x.saturating_add(w as i32).min(sw as i32);
        let y1 = y.saturating_add(h as i32).min(sh as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.set_pixel(px, py, color);
            }
        }
    }

    fn outline_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        if w == 0 || h == 0 {
            return;
        }
        let (right, bottom) = (x + w as i32 - 1, y + h as i32 - 1);
        for px in x..=right {
            self.set_pixel(px, y, color);
            self.set_pixel(px, bottom, color);
        }
        for py in y..=bottom {
            self.set_pixel(x, py, color);
            self.set_pixel(right, py, color);
        }
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        let delta = to - from;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.) as u32;
        for i in 0..=steps {
            let p = from + delta * (i as f32 / steps as f32);
            self.set_pixel(p.x.round() as i32, p.y.round() as i32, color);
        }
    }
}

/// Packed RGB24 pixels, row-major, ready for a streaming texture upload.
#[derive(Clone, PartialEq, Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 3) as usize],
        }
    }

    pub fn pitch(&self) -> usize {
        self.width as usize * 3
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) as usize * 3;
        Some(Color::RGB(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
        ))
    }
}

impl Surface for Framebuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let i = (y as u32 * self.width + x as u32) as usize * 3;
        self.pixels[i] = color.r;
        self.pixels[i + 1] = color.g;
        self.pixels[i + 2] = color.b;
    }
}

/// Everything needed to draw one screen column.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Column {
    pub angle: f32,
    pub hit: Hit,
    pub distance: f32,
    pub perpendicular: f32,
    pub span: WallSpan,
    pub u: u32,
}

fn first_hit(map: &GridMap, origin: Vec2, angle: f32, eps: f32) -> Option<Hit> {
    trace(map, origin, &cast(origin, angle, eps), eps, map.trace_budget())
}

/// Angle of the ray through screen column `column`.
pub fn column_angle(actor: &Actor, settings: &Settings, column: u32) -> f32 {
    actor.angle - settings.fov_rad() / 2. + column as f32 * settings.column_step()
}

/// Casts, traces and projects a single ray. `None` when the ray escapes the map.
pub fn cast_column(
    map: &GridMap,
    actor: &Actor,
    settings: &Settings,
    angle: f32,
    tex_width: u32,
) -> Option<Column> {
    let hit = first_hit(map, actor.pos, angle, settings.column_step())?;

    let distance = hit.distance(actor.pos);
    let perpendicular = perpendicular(distance, angle, actor.angle);
    let span = WallSpan::new(segment_height(perpendicular, settings.height), settings.horizon);

    Some(Column {
        angle,
        hit,
        distance,
        perpendicular,
        span,
        u: texture_u(hit.point, tex_width),
    })
}

/// Draws the first-person view: ceiling and floor bands, then one textured
/// wall strip per column, left to right.
pub fn render_frame(
    surface: &mut impl Surface,
    map: &GridMap,
    actor: &Actor,
    texture: &impl Sampler,
    settings: &Settings,
) {
    let (width, height) = surface.size();
    let horizon = settings.horizon;
    surface.fill_rect(0, 0, width, horizon.max(0) as u32, settings.ceiling);
    surface.fill_rect(
        0,
        horizon,
        width,
        (height as i32 - horizon).max(0) as u32,
        settings.floor,
    );

    let (tex_width, tex_height) = texture.size();
    for vx in 0..width.min(settings.width) {
        let angle = column_angle(actor, settings, vx);
        let Some(column) = cast_column(map, actor, settings, angle, tex_width) else {
            log::trace!("column {vx} at {angle} found no wall");
            continue;
        };

        for vy in column.span.visible(height) {
            let color = texture.texel(column.u, column.span.texture_v(vy, tex_height));
            surface.set_pixel(vx as i32, vy, color);
        }
    }
}

/// Overhead view in the top-left corner: tiles, the footprint, the centre ray
/// and the cell it hits, and the field-of-view edges when enabled.
pub fn draw_minimap(surface: &mut impl Surface, map: &GridMap, actor: &Actor, settings: &Settings) {
    let scale = settings.minimap_scale;
    let s = scale as f32;

    for (cell, kind) in map.cells() {
        let color = match kind {
            Cell::Wall => PALETTE[1],
            Cell::Open => PALETTE[15],
        };
        surface.fill_rect(cell.x * scale as i32, cell.y * scale as i32, scale, scale, color);
    }

    let origin = actor.pos * s;
    let eps = settings.column_step();
    if let Some(hit) = first_hit(map, actor.pos, actor.angle, eps) {
        surface.draw_line(origin, hit.point * s, PALETTE[8]);
        surface.outline_rect(
            hit.cell.x * scale as i32,
            hit.cell.y * scale as i32,
            scale,
            scale,
            PALETTE[8],
        );
    }

    if settings.show_fov {
        let left = actor.angle - settings.fov_rad() / 2.;
        for (angle, color) in [(left, PALETTE[5]), (left + settings.fov_rad(), PALETTE[11])] {
            if let Some(hit) = first_hit(map, actor.pos, angle, eps) {
                surface.draw_line(origin, hit.point * s, color);
            }
        }
    }

    let r = actor.half_width;
    let footprint = ((actor.pos - r) * s).round();
    let side = (2. * r * s).round().max(1.) as u32;
    surface.fill_rect(footprint.x as i32, footprint.y as i32, side, side, PALETTE[8]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::Texture;

    const ROOM: &str = "#######\n#     #\n#     #\n#     #\n#######";

    fn setup() -> (GridMap, Actor, Settings, Texture) {
        let map = GridMap::parse(ROOM).unwrap();
        let actor = Actor {
            pos: Vec2::new(3.5, 2.5),
            angle: 0.,
            half_width: 0.25,
        };
        let settings = Settings {
            width: 64,
            height: 48,
            horizon: 24,
            ..Default::default()
        };
        let texture = Texture::parse_palette("3\n").unwrap();
        (map, actor, settings, texture)
    }

    #[test]
    fn columns_sweep_the_field_of_view() {
        let (_, actor, settings, _) = setup();
        let first = column_angle(&actor, &settings, 0);
        assert!((first + settings.fov_rad() / 2.).abs() < 1e-6);
        let mid = column_angle(&actor, &settings, settings.width / 2);
        assert!(mid.abs() < 1e-6);
    }

    #[test]
    fn centre_column_faces_the_east_wall() {
        let (map, actor, settings, texture) = setup();
        let column = cast_column(&map, &actor, &settings, actor.angle, texture.size().0).unwrap();
        assert_eq!(column.hit.cell, glam::IVec2::new(6, 2));
        assert_eq!(column.distance, 2.5);
        assert_eq!(column.perpendicular, column.distance);
        assert_eq!(column.span.height, 2. * 48. / 2.5);
        assert_eq!((column.span.top, column.span.bottom), (5, 43));
    }

    #[test]
    fn frame_has_bands_and_wall() {
        let (map, actor, settings, texture) = setup();
        let mut fb = Framebuffer::new(settings.width, settings.height);
        render_frame(&mut fb, &map, &actor, &texture, &settings);

        let wall = PALETTE[3];
        assert_eq!(fb.pixel(32, 0), Some(settings.ceiling));
        assert_eq!(fb.pixel(32, 47), Some(settings.floor));
        assert_eq!(fb.pixel(32, 24), Some(wall));
        assert_eq!(fb.pixel(32, 5), Some(wall));
        assert_eq!(fb.pixel(32, 4), Some(settings.ceiling));
        for x in 0..settings.width {
            assert_eq!(fb.pixel(x, 24), Some(wall), "column {x}");
        }
    }

    #[test]
    fn minimap_marks_walls_and_actor() {
        let (map, actor, settings, _) = setup();
        let mut fb = Framebuffer::new(settings.width, settings.height);
        draw_minimap(&mut fb, &map, &actor, &settings);

        assert_eq!(fb.pixel(0, 0), Some(PALETTE[1]));
        assert_eq!(fb.pixel(5, 5), Some(PALETTE[15]));
        assert_eq!(fb.pixel(14, 10), Some(PALETTE[8]));
        assert_eq!(fb.pixel(20, 10), Some(PALETTE[8]));
    }

    #[test]
    fn writes_outside_are_dropped() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel(-1, 0, PALETTE[7]);
        fb.set_pixel(4, 0, PALETTE[7]);
        fb.fill_rect(-10, -10, 100, 100, PALETTE[7]);
        assert!((0..4).all(|y| (0..4).all(|x| fb.pixel(x, y) == Some(PALETTE[7]))));
        assert_eq!(fb.pixel(4, 0), None);
        assert_eq!(fb.as_bytes().len(), 4 * fb.pitch());
    }
}
