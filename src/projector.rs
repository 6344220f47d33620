use glam::Vec2;

/// Which grid line a hit lies on. `Vertical` faces sit on `x = integer`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Face {
    Vertical,
    Horizontal,
}

/// Classifies a hit point by its position inside its cell.
///
/// A point on a horizontal line has `fy` at 0 (or just under 1) while `fx` is
/// anywhere in between, which puts it inside one of the two triangles touching
/// the top and bottom edges of the unit square. Everything else is on a
/// vertical line.
pub fn face_of(point: Vec2) -> Face {
    let f = point - point.floor();
    if (f.y < f.x && f.x < 1. - f.y) || (f.y > f.x && f.x > 1. - f.y) {
        Face::Horizontal
    } else {
        Face::Vertical
    }
}

/// Texture column for a hit point.
pub fn texture_u(point: Vec2, tex_width: u32) -> u32 {
    let f = point - point.floor();
    let along = match face_of(point) {
        Face::Horizontal => f.x,
        Face::Vertical => f.y,
    };
    ((along * tex_width as f32) as u32).min(tex_width.saturating_sub(1))
}

/// Distance along the camera's forward axis, which keeps straight walls straight.
pub fn perpendicular(distance: f32, column_angle: f32, camera_angle: f32) -> f32 {
    distance * (column_angle - camera_angle).cos()
}

/// On-screen height of a wall at forward distance `p`. A wall two cells away
/// fills the screen.
pub fn segment_height(p: f32, screen_height: u32) -> f32 {
    2. * screen_height as f32 / p.max(f32::MIN_POSITIVE)
}

/// Vertical pixel run of one wall strip, centred on the horizon. Rows are
/// half-open: `top..bottom`. Either end may lie off screen.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WallSpan {
    pub height: f32,
    pub top: i32,
    pub bottom: i32,
}

impl WallSpan {
    pub fn new(height: f32, horizon: i32) -> Self {
        let half = (height / 2.).floor() as i32;
        Self {
            height,
            top: horizon.saturating_sub(half),
            bottom: horizon.saturating_add(half),
        }
    }

    /// Rows of the span that fall on a screen `screen_height` pixels tall.
    pub fn visible(&self, screen_height: u32) -> std::ops::Range<i32> {
        self.top.max(0)..self.bottom.min(screen_height as i32)
    }

    /// Texture row for screen row `row`.
    pub fn texture_v(&self, row: i32, tex_height: u32) -> u32 {
        let offset = (row as f32 - self.top as f32) / self.height;
        ((offset * tex_height as f32) as u32).min(tex_height.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_follow_the_crossed_line() {
        assert_eq!(face_of(Vec2::new(2.0, 2.9)), Face::Vertical);
        assert_eq!(face_of(Vec2::new(2.1, 3.0)), Face::Horizontal);
        assert_eq!(face_of(Vec2::new(2.999_99, 2.4)), Face::Vertical);
        assert_eq!(face_of(Vec2::new(2.1, 2.999_99)), Face::Horizontal);
        assert_eq!(face_of(Vec2::new(3.7, 1.000_01)), Face::Horizontal);
    }

    #[test]
    fn near_corner_picks_the_approach_face() {
        // entering (3, 2) from the left just below its top-left corner
        assert_eq!(face_of(Vec2::new(3.0, 2.02)), Face::Vertical);
        // entering (3, 2) from above just right of the same corner
        assert_eq!(face_of(Vec2::new(3.02, 2.0)), Face::Horizontal);
    }

    #[test]
    fn texture_columns() {
        assert_eq!(texture_u(Vec2::new(4.0, 1.25), 16), 4);
        assert_eq!(texture_u(Vec2::new(1.5, 7.0), 16), 8);
        assert_eq!(texture_u(Vec2::new(1.999_999, 7.0), 16), 15);
    }

    #[test]
    fn centre_column_is_not_corrected() {
        let d = 3.217;
        assert_eq!(perpendicular(d, 1.3, 1.3), d);
        assert!(perpendicular(d, 1.3 + 0.5, 1.3) < d);
    }

    #[test]
    fn span_is_centred_on_horizon() {
        let h = segment_height(2., 240);
        assert_eq!(h, 240.);
        let span = WallSpan::new(h, 120);
        assert_eq!((span.top, span.bottom), (0, 240));
        assert_eq!(span.visible(240), 0..240);

        let span = WallSpan::new(25., 100);
        assert_eq!((span.top, span.bottom), (88, 112));
    }

    #[test]
    fn touching_wall_clips_to_screen() {
        let span = WallSpan::new(segment_height(0., 240), 120);
        assert_eq!(span.visible(240), 0..240);
        assert!(span.texture_v(120, 16) < 16);
    }

    #[test]
    fn texture_rows_cover_the_span() {
        let span = WallSpan::new(64., 120);
        assert_eq!(span.texture_v(span.top, 16), 0);
        assert_eq!(span.texture_v(span.top + 32, 16), 8);
        assert_eq!(span.texture_v(span.bottom - 1, 16), 15);
    }
}
