use crate::map::GridMap;
use crate::ray::{Family, RayCast};
use glam::{IVec2, Vec2};

/// First wall cell along a ray and the exact crossing where the ray enters it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Hit {
    pub cell: IVec2,
    pub point: Vec2,
}

impl Hit {
    pub fn distance_squared(&self, origin: Vec2) -> f32 {
        self.point.distance_squared(origin)
    }

    pub fn distance(&self, origin: Vec2) -> f32 {
        self.point.distance(origin)
    }
}

/// Walks one family of crossings.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    pub point: Vec2,
    step: Vec2,
}

impl Cursor {
    pub fn new(family: Family) -> Self {
        Self {
            point: family.start,
            step: family.step,
        }
    }

    /// The cell just past the current crossing. The nudge follows the step but
    /// never exceeds `eps` on either axis, so shallow rays can't skip a column.
    pub fn entered_cell(&self, eps: f32) -> IVec2 {
        let nudge = self.step.clamp(Vec2::NEG_ONE, Vec2::ONE) * eps;
        (self.point + nudge).floor().as_ivec2()
    }

    pub fn advance(&mut self) {
        self.point += self.step;
    }
}

/// Tests cells in the order the ray passes through them by always stepping
/// whichever cursor is nearer to `origin`. The active cursor keeps the turn on
/// ties. Gives up with `None` after `budget` cells, which a map enclosed by
/// walls never reaches.
pub fn trace(
    map: &GridMap,
    origin: Vec2,
    ray: &RayCast,
    eps: f32,
    budget: usize,
) -> Option<Hit> {
    let mut cursors = [Cursor::new(ray.vertical), Cursor::new(ray.horizontal)];
    let mut active = 0;

    for _ in 0..budget {
        let other = 1 - active;
        if cursors[active].point.distance_squared(origin)
            > cursors[other].point.distance_squared(origin)
        {
            active = other;
        }

        let cursor = &mut cursors[active];
        let cell = cursor.entered_cell(eps);
        if map.is_wall(cell.x, cell.y) {
            return Some(Hit {
                cell,
                point: cursor.point,
            });
        }
        cursor.advance();
    }

    None
}
