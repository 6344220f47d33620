use crate::config::Settings;
use crate::map::{GridMap, Spawn};
use glam::Vec2;

/// Gap left between a blocked actor and the wall face, so the next tick's
/// corner test lands back in the open cell.
pub const CLAMP_EPSILON: f32 = 1e-3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

/// The player: a square footprint of half-width `half_width` centred on `pos`.
///
/// `angle` is never wrapped; the ray caster normalises it.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Actor {
    pub pos: Vec2,
    pub angle: f32,
    pub half_width: f32,
}

impl Actor {
    pub fn new(spawn: Spawn, half_width: f32) -> Self {
        Self {
            pos: spawn.pos,
            angle: spawn.angle,
            half_width,
        }
    }

    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Screen-right with y growing downwards.
    pub fn right(&self) -> Vec2 {
        self.forward().perp()
    }

    pub fn apply(&mut self, intent: Intent, settings: &Settings, map: &GridMap) {
        let speed = settings.walk_speed;
        match intent {
            Intent::Forward => self.walk(map, self.forward() * speed),
            Intent::Back => self.walk(map, -self.forward() * speed),
            Intent::StrafeRight => self.walk(map, self.right() * speed),
            Intent::StrafeLeft => self.walk(map, -self.right() * speed),
            Intent::TurnLeft => self.angle -= settings.turn_step(),
            Intent::TurnRight => self.angle += settings.turn_step(),
        }
    }

    /// Resolves `delta` as an x move followed by a y move, each sliding along
    /// whatever wall blocks it.
    pub fn walk(&mut self, map: &GridMap, delta: Vec2) {
        if delta.x < 0. {
            self.walk_west(map, -delta.x);
        } else if delta.x > 0. {
            self.walk_east(map, delta.x);
        }

        if delta.y < 0. {
            self.walk_north(map, -delta.y);
        } else if delta.y > 0. {
            self.walk_south(map, delta.y);
        }
    }

    /// Rows touched by the footprint's top and bottom edges.
    fn rows(&self) -> (i32, i32) {
        (
            (self.pos.y - self.half_width).floor() as i32,
            (self.pos.y + self.half_width).floor() as i32,
        )
    }

    /// Columns touched by the footprint's left and right edges.
    fn columns(&self) -> (i32, i32) {
        (
            (self.pos.x - self.half_width).floor() as i32,
            (self.pos.x + self.half_width).floor() as i32,
        )
    }

    pub fn walk_east(&mut self, map: &GridMap, d: f32) {
        debug_assert!(d >= 0., "negative move {d}");
        let (top, bottom) = self.rows();
        let edge = self.pos.x + self.half_width;
        // an edge resting on a face still has that face's cell ahead of it
        let first = edge.ceil() as i32;
        let last = (edge + d).floor() as i32;

        match (first..=last).find(|&x| map.is_wall(x, top) || map.is_wall(x, bottom)) {
            Some(x) => {
                self.pos.x = self
                    .pos
                    .x
                    .max(x as f32 - self.half_width - CLAMP_EPSILON)
            }
            None => self.pos.x += d,
        }
    }

    pub fn walk_west(&mut self, map: &GridMap, d: f32) {
        debug_assert!(d >= 0., "negative move {d}");
        let (top, bottom) = self.rows();
        let edge = self.pos.x - self.half_width;
        let first = edge.floor() as i32 - 1;
        let last = (edge - d).floor() as i32;

        match (last..=first)
            .rev()
            .find(|&x| map.is_wall(x, top) || map.is_wall(x, bottom))
        {
            Some(x) => {
                self.pos.x = self
                    .pos
                    .x
                    .min((x + 1) as f32 + self.half_width + CLAMP_EPSILON)
            }
            None => self.pos.x -= d,
        }
    }

    pub fn walk_south(&mut self, map: &GridMap, d: f32) {
        debug_assert!(d >= 0., "negative move {d}");
        let (left, right) = self.columns();
        let edge = self.pos.y + self.half_width;
        let first = edge.ceil() as i32;
        let last = (edge + d).floor() as i32;

        match (first..=last).find(|&y| map.is_wall(left, y) || map.is_wall(right, y)) {
            Some(y) => {
                self.pos.y = self
                    .pos
                    .y
                    .max(y as f32 - self.half_width - CLAMP_EPSILON)
            }
            None => self.pos.y += d,
        }
    }

    pub fn walk_north(&mut self, map: &GridMap, d: f32) {
        debug_assert!(d >= 0., "negative move {d}");
        let (left, right) = self.columns();
        let edge = self.pos.y - self.half_width;
        let first = edge.floor() as i32 - 1;
        let last = (edge - d).floor() as i32;

        match (last..=first)
            .rev()
            .find(|&y| map.is_wall(left, y) || map.is_wall(right, y))
        {
            Some(y) => {
                self.pos.y = self
                    .pos
                    .y
                    .min((y + 1) as f32 + self.half_width + CLAMP_EPSILON)
            }
            None => self.pos.y -= d,
        }
    }
}
