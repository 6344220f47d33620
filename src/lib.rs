//! Grid raycasting: a 2D map of wall and open cells rendered as a first-person
//! view, one ray per screen column.

pub mod config;
pub mod map;
pub mod movement;
pub mod projector;
pub mod ray;
pub mod render;
pub mod texture;
pub mod trace;
