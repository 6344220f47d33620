use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

const THREE_FRAC_PI_2: f32 = 3. * FRAC_PI_2;

/// The eight angle ranges a ray can fall in.
///
/// Quadrants are open intervals shrunk by `eps` on both sides, so `tan` and its
/// reciprocal are only ever evaluated away from their poles. The axial bands
/// are closed intervals of width `2 * eps` centred on the axes and use pure
/// axial steps. Quadrant variants carry the angle reduced into `(0, PI/2)`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Octant {
    PosX,
    Quadrant1 { psi: f32 },
    PosY,
    Quadrant2 { psi: f32 },
    NegX,
    Quadrant3 { psi: f32 },
    NegY,
    Quadrant4 { psi: f32 },
}

impl Octant {
    /// Panics when `theta` lands in no band, which only happens for NaN input.
    pub fn classify(theta: f32, eps: f32) -> Self {
        debug_assert!(eps > 0. && eps < FRAC_PI_4, "column step out of range: {eps}");

        let t = theta.rem_euclid(TAU);
        if t <= eps || t >= TAU - eps {
            Octant::PosX
        } else if t < FRAC_PI_2 - eps {
            Octant::Quadrant1 { psi: t }
        } else if t <= FRAC_PI_2 + eps {
            Octant::PosY
        } else if t < PI - eps {
            Octant::Quadrant2 { psi: t - FRAC_PI_2 }
        } else if t <= PI + eps {
            Octant::NegX
        } else if t < THREE_FRAC_PI_2 - eps {
            Octant::Quadrant3 { psi: t - PI }
        } else if t <= THREE_FRAC_PI_2 + eps {
            Octant::NegY
        } else if t < TAU - eps {
            Octant::Quadrant4 {
                psi: t - THREE_FRAC_PI_2,
            }
        } else {
            unreachable!("degenerate angle range: {theta} fell outside every octant")
        }
    }

    /// First crossing and per-step delta of both grid-line families.
    ///
    /// In the quadrants the first family walks the vertical lines (`x` is an
    /// integer, `step.x` is `±1`) and the second walks the horizontal lines.
    /// The axial bands walk the one family the ray actually crosses, with the
    /// second sequence running one cell ahead of the first.
    pub fn families(self, origin: Vec2) -> (Family, Family) {
        let Vec2 { x, y } = origin;
        let left = x.floor();
        let top = y.floor();
        let right = left + 1.;
        let bottom = top + 1.;

        match self {
            Octant::PosX => (
                Family::new(right, y, 1., 0.),
                Family::new(right + 1., y, 1., 0.),
            ),
            Octant::Quadrant1 { psi } => {
                let a = psi.tan();
                let b = a.recip();
                (
                    Family::new(right, y + (right - x) * a, 1., a),
                    Family::new(x + (bottom - y) * b, bottom, b, 1.),
                )
            }
            Octant::PosY => (
                Family::new(x, bottom, 0., 1.),
                Family::new(x, bottom + 1., 0., 1.),
            ),
            Octant::Quadrant2 { psi } => {
                let a = psi.tan().recip();
                let b = -psi.tan();
                (
                    Family::new(left, y + (x - left) * a, -1., a),
                    Family::new(x + (bottom - y) * b, bottom, b, 1.),
                )
            }
            Octant::NegX => (
                Family::new(left, y, -1., 0.),
                Family::new(left - 1., y, -1., 0.),
            ),
            Octant::Quadrant3 { psi } => {
                let a = -psi.tan();
                let b = -psi.tan().recip();
                (
                    Family::new(left, y + (x - left) * a, -1., a),
                    Family::new(x + (y - top) * b, top, b, -1.),
                )
            }
            Octant::NegY => (
                Family::new(x, top, 0., -1.),
                Family::new(x, top - 1., 0., -1.),
            ),
            Octant::Quadrant4 { psi } => {
                let a = -psi.tan().recip();
                let b = psi.tan();
                (
                    Family::new(right, y + (right - x) * a, 1., a),
                    Family::new(x + (y - top) * b, top, b, -1.),
                )
            }
        }
    }
}

/// An arithmetic sequence of grid crossings: `start + k * step` for `k >= 0`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Family {
    pub start: Vec2,
    pub step: Vec2,
}

impl Family {
    fn new(x: f32, y: f32, dx: f32, dy: f32) -> Self {
        Self {
            start: Vec2::new(x, y),
            step: Vec2::new(dx, dy),
        }
    }

    pub fn point(&self, k: u32) -> Vec2 {
        self.start + self.step * k as f32
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RayCast {
    pub octant: Octant,
    pub vertical: Family,
    pub horizontal: Family,
}

/// Decomposes the ray leaving `origin` at `theta` into its two crossing
/// sequences. `eps` is the angle between neighbouring screen columns.
pub fn cast(origin: Vec2, theta: f32, eps: f32) -> RayCast {
    let octant = Octant::classify(theta, eps);
    let (vertical, horizontal) = octant.families(origin);

    RayCast {
        octant,
        vertical,
        horizontal,
    }
}
