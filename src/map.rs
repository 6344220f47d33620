use anyhow::Context;
use glam::{IVec2, Vec2};
use sdl2::pixels::Color;
use std::collections::HashMap;
use std::fmt;
use std::fs::read_to_string;
use std::path::Path;

pub(crate) fn parse_hex_color(hex: &str) -> anyhow::Result<Color> {
    if hex.len() != 7 || !hex.is_ascii() || !hex.starts_with('#') {
        anyhow::bail!("not a hex string: {hex}");
    }

    let r = u8::from_str_radix(&hex[1..=2], 16)?;
    let g = u8::from_str_radix(&hex[3..=4], 16)?;
    let b = u8::from_str_radix(&hex[5..=6], 16)?;

    Ok(Color::RGB(r, g, b))
}

/// Load-time failures of a map description.
#[derive(Clone, Debug, PartialEq)]
pub enum MapError {
    Empty,
    UnknownTile {
        row: usize,
        column: usize,
        tile: char,
    },
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    NoOpenCell,
    BlockedSpawn {
        x: f32,
        y: f32,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Empty => write!(f, "map has no rows"),
            MapError::UnknownTile { row, column, tile } => {
                write!(f, "invalid tile in map at row {row}, column {column}: {tile:?}")
            }
            MapError::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "map row {row} is {found} cells wide, expected {expected}"
            ),
            MapError::NoOpenCell => write!(f, "map has no open cell to stand in"),
            MapError::BlockedSpawn { x, y } => {
                write!(f, "spawn ({x}, {y}) is not in an open cell")
            }
        }
    }
}

impl std::error::Error for MapError {}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Wall,
    Open,
}

/// Where the actor starts, in cell units, facing `angle` radians.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Spawn {
    pub pos: Vec2,
    pub angle: f32,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    spawn: Option<Spawn>,
    pub ceiling: Option<Color>,
    pub floor: Option<Color>,
}

impl GridMap {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("loading map at {}", path.display());
        let file = read_to_string(path)
            .with_context(|| format!("could not read map {}", path.display()))?;
        let this = Self::parse(&file).with_context(|| format!("in map {}", path.display()))?;
        log::info!("map is {}x{} cells", this.width, this.height);

        Ok(this)
    }

    /// Parses either a bare grid or a `!!!!META` / `!!!!MAIN` sectioned file.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut lines = text.lines();
        let mut this = Self::default();

        if !text.starts_with("!!!!") {
            this.parse_main(&mut lines, false)?;
            return this.finish();
        }

        while let Some(line) = lines.by_ref().next() {
            match line {
                "!!!!META" => this.parse_meta(&mut lines)?,
                "!!!!MAIN" => this.parse_main(&mut lines, true)?,
                "" => {}
                other => anyhow::bail!("unrecognized directive: {other}"),
            }
        }

        this.finish()
    }

    fn parse_meta<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
    ) -> anyhow::Result<()> {
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let mut chunks = line.split(',');
            let directive = chunks.by_ref().next().unwrap_or_default();
            let params = chunks
                .map(|param| param.split_once('='))
                .collect::<Option<HashMap<_, _>>>()
                .context("incorrectly formatted meta")?;
            match directive {
                "spawn" => {
                    let x = params.get("x").context("spawn needs x")?.parse::<f32>()?;
                    let y = params.get("y").context("spawn needs y")?.parse::<f32>()?;
                    let angle = params.get("angle").unwrap_or(&"0").parse::<f32>()?;
                    self.spawn = Some(Spawn {
                        pos: Vec2::new(x, y),
                        angle: angle.to_radians(),
                    });
                }
                "colors" => {
                    if let Some(hex) = params.get("ceiling") {
                        self.ceiling = Some(parse_hex_color(hex)?);
                    }
                    if let Some(hex) = params.get("floor") {
                        self.floor = Some(parse_hex_color(hex)?);
                    }
                }
                other => anyhow::bail!("unrecognized meta directive: {other}"),
            }
        }

        Ok(())
    }

    /// A blank line closes a `!!!!MAIN` section. A bare grid may only be
    /// followed by blank lines.
    fn parse_main<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
        sectioned: bool,
    ) -> anyhow::Result<()> {
        let mut height = 0;
        let mut width = None;
        let mut cells = vec![];
        let mut marker = None;

        while let Some(line) = lines.next() {
            if line.is_empty() {
                if !sectioned && lines.any(|rest| !rest.is_empty()) {
                    return Err(MapError::Ragged {
                        row: height,
                        expected: width.unwrap_or(0),
                        found: 0,
                    }
                    .into());
                }
                break;
            }

            let mut found = 0;
            for (column, tile) in line.chars().enumerate() {
                cells.push(match tile {
                    '#' => Cell::Wall,
                    ' ' => Cell::Open,
                    '*' => {
                        marker.get_or_insert(IVec2::new(column as i32, height as i32));
                        Cell::Open
                    }
                    other => {
                        return Err(MapError::UnknownTile {
                            row: height,
                            column,
                            tile: other,
                        }
                        .into())
                    }
                });
                found += 1;
            }

            let expected = *width.get_or_insert(found);
            if found != expected {
                return Err(MapError::Ragged {
                    row: height,
                    expected,
                    found,
                }
                .into());
            }
            height += 1;
        }

        self.width = width.unwrap_or(0);
        self.height = height;
        self.cells = cells;
        if self.spawn.is_none() {
            self.spawn = marker.map(|cell| Spawn {
                pos: cell.as_vec2() + 0.5,
                angle: 0.,
            });
        }

        Ok(())
    }

    fn finish(mut self) -> anyhow::Result<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::Empty.into());
        }

        if self.spawn.is_none() {
            let idx = self
                .cells
                .iter()
                .position(|cell| *cell == Cell::Open)
                .ok_or(MapError::NoOpenCell)?;
            self.spawn = Some(Spawn {
                pos: self.idx_to_cell(idx).as_vec2() + 0.5,
                angle: 0.,
            });
        }

        if let Some(Spawn { pos, .. }) = self.spawn {
            let cell = pos.floor();
            if self.cell(cell.x as i32, cell.y as i32) != Some(Cell::Open) {
                return Err(MapError::BlockedSpawn { x: pos.x, y: pos.y }.into());
            }
        }

        if !self.is_enclosed() {
            log::warn!("map border is not all wall, rays may leave the grid");
        }

        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn spawn(&self) -> Option<Spawn> {
        self.spawn
    }

    fn idx_to_cell(&self, idx: usize) -> IVec2 {
        IVec2::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    /// `None` outside the grid.
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.cells[y as usize * self.width + x as usize])
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.cell(x, y) == Some(Cell::Wall)
    }

    /// Wall test for the cell containing a continuous point.
    pub fn wall_at(&self, pos: Vec2) -> bool {
        let cell = pos.floor();
        self.is_wall(cell.x as i32, cell.y as i32)
    }

    /// Whether a square footprint of half-width `half_width` centred on
    /// `pos` lies entirely in open cells of the grid.
    pub fn fits(&self, pos: Vec2, half_width: f32) -> bool {
        let (lo, hi) = ((pos - half_width).floor(), (pos + half_width).floor());
        (lo.y as i32..=hi.y as i32)
            .all(|y| (lo.x as i32..=hi.x as i32).all(|x| self.cell(x, y) == Some(Cell::Open)))
    }

    pub fn cells(&self) -> impl Iterator<Item = (IVec2, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (self.idx_to_cell(idx), *cell))
    }

    pub fn is_enclosed(&self) -> bool {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..w).all(|x| self.is_wall(x, 0) && self.is_wall(x, h - 1))
            && (0..h).all(|y| self.is_wall(0, y) && self.is_wall(w - 1, y))
    }

    /// Upper bound on the cells a ray can test before both cursors leave the grid.
    pub fn trace_budget(&self) -> usize {
        2 * (self.width + self.height) + 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "#####\n#   #\n# * #\n#   #\n#####\n";

    #[test]
    fn parses_plain_grid() {
        let map = GridMap::parse(ROOM).unwrap();
        assert_eq!((map.width(), map.height()), (5, 5));
        assert!(map.is_wall(0, 0));
        assert!(!map.is_wall(2, 2));
        assert!(map.is_enclosed());
        assert_eq!(map.spawn().unwrap().pos, Vec2::new(2.5, 2.5));
    }

    #[test]
    fn outside_is_open_void() {
        let map = GridMap::parse(ROOM).unwrap();
        assert_eq!(map.cell(-1, 0), None);
        assert_eq!(map.cell(5, 5), None);
        assert!(!map.is_wall(-1, 2));
    }

    #[test]
    fn rejects_unknown_tile() {
        let err = GridMap::parse("###\n#x#\n###").unwrap_err();
        assert_eq!(
            err.downcast_ref::<MapError>(),
            Some(&MapError::UnknownTile {
                row: 1,
                column: 1,
                tile: 'x'
            })
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = GridMap::parse("###\n# \n###").unwrap_err();
        assert_eq!(
            err.downcast_ref::<MapError>(),
            Some(&MapError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn blank_line_inside_a_bare_grid_is_ragged() {
        let err = GridMap::parse("#####\n#   #\n\n#   #\n#####").unwrap_err();
        assert_eq!(
            err.downcast_ref::<MapError>(),
            Some(&MapError::Ragged {
                row: 2,
                expected: 5,
                found: 0
            })
        );

        let map = GridMap::parse("###\n# #\n###\n\n\n").unwrap();
        assert_eq!(map.height(), 3);
    }

    #[test]
    fn rejects_spawn_outside_open_cells() {
        let grid = "\n!!!!MAIN\n####\n#  #\n####\n";
        for spawn in ["spawn,x=0.5,y=0.5", "spawn,x=9,y=1.5", "spawn,x=-1,y=1.5"] {
            let text = format!("!!!!META\n{spawn}\n{grid}");
            let err = GridMap::parse(&text).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<MapError>(), Some(MapError::BlockedSpawn { .. })),
                "{spawn} accepted"
            );
        }
    }

    #[test]
    fn footprint_fit() {
        let map = GridMap::parse("####\n#  #\n####").unwrap();
        assert!(map.fits(Vec2::new(1.5, 1.5), 0.25));
        assert!(map.fits(Vec2::new(2.0, 1.5), 0.25));
        assert!(!map.fits(Vec2::new(1.1, 1.5), 0.25));
        assert!(!map.fits(Vec2::new(1.5, 1.8), 0.25));
        assert!(!map.fits(Vec2::new(9., 9.), 0.25));
    }

    #[test]
    fn rejects_empty_and_solid_maps() {
        let err = GridMap::parse("").unwrap_err();
        assert_eq!(err.downcast_ref::<MapError>(), Some(&MapError::Empty));

        let err = GridMap::parse("##\n##").unwrap_err();
        assert_eq!(err.downcast_ref::<MapError>(), Some(&MapError::NoOpenCell));
    }

    #[test]
    fn falls_back_to_first_open_cell() {
        let map = GridMap::parse("####\n#  #\n####").unwrap();
        assert_eq!(map.spawn().unwrap().pos, Vec2::new(1.5, 1.5));
    }

    #[test]
    fn reads_sectioned_file() {
        let text = "!!!!META\nspawn,x=2,y=1.5,angle=90\ncolors,ceiling=#102030,floor=#A0B0C0\n\n!!!!MAIN\n####\n#  #\n####\n";
        let map = GridMap::parse(text).unwrap();
        let spawn = map.spawn().unwrap();
        assert_eq!(spawn.pos, Vec2::new(2., 1.5));
        assert!((spawn.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(map.ceiling, Some(Color::RGB(0x10, 0x20, 0x30)));
        assert_eq!(map.floor, Some(Color::RGB(0xA0, 0xB0, 0xC0)));
        assert_eq!(map.width(), 4);
    }

    #[test]
    fn rejects_unknown_directives() {
        assert!(GridMap::parse("!!!!FOO\n").is_err());
        assert!(GridMap::parse("!!!!META\nfog,dof=4\n\n!!!!MAIN\n###\n# #\n###").is_err());
    }

    #[test]
    fn detects_open_border() {
        let map = GridMap::parse("### \n#  #\n####").unwrap();
        assert!(!map.is_enclosed());
    }

    #[test]
    fn shipped_map_is_playable() {
        let map = GridMap::parse(include_str!("../map/map.txt")).unwrap();
        assert!(map.is_enclosed());
        let spawn = map.spawn().unwrap();
        assert!(map.fits(spawn.pos, 0.25));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#E9C35B").unwrap(), Color::RGB(0xE9, 0xC3, 0x5B));
        assert!(parse_hex_color("E9C35B").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
    }
}
