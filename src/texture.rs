use anyhow::Context;
use sdl2::pixels::Color;
use std::fs::read_to_string;
use std::path::Path;

/// 16-colour palette used by digit-grid textures and the minimap.
pub const PALETTE: [Color; 16] = [
    Color::RGB(0x00, 0x00, 0x00),
    Color::RGB(0x2B, 0x33, 0x5F),
    Color::RGB(0x7E, 0x20, 0x72),
    Color::RGB(0x19, 0x95, 0x9C),
    Color::RGB(0x8B, 0x48, 0x52),
    Color::RGB(0x39, 0x5C, 0x98),
    Color::RGB(0xA9, 0xC1, 0xFF),
    Color::RGB(0xEE, 0xEE, 0xEE),
    Color::RGB(0xD4, 0x18, 0x6C),
    Color::RGB(0xD3, 0x84, 0x41),
    Color::RGB(0xE9, 0xC3, 0x5B),
    Color::RGB(0x70, 0xC6, 0xA9),
    Color::RGB(0x76, 0x96, 0xDE),
    Color::RGB(0xA3, 0xA3, 0xA3),
    Color::RGB(0xFF, 0x97, 0x98),
    Color::RGB(0xED, 0xC7, 0xB0),
];

/// Texel lookup the renderer draws walls with.
pub trait Sampler {
    fn size(&self) -> (u32, u32);

    /// Coordinates outside the texture are clamped to its edge.
    fn texel(&self, tx: u32, ty: u32) -> Color;
}

#[derive(Clone, PartialEq, Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    texels: Vec<Color>,
}

impl Texture {
    /// Row-major texels.
    pub fn new(width: u32, height: u32, texels: Vec<Color>) -> anyhow::Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("texture must not be empty");
        }
        if texels.len() != (width * height) as usize {
            anyhow::bail!(
                "{width}x{height} texture given {} texels",
                texels.len()
            );
        }

        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Reads a grid of hexadecimal palette indices, one row per line.
    pub fn parse_palette(text: &str) -> anyhow::Result<Self> {
        let mut width = None;
        let mut height = 0;
        let mut texels = vec![];

        for (row, line) in text.lines().enumerate() {
            if line.is_empty() {
                break;
            }

            let before = texels.len();
            for (column, ch) in line.chars().enumerate() {
                let idx = ch
                    .to_digit(16)
                    .with_context(|| format!("bad texel {ch:?} at row {row}, column {column}"))?;
                texels.push(PALETTE[idx as usize]);
            }

            let found = (texels.len() - before) as u32;
            let expected = *width.get_or_insert(found);
            if found != expected {
                anyhow::bail!("texture row {row} is {found} texels wide, expected {expected}");
            }
            height += 1;
        }

        Self::new(width.unwrap_or(0), height, texels)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("loading palette texture at {}", path.display());
        let text = read_to_string(path)
            .with_context(|| format!("could not read texture {}", path.display()))?;
        Self::parse_palette(&text).with_context(|| format!("in texture {}", path.display()))
    }
}

impl Sampler for Texture {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn texel(&self, tx: u32, ty: u32) -> Color {
        let x = tx.min(self.width - 1);
        let y = ty.min(self.height - 1);
        self.texels[(y * self.width + x) as usize]
    }
}
