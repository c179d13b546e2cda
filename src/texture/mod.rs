//! Deterministic procedural surface textures.
//!
//! Every surface the downstream platform needs a texture for gets a small
//! procedural recipe: a base color plus noise, cracks, or a grid pattern.
//! Synthesis is seeded per `(seed, kind)` with a counter-based ChaCha8
//! stream, so identical inputs produce byte-identical pixels on every
//! platform and every run.

pub mod encode;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use encode::{encode, file_extension};

/// Surface categories with a procedural recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Asphalt,
    Concrete,
    Wall,
    Grass,
    Sidewalk,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 5] = [
        SurfaceKind::Asphalt,
        SurfaceKind::Concrete,
        SurfaceKind::Wall,
        SurfaceKind::Grass,
        SurfaceKind::Sidewalk,
    ];

    fn stream(self) -> u64 {
        match self {
            SurfaceKind::Asphalt => 0,
            SurfaceKind::Concrete => 1,
            SurfaceKind::Wall => 2,
            SurfaceKind::Grass => 3,
            SurfaceKind::Sidewalk => 4,
        }
    }
}

/// Catalog file name for a surface kind. The extension follows the encoder
/// compiled into this build.
pub fn texture_file_name(kind: SurfaceKind) -> String {
    let stem = match kind {
        SurfaceKind::Asphalt => "road_asphalt",
        SurfaceKind::Concrete => "road_concrete",
        SurfaceKind::Wall => "building_wall",
        SurfaceKind::Grass => "grass",
        SurfaceKind::Sidewalk => "sidewalk",
    };
    format!("{stem}.{}", file_extension())
}

/// Tightly packed RGB8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Solid-color image.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 3);
        for _ in 0..count {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB8 bytes, row-major from the top-left.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Byte offset of a pixel. Kept in `usize` so dimensions whose byte
    /// count exceeds `u32::MAX` index correctly.
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.pixel_index(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    fn put(&mut self, x: u32, y: u32, color: [u8; 3]) {
        let i = self.pixel_index(x, y);
        self.pixels[i..i + 3].copy_from_slice(&color);
    }

    /// Write a pixel only when it falls inside the image.
    fn put_clipped(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.put(x as u32, y as u32, color);
        }
    }
}

/// Synthesize one surface texture.
///
/// Deterministic: the generator is seeded from `(seed, kind)` only, so the
/// same arguments always produce the same bytes.
pub fn synthesize(kind: SurfaceKind, width: u32, height: u32, seed: u64) -> RasterImage {
    let mut rng = rng_for(kind, seed);
    match kind {
        SurfaceKind::Asphalt => asphalt(width, height, &mut rng),
        SurfaceKind::Concrete => noisy(width, height, [180, 180, 180], 20, false, &mut rng),
        SurfaceKind::Wall => brick_wall(width, height),
        SurfaceKind::Grass => noisy(width, height, [60, 130, 50], 30, true, &mut rng),
        SurfaceKind::Sidewalk => sidewalk_tiles(width, height),
    }
}

fn rng_for(kind: SurfaceKind, seed: u64) -> ChaCha8Rng {
    // Distinct stream per kind so the catalog textures are uncorrelated.
    ChaCha8Rng::seed_from_u64(
        seed.wrapping_add(kind.stream().wrapping_mul(0x9E37_79B9_7F4A_7C15)),
    )
}

fn clamp_channel(base: u8, delta: i32) -> u8 {
    (i32::from(base) + delta).clamp(0, 255) as u8
}

/// Base color with uniform per-pixel noise; `soft_blue` halves the noise on
/// the blue channel (grass reads greener that way).
fn noisy(
    width: u32,
    height: u32,
    base: [u8; 3],
    amplitude: i32,
    soft_blue: bool,
    rng: &mut ChaCha8Rng,
) -> RasterImage {
    let mut img = RasterImage::filled(width, height, base);
    for y in 0..height {
        for x in 0..width {
            let noise = rng.gen_range(-amplitude..=amplitude);
            let blue_noise = if soft_blue { noise / 2 } else { noise };
            img.put(
                x,
                y,
                [
                    clamp_channel(base[0], noise),
                    clamp_channel(base[1], noise),
                    clamp_channel(base[2], blue_noise),
                ],
            );
        }
    }
    img
}

/// Dark noisy base with a handful of thin crack segments.
fn asphalt(width: u32, height: u32, rng: &mut ChaCha8Rng) -> RasterImage {
    let mut img = noisy(width, height, [45, 45, 50], 15, false, rng);
    for _ in 0..20 {
        let x1 = rng.gen_range(0..=i64::from(width));
        let y1 = rng.gen_range(0..=i64::from(height));
        let x2 = x1 + rng.gen_range(-50..=50);
        let y2 = y1 + rng.gen_range(-50..=50);
        draw_line(&mut img, x1, y1, x2, y2, [30, 30, 35]);
    }
    img
}

/// Running-bond brick pattern: brick faces over a mortar-colored base, rows
/// offset by half a brick, 2 px mortar joints.
fn brick_wall(width: u32, height: u32) -> RasterImage {
    const BRICK_W: i64 = 60;
    const BRICK_H: i64 = 30;
    const MORTAR: i64 = 2;

    let mut img = RasterImage::filled(width, height, [200, 180, 160]);
    let mut row = 0i64;
    let mut y = 0i64;
    while y < i64::from(height) {
        let offset = if row % 2 == 0 { 0 } else { BRICK_W / 2 };
        let mut x = -BRICK_W;
        while x < i64::from(width) + BRICK_W {
            fill_rect(
                &mut img,
                x + offset,
                y,
                x + offset + BRICK_W - MORTAR,
                y + BRICK_H - MORTAR,
                [180, 165, 150],
            );
            x += BRICK_W;
        }
        y += BRICK_H;
        row += 1;
    }
    img
}

/// Concrete-slab grid: each 64 px tile outlined one pixel inside its edge.
fn sidewalk_tiles(width: u32, height: u32) -> RasterImage {
    const TILE: i64 = 64;

    let mut img = RasterImage::filled(width, height, [150, 150, 140]);
    let outline = [120, 120, 110];
    let mut y = 0i64;
    while y < i64::from(height) {
        let mut x = 0i64;
        while x < i64::from(width) {
            let (x0, y0) = (x + 1, y + 1);
            let (x1, y1) = (x + TILE - 1, y + TILE - 1);
            draw_line(&mut img, x0, y0, x1, y0, outline);
            draw_line(&mut img, x0, y1, x1, y1, outline);
            draw_line(&mut img, x0, y0, x0, y1, outline);
            draw_line(&mut img, x1, y0, x1, y1, outline);
            x += TILE;
        }
        y += TILE;
    }
    img
}

fn fill_rect(img: &mut RasterImage, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3]) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            img.put_clipped(x, y, color);
        }
    }
}

/// Bresenham segment, clipped to the image.
fn draw_line(img: &mut RasterImage, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3]) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        img.put_clipped(x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
