//! Top-down PNG rendering of a built world and tracing setup for the example binaries.
use std::path::Path;

use glam::Vec2;
use image::{Rgb, RgbImage};
use town_gen::placement::{BuildingMaterial, DEFAULT_PALETTE};
use town_gen::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call in the same process keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub image_size: (u32, u32),
    pub background: [u8; 3],
    pub water: [u8; 3],
    pub low_land: [u8; 3],
    pub high_land: [u8; 3],
    pub flat_land: [u8; 3],
    pub road: [u8; 3],
    /// Building materials, indexed by `BuildingInstance::material_index`.
    pub palette: Vec<BuildingMaterial>,
    /// Half side of a building square in pixels.
    pub building_radius: i32,
}

impl RenderConfig {
    pub fn new(image_size: (u32, u32)) -> Self {
        Self {
            image_size,
            background: [20, 24, 32],
            water: [48, 96, 170],
            low_land: [120, 150, 80],
            high_land: [235, 235, 225],
            flat_land: [170, 180, 110],
            road: [60, 60, 60],
            palette: DEFAULT_PALETTE.to_vec(),
            building_radius: 2,
        }
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    pub fn with_palette(mut self, palette: Vec<BuildingMaterial>) -> Self {
        self.palette = palette;
        self
    }
}

struct Canvas {
    image: RgbImage,
    min: Vec2,
    extent: Vec2,
}

impl Canvas {
    fn to_pixel(&self, p: Vec2) -> (i32, i32) {
        let uv = (p - self.min) / self.extent;
        // Image rows grow downwards, world y upwards.
        (
            (uv.x * self.image.width() as f32) as i32,
            ((1.0 - uv.y) * self.image.height() as f32) as i32,
        )
    }

    fn to_world(&self, px: u32, py: u32) -> Vec2 {
        let uv = Vec2::new(
            (px as f32 + 0.5) / self.image.width() as f32,
            1.0 - (py as f32 + 0.5) / self.image.height() as f32,
        );
        self.min + uv * self.extent
    }

    fn put(&mut self, x: i32, y: i32, color: [u8; 3]) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: [u8; 3]) {
        let (mut x0, mut y0) = self.to_pixel(a);
        let (x1, y1) = self.to_pixel(b);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn square(&mut self, centre: Vec2, radius: i32, color: [u8; 3]) {
        let (cx, cy) = self.to_pixel(centre);
        for y in cy - radius..=cy + radius {
            for x in cx - radius..=cx + radius {
                self.put(x, y, color);
            }
        }
    }
}

fn lerp_color(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    [0, 1, 2].map(|i| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t) as u8)
}

fn product<'a>(world: &'a World, label: &str) -> Option<&'a Product> {
    world.scene().get(label).map(|sub| sub.product.as_ref())
}

/// Render the terrain, roads and buildings of `world` seen from above.
pub fn render_world_to_png(
    world: &World,
    config: &RenderConfig,
    out_path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let size = world.size();
    let (min, _) = size.bounds();
    let (w, h) = config.image_size;
    let mut canvas = Canvas {
        image: RgbImage::from_pixel(w, h, Rgb(config.background)),
        min,
        extent: size.extent(),
    };

    let water_level = match product(world, labels::WATER) {
        Some(Product::Water(water)) => water.level,
        _ => f32::NEG_INFINITY,
    };
    let terrain = match product(world, labels::SHORES) {
        Some(Product::Shores(shores)) => Some(&shores.terrain),
        _ => match product(world, labels::GROUND) {
            Some(Product::Ground(ground)) => Some(&ground.terrain),
            _ => None,
        },
    };

    if let Some(terrain) = terrain {
        let flat = terrain.flat_height();
        for py in 0..h {
            for px in 0..w {
                let Ok(height) = terrain.height_at(canvas.to_world(px, py)) else {
                    continue;
                };
                let color = if height <= water_level {
                    config.water
                } else if height == flat {
                    config.flat_land
                } else {
                    let t = (height - water_level) / (size.height_limit - water_level).max(1e-6);
                    lerp_color(config.low_land, config.high_land, t)
                };
                canvas.image.put_pixel(px, py, Rgb(color));
            }
        }
    }

    if let Some(Product::Roads(roads)) = product(world, labels::ROADS) {
        for segment in &roads.segments {
            canvas.line(segment.v1, segment.v2, config.road);
        }
    }

    if let Some(Product::Buildings(buildings)) = product(world, labels::BUILDINGS) {
        for b in &buildings.instances {
            let color = config
                .palette
                .get(b.material_index)
                .map(BuildingMaterial::rgb)
                .unwrap_or([255, 0, 255]);
            // World z is the flipped horizontal y.
            let p = Vec2::new(b.position.x, b.position.z / town_gen::placement::GROUND_AXIS_FLIP);
            canvas.square(p, config.building_radius, color);
        }
    }

    canvas.image.save(out_path)?;
    Ok(())
}
