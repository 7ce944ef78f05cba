//! Synthetic frames: bright discs on a dark background, optionally noisy
//! and moving between frames.

use common::Buffer2;
use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::frame::Frame;

/// One disc moving at constant velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingDisc {
    pub start: DVec2,
    /// Pixels per frame.
    pub velocity: DVec2,
    pub radius: f64,
}

impl MovingDisc {
    #[inline]
    pub fn center_at(&self, frame: usize) -> DVec2 {
        self.start + self.velocity * frame as f64
    }
}

/// Parameters of a synthetic sequence.
#[derive(Debug, Clone)]
pub struct SequenceConfig {
    pub width: usize,
    pub height: usize,
    pub frames: usize,
    pub background: f32,
    pub foreground: f32,
    /// Half-width of the uniform noise added to every pixel. 0 disables.
    pub noise: f32,
    pub seed: u64,
    pub discs: Vec<MovingDisc>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            width: 96,
            height: 64,
            frames: 5,
            background: 20.0,
            foreground: 200.0,
            noise: 0.0,
            seed: 42,
            discs: vec![
                MovingDisc {
                    start: DVec2::new(28.0, 32.0),
                    velocity: DVec2::new(1.5, 0.0),
                    radius: 9.0,
                },
                MovingDisc {
                    start: DVec2::new(68.0, 30.0),
                    velocity: DVec2::new(-1.0, 0.5),
                    radius: 8.0,
                },
            ],
        }
    }
}

/// Frame of constant intensity.
pub fn uniform(width: usize, height: usize, value: f32) -> Buffer2<f32> {
    Buffer2::new_filled(width, height, value)
}

/// Paint a filled disc onto `pixels`.
pub fn draw_disc(pixels: &mut Buffer2<f32>, center: DVec2, radius: f64, value: f32) {
    let r2 = radius * radius;
    for y in 0..pixels.height() {
        for x in 0..pixels.width() {
            let d = DVec2::new(x as f64, y as f64) - center;
            if d.length_squared() <= r2 {
                pixels[(x, y)] = value;
            }
        }
    }
}

/// Discs on a uniform background.
pub fn disc_frame(
    width: usize,
    height: usize,
    discs: &[(DVec2, f64)],
    background: f32,
    foreground: f32,
) -> Buffer2<f32> {
    let mut pixels = uniform(width, height, background);
    for &(center, radius) in discs {
        draw_disc(&mut pixels, center, radius, foreground);
    }
    pixels
}

/// Add uniform noise in `-amplitude..amplitude`, clamped to the 8-bit range.
pub fn add_noise(pixels: &mut Buffer2<f32>, amplitude: f32, rng: &mut StdRng) {
    if amplitude <= 0.0 {
        return;
    }
    for v in pixels.pixels_mut() {
        *v = (*v + rng.random_range(-amplitude..amplitude))
            .round()
            .clamp(0.0, 255.0);
    }
}

/// Render the configured sequence as 8-bit frames.
pub fn moving_discs(config: &SequenceConfig) -> Result<Vec<Frame>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    (0..config.frames)
        .map(|t| {
            let discs: Vec<(DVec2, f64)> = config
                .discs
                .iter()
                .map(|d| (d.center_at(t), d.radius))
                .collect();
            let mut pixels = disc_frame(
                config.width,
                config.height,
                &discs,
                config.background,
                config.foreground,
            );
            add_noise(&mut pixels, config.noise, &mut rng);
            Frame::from_gray8(pixels)
        })
        .collect()
}
