//! Smoothing and edge-response filters applied before growth.
//!
//! Growth runs on a Gaussian-blurred copy of the 8-bit frame. The distance
//! field is guided by a texture image: the Sobel gradient magnitude of the
//! blurred frame, smoothed again.

#[cfg(test)]
mod tests;

use common::Buffer2;
use rayon::prelude::*;

/// Rows handed to one rayon task.
const ROWS_PER_CHUNK: usize = 8;

/// Normalised 1D Gaussian kernel of radius `ceil(3 * sigma)`.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    assert!(sigma > 0.0, "Sigma must be positive");

    let radius = (3.0 * sigma).ceil() as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur with edge pixels replicated outward.
///
/// A sigma of zero returns the input unchanged.
pub fn gaussian_blur(input: &Buffer2<f32>, sigma: f32) -> Buffer2<f32> {
    assert!(sigma >= 0.0, "Sigma must be non-negative");
    if sigma == 0.0 || input.is_empty() {
        return input.clone();
    }

    let kernel = gaussian_kernel_1d(sigma);
    let (width, height) = (input.width(), input.height());

    let mut temp = vec![0.0f32; width * height];
    convolve_rows(input.pixels(), &mut temp, width, &kernel);

    let mut output = vec![0.0f32; width * height];
    convolve_cols(&temp, &mut output, width, height, &kernel);

    Buffer2::new(width, height, output)
}

fn convolve_rows(input: &[f32], output: &mut [f32], width: usize, kernel: &[f32]) {
    let radius = (kernel.len() / 2) as isize;
    let last = width as isize - 1;

    output
        .par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let y_start = chunk_idx * ROWS_PER_CHUNK;
            for (local_y, out_row) in out_chunk.chunks_mut(width).enumerate() {
                let y = y_start + local_y;
                let in_row = &input[y * width..(y + 1) * width];
                for (x, out) in out_row.iter_mut().enumerate() {
                    let mut sum = 0.0f32;
                    for (k, &w) in kernel.iter().enumerate() {
                        let sx = (x as isize + k as isize - radius).clamp(0, last);
                        sum += in_row[sx as usize] * w;
                    }
                    *out = sum;
                }
            }
        });
}

fn convolve_cols(input: &[f32], output: &mut [f32], width: usize, height: usize, kernel: &[f32]) {
    let radius = (kernel.len() / 2) as isize;
    let last = height as isize - 1;

    output
        .par_chunks_mut(width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, out_chunk)| {
            let y_start = chunk_idx * ROWS_PER_CHUNK;
            for (local_y, out_row) in out_chunk.chunks_mut(width).enumerate() {
                let y = (y_start + local_y) as isize;
                for (x, out) in out_row.iter_mut().enumerate() {
                    let mut sum = 0.0f32;
                    for (k, &w) in kernel.iter().enumerate() {
                        let sy = (y + k as isize - radius).clamp(0, last);
                        sum += input[sy as usize * width + x] * w;
                    }
                    *out = sum;
                }
            }
        });
}

/// 3x3 Sobel gradient magnitude with edge pixels replicated outward.
pub fn sobel_magnitude(input: &Buffer2<f32>) -> Buffer2<f32> {
    let (width, height) = (input.width(), input.height());
    if input.is_empty() {
        return input.clone();
    }

    let mut output = vec![0.0f32; width * height];
    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            let sample = |dx: isize, dy: isize, x: usize| {
                let sx = (x as isize + dx).clamp(0, width as isize - 1) as usize;
                let sy = (y as isize + dy).clamp(0, height as isize - 1) as usize;
                input[(sx, sy)]
            };
            for (x, out) in out_row.iter_mut().enumerate() {
                let gx = sample(1, -1, x) + 2.0 * sample(1, 0, x) + sample(1, 1, x)
                    - sample(-1, -1, x)
                    - 2.0 * sample(-1, 0, x)
                    - sample(-1, 1, x);
                let gy = sample(-1, 1, x) + 2.0 * sample(0, 1, x) + sample(1, 1, x)
                    - sample(-1, -1, x)
                    - 2.0 * sample(0, -1, x)
                    - sample(1, -1, x);
                *out = (gx * gx + gy * gy).sqrt();
            }
        });

    Buffer2::new(width, height, output)
}

/// Texture image steering the distance field: smoothed edge response of `blurred`.
pub fn texture(blurred: &Buffer2<f32>, sigma: f32) -> Buffer2<f32> {
    gaussian_blur(&sobel_magnitude(blurred), sigma)
}
