use std::ops::{Index, IndexMut};
use std::slice;

/// Row-major offsets of the 8-neighbourhood, top row first.
pub const NEIGHBOR_OFFSETS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A 2D grid of values stored row by row.
///
/// Pixels are addressed either by `(x, y)` or by the linear index
/// `y * width + x`. Growth code works almost exclusively with linear
/// indices; `(x, y)` is for construction and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer2<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        &mut self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.pixels.iter()
    }

    /// Whether this grid has the same dimensions as `other`.
    #[inline]
    pub fn same_shape<U>(&self, other: &Buffer2<U>) -> bool {
        self.width == other.width() && self.height == other.height()
    }

    /// Apply `f` to every pixel, producing a grid of the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Buffer2<U> {
        Buffer2 {
            pixels: self.pixels.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// In-frame 8-neighbours of the pixel at linear index `idx`.
    #[inline]
    pub fn neighbors8(&self, idx: usize) -> Neighbors8 {
        neighbors8(self.width, self.height, idx)
    }
}

impl<T: Default + Clone> Buffer2<T> {
    pub fn new_default(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![T::default(); width * height],
            width,
            height,
        }
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn fill(&mut self, value: T) {
        self.pixels.fill(value);
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

impl<T> Index<usize> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: usize) -> &Self::Output {
        &self.pixels[idx]
    }
}

impl<T> IndexMut<usize> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
        &mut self.pixels[idx]
    }
}

/// Whether `(x, y)` lies within `margin` pixels of the boundary of a
/// `width` x `height` frame. A margin of 1 selects the outermost ring.
#[inline]
pub fn is_edge_pixel(width: usize, height: usize, x: usize, y: usize, margin: usize) -> bool {
    x < margin || y < margin || x + margin >= width || y + margin >= height
}

/// Iterate the in-frame 8-neighbours of linear index `idx`.
#[inline]
pub fn neighbors8(width: usize, height: usize, idx: usize) -> Neighbors8 {
    debug_assert!(idx < width * height);
    Neighbors8 {
        x: (idx % width) as isize,
        y: (idx / width) as isize,
        width,
        height,
        next: 0,
    }
}

/// Iterator over the linear indices of in-frame 8-neighbours.
///
/// Out-of-frame neighbours are skipped, so corner pixels yield 3 items
/// and edge pixels 5.
#[derive(Debug, Clone)]
pub struct Neighbors8 {
    x: isize,
    y: isize,
    width: usize,
    height: usize,
    next: usize,
}

impl Iterator for Neighbors8 {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.next < NEIGHBOR_OFFSETS_8.len() {
            let (dx, dy) = NEIGHBOR_OFFSETS_8[self.next];
            self.next += 1;
            let nx = self.x + dx;
            let ny = self.y + dy;
            if nx >= 0 && ny >= 0 && (nx as usize) < self.width && (ny as usize) < self.height {
                return Some(ny as usize * self.width + nx as usize);
            }
        }
        None
    }
}
