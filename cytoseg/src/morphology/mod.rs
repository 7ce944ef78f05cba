//! Binary morphology on masks: 3x3 erosion and 8-connected labelling.

#[cfg(test)]
mod tests;

use common::{is_edge_pixel, neighbors8, BitBuffer2};
use glam::DVec2;

// ============================================================================
// Erosion
// ============================================================================

/// 3x3 binary erosion. Pixels outside the frame count as background, so
/// the outermost ring is always cleared.
pub fn erode(mask: &BitBuffer2) -> BitBuffer2 {
    let (width, height) = (mask.width(), mask.height());
    let mut output = BitBuffer2::new_default(width, height);
    for idx in mask.iter_ones() {
        let keep = !is_edge_pixel(width, height, idx % width, idx / width, 1)
            && neighbors8(width, height, idx).all(|n| mask.get(n));
        if keep {
            output.set(idx, true);
        }
    }
    output
}

/// Erode `iterations` times, stopping early once the mask is empty.
pub fn erode_n(mask: &BitBuffer2, iterations: usize) -> BitBuffer2 {
    let mut current = mask.clone();
    for _ in 0..iterations {
        if current.none() {
            break;
        }
        current = erode(&current);
    }
    current
}

// ============================================================================
// Connected components
// ============================================================================

/// An 8-connected group of set pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Linear indices in ascending order.
    pub pixels: Vec<usize>,
    /// Some pixel lies on the outermost ring of the frame.
    pub touches_edge: bool,
    pub centroid: DVec2,
}

impl Component {
    #[inline]
    pub fn area(&self) -> usize {
        self.pixels.len()
    }
}

/// A horizontal run of set pixels in one row.
#[derive(Debug, Clone, Copy)]
struct Run {
    y: usize,
    start: usize,
    /// Exclusive.
    end: usize,
    label: u32,
}

#[derive(Debug, Default)]
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, label: u32) -> u32 {
        let mut root = label;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut current = label;
        while current != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
    }
}

fn row_runs(mask: &BitBuffer2, y: usize, out: &mut Vec<Run>) {
    let width = mask.width();
    let mut x = 0;
    while x < width {
        if !mask.get_xy(x, y) {
            x += 1;
            continue;
        }
        let start = x;
        while x < width && mask.get_xy(x, y) {
            x += 1;
        }
        out.push(Run {
            y,
            start,
            end: x,
            label: 0,
        });
    }
}

/// Label 8-connected components, ordered by their first pixel in scan order.
pub fn connected_components(mask: &BitBuffer2) -> Vec<Component> {
    let (width, height) = (mask.width(), mask.height());
    let mut uf = UnionFind::default();
    let mut runs: Vec<Run> = Vec::new();
    let mut prev_start = 0;
    let mut row = Vec::new();

    for y in 0..height {
        row.clear();
        row_runs(mask, y, &mut row);
        let prev_end = runs.len();

        for run in &mut row {
            run.label = u32::MAX;
            for prev in &runs[prev_start..prev_end] {
                if prev.y + 1 != y {
                    continue;
                }
                // Diagonal contact counts
                let connected = prev.start < run.end + 1 && run.start < prev.end + 1;
                if !connected {
                    continue;
                }
                if run.label == u32::MAX {
                    run.label = prev.label;
                } else {
                    uf.union(run.label, prev.label);
                }
            }
            if run.label == u32::MAX {
                run.label = uf.make_set();
            }
        }

        prev_start = prev_end;
        runs.extend_from_slice(&row);
    }

    let mut index_of_root: Vec<Option<usize>> = vec![None; uf.parent.len()];
    let mut components: Vec<Component> = Vec::new();
    for run in &runs {
        let root = uf.find(run.label) as usize;
        let ci = *index_of_root[root].get_or_insert_with(|| {
            components.push(Component {
                pixels: Vec::new(),
                touches_edge: false,
                centroid: DVec2::ZERO,
            });
            components.len() - 1
        });
        let component = &mut components[ci];
        component.pixels.extend((run.start..run.end).map(|x| run.y * width + x));
        if run.y == 0 || run.y + 1 == height || run.start == 0 || run.end == width {
            component.touches_edge = true;
        }
    }

    for component in &mut components {
        component.pixels.sort_unstable();
        let sum = component
            .pixels
            .iter()
            .fold(DVec2::ZERO, |acc, &idx| {
                acc + DVec2::new((idx % width) as f64, (idx / width) as f64)
            });
        component.centroid = sum / component.pixels.len() as f64;
    }
    components
}
