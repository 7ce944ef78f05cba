//! Histogram thresholding algorithms.
//!
//! Each returns the highest background level; pixels above it are foreground.

use super::Histogram;

const BINS: usize = 256;
const EPSILON: f64 = f64::EPSILON;
const MAX_SMOOTHING_PASSES: usize = 10_000;

fn total(hist: &Histogram) -> f64 {
    hist.iter().map(|&c| c as f64).sum()
}

fn first_nonzero(hist: &Histogram) -> Option<usize> {
    hist.iter().position(|&c| c > 0)
}

fn last_nonzero(hist: &Histogram) -> Option<usize> {
    hist.iter().rposition(|&c| c > 0)
}

fn normalized(hist: &Histogram) -> Option<[f64; BINS]> {
    let total = total(hist);
    if total == 0.0 {
        return None;
    }
    let mut norm = [0.0; BINS];
    for (n, &c) in norm.iter_mut().zip(hist) {
        *n = c as f64 / total;
    }
    Some(norm)
}

/// Iterative intermeans ignoring the first and last bins.
pub(super) fn ij_iso_data(hist: &Histogram) -> Option<usize> {
    let mut data = *hist;
    data[0] = 0;
    data[BINS - 1] = 0;

    let (min, max) = match (first_nonzero(&data), last_nonzero(&data)) {
        (Some(min), Some(max)) if min < max => (min, max),
        _ => return Some(BINS / 2),
    };

    let mut moving = min;
    let mut result;
    loop {
        let (mut sum1, mut sum2, mut sum3, mut sum4) = (0.0, 0.0, 0.0, 0.0);
        for (i, &c) in data.iter().enumerate().take(moving + 1).skip(min) {
            sum1 += i as f64 * c as f64;
            sum2 += c as f64;
        }
        for (i, &c) in data.iter().enumerate().take(max + 1).skip(moving + 1) {
            sum3 += i as f64 * c as f64;
            sum4 += c as f64;
        }
        result = (sum1 / sum2 + sum3 / sum4) / 2.0;
        moving += 1;
        if !((moving + 1) as f64 <= result && moving < max - 1) {
            break;
        }
    }
    Some(result.round() as usize)
}

/// Huang's fuzzy thresholding.
pub(super) fn huang(hist: &Histogram) -> Option<usize> {
    let first = first_nonzero(hist)?;
    let last = last_nonzero(hist)?;
    if first == last {
        return Some(0);
    }

    let mut s = vec![0.0f64; last + 1];
    let mut w = vec![0.0f64; last + 1];
    s[first] = hist[first] as f64;
    w[first] = first as f64 * hist[first] as f64;
    for i in first + 1..=last {
        s[i] = s[i - 1] + hist[i] as f64;
        w[i] = w[i - 1] + i as f64 * hist[i] as f64;
    }

    let c = (last - first) as f64;
    let mut smu = vec![0.0f64; last + 1 - first];
    for (i, v) in smu.iter_mut().enumerate().skip(1) {
        let mu = 1.0 / (1.0 + i as f64 / c);
        *v = -mu * mu.ln() - (1.0 - mu) * (1.0 - mu).ln();
    }

    let mut best = first;
    let mut best_entropy = f64::MAX;
    for t in first..=last {
        let mut entropy = 0.0;
        let mu = (w[t] / s[t]).round() as usize;
        for i in first..=t {
            entropy += smu[i.abs_diff(mu)] * hist[i] as f64;
        }
        if t < last {
            let mu = ((w[last] - w[t]) / (s[last] - s[t])).round() as usize;
            for i in t + 1..=last {
                entropy += smu[i.abs_diff(mu)] * hist[i] as f64;
            }
        }
        if best_entropy > entropy {
            best_entropy = entropy;
            best = t;
        }
    }
    Some(best)
}

fn is_bimodal(y: &[f64]) -> bool {
    let mut modes = 0;
    for k in 1..y.len() - 1 {
        if y[k - 1] < y[k] && y[k + 1] < y[k] {
            modes += 1;
            if modes > 2 {
                return false;
            }
        }
    }
    modes == 2
}

/// 3-point running mean with zero padding until the histogram has exactly two peaks.
fn smooth_until_bimodal(hist: &Histogram) -> Option<Vec<f64>> {
    let mut h: Vec<f64> = hist.iter().map(|&c| c as f64).collect();
    let mut tmp = vec![0.0; BINS];
    let mut passes = 0;
    while !is_bimodal(&h) {
        for i in 1..BINS - 1 {
            tmp[i] = (h[i - 1] + h[i] + h[i + 1]) / 3.0;
        }
        tmp[0] = (h[0] + h[1]) / 3.0;
        tmp[BINS - 1] = (h[BINS - 2] + h[BINS - 1]) / 3.0;
        std::mem::swap(&mut h, &mut tmp);
        passes += 1;
        if passes > MAX_SMOOTHING_PASSES {
            return None;
        }
    }
    Some(h)
}

pub(super) fn intermodes(hist: &Histogram) -> Option<usize> {
    let h = smooth_until_bimodal(hist)?;
    let peaks: usize = (1..BINS - 1)
        .filter(|&i| h[i - 1] < h[i] && h[i + 1] < h[i])
        .sum();
    Some(peaks / 2)
}

pub(super) fn minimum(hist: &Histogram) -> Option<usize> {
    let max = last_nonzero(hist)?;
    let h = smooth_until_bimodal(hist)?;
    (1..max).find(|&i| h[i - 1] > h[i] && h[i + 1] >= h[i])
}

/// Ridler & Calvard.
pub(super) fn iso_data(hist: &Histogram) -> Option<usize> {
    let mut g = (1..BINS).find(|&i| hist[i] > 0)? + 1;
    loop {
        let (mut low, mut low_count) = (0u64, 0u64);
        for (i, &c) in hist.iter().enumerate().take(g + 1) {
            low_count += c;
            low += c * i as u64;
        }
        let (mut high, mut high_count) = (0u64, 0u64);
        for (i, &c) in hist.iter().enumerate().skip(g + 1) {
            high_count += c;
            high += c * i as u64;
        }
        if low_count > 0 && high_count > 0 {
            let low_mean = low / low_count;
            let high_mean = high / high_count;
            if g == ((low_mean + high_mean) as f64 / 2.0).round() as usize {
                return Some(g);
            }
        }
        g += 1;
        if g > BINS - 2 {
            return None;
        }
    }
}

/// Li's minimum cross entropy, iterative form.
pub(super) fn li(hist: &Histogram) -> Option<usize> {
    const TOLERANCE: f64 = 0.5;
    const MAX_PASSES: usize = 1000;

    let num_pixels = total(hist);
    if num_pixels == 0.0 {
        return None;
    }
    let mean: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum::<f64>()
        / num_pixels;

    let mut new_thresh = mean;
    let mut threshold;
    let mut passes = 0;
    loop {
        let old_thresh = new_thresh;
        threshold = ((old_thresh + 0.5) as usize).min(BINS - 1);

        let (mut sum_back, mut num_back) = (0.0, 0.0);
        for (i, &c) in hist.iter().enumerate().take(threshold + 1) {
            sum_back += i as f64 * c as f64;
            num_back += c as f64;
        }
        let (mut sum_obj, mut num_obj) = (0.0, 0.0);
        for (i, &c) in hist.iter().enumerate().skip(threshold + 1) {
            sum_obj += i as f64 * c as f64;
            num_obj += c as f64;
        }
        let mean_back = if num_back == 0.0 { 0.0 } else { sum_back / num_back };
        let mean_obj = if num_obj == 0.0 { 0.0 } else { sum_obj / num_obj };

        let temp = (mean_back - mean_obj) / (mean_back.ln() - mean_obj.ln());
        if !temp.is_finite() {
            break;
        }
        new_thresh = if temp < -EPSILON {
            (temp - 0.5).trunc()
        } else {
            (temp + 0.5).trunc()
        };

        passes += 1;
        if (new_thresh - old_thresh).abs() <= TOLERANCE || passes >= MAX_PASSES {
            break;
        }
    }
    Some(threshold)
}

/// Kapur, Sahoo & Wong.
pub(super) fn max_entropy(hist: &Histogram) -> Option<usize> {
    let norm = normalized(hist)?;
    let mut p1 = [0.0; BINS];
    let mut p2 = [0.0; BINS];
    p1[0] = norm[0];
    p2[0] = 1.0 - p1[0];
    for i in 1..BINS {
        p1[i] = p1[i - 1] + norm[i];
        p2[i] = 1.0 - p1[i];
    }

    let first_bin = (0..BINS).find(|&i| p1[i].abs() >= EPSILON).unwrap_or(0);
    let last_bin = (first_bin..BINS)
        .rev()
        .find(|&i| p2[i].abs() >= EPSILON)
        .unwrap_or(BINS - 1);

    let mut threshold = None;
    let mut max_ent = f64::MIN_POSITIVE;
    for t in first_bin..=last_bin {
        let mut ent_back = 0.0;
        for i in 0..=t {
            if hist[i] != 0 {
                let p = norm[i] / p1[t];
                ent_back -= p * p.ln();
            }
        }
        let mut ent_obj = 0.0;
        for i in t + 1..BINS {
            if hist[i] != 0 {
                let p = norm[i] / p2[t];
                ent_obj -= p * p.ln();
            }
        }
        let tot_ent = ent_back + ent_obj;
        if max_ent < tot_ent {
            max_ent = tot_ent;
            threshold = Some(t);
        }
    }
    threshold
}

pub(super) fn mean(hist: &Histogram) -> Option<usize> {
    let total = total(hist);
    if total == 0.0 {
        return None;
    }
    let sum: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();
    Some((sum / total).floor() as usize)
}

/// Tsai's moment-preserving threshold.
pub(super) fn moments(hist: &Histogram) -> Option<usize> {
    let norm = normalized(hist)?;
    let m0 = 1.0;
    let (mut m1, mut m2, mut m3) = (0.0, 0.0, 0.0);
    for (i, &p) in norm.iter().enumerate() {
        let di = i as f64;
        m1 += di * p;
        m2 += di * di * p;
        m3 += di * di * di * p;
    }

    let cd = m0 * m2 - m1 * m1;
    let c0 = (-m2 * m2 + m1 * m3) / cd;
    let c1 = (m0 * -m3 + m2 * m1) / cd;
    let disc = (c1 * c1 - 4.0 * c0).sqrt();
    let z0 = 0.5 * (-c1 - disc);
    let z1 = 0.5 * (-c1 + disc);
    let p0 = (z1 - m1) / (z1 - z0);
    if !p0.is_finite() {
        return None;
    }

    let mut sum = 0.0;
    for (i, &p) in norm.iter().enumerate() {
        sum += p;
        if sum > p0 {
            return Some(i);
        }
    }
    None
}

/// Otsu's maximum between-class variance. Later levels win ties.
pub(super) fn otsu(hist: &Histogram) -> Option<usize> {
    let n = total(hist);
    if n == 0.0 {
        return None;
    }
    let s: f64 = hist
        .iter()
        .enumerate()
        .map(|(k, &c)| k as f64 * c as f64)
        .sum();

    let mut sk = 0.0;
    let mut n1 = hist[0] as f64;
    let mut bcv_max = 0.0;
    let mut k_star = 0;
    for (k, &c) in hist.iter().enumerate().take(BINS - 1).skip(1) {
        sk += k as f64 * c as f64;
        n1 += c as f64;
        let denom = n1 * (n - n1);
        let bcv = if denom != 0.0 {
            let num = (n1 / n) * s - sk;
            num * num / denom
        } else {
            0.0
        };
        if bcv >= bcv_max {
            bcv_max = bcv;
            k_star = k;
        }
    }
    Some(k_star)
}

/// Level whose cumulative fraction is nearest one half.
pub(super) fn percentile(hist: &Histogram) -> Option<usize> {
    const FOREGROUND_FRACTION: f64 = 0.5;
    let total = total(hist);
    if total == 0.0 {
        return None;
    }
    let mut threshold = None;
    let mut best = 1.0;
    let mut partial = 0.0;
    for (i, &c) in hist.iter().enumerate() {
        partial += c as f64;
        let d = (partial / total - FOREGROUND_FRACTION).abs();
        if d < best {
            best = d;
            threshold = Some(i);
        }
    }
    threshold
}

/// Zack's triangle method, flipping the histogram when the long tail is on the left.
pub(super) fn triangle(hist: &Histogram) -> Option<usize> {
    let mut data: Vec<f64> = hist.iter().map(|&c| c as f64).collect();

    let mut min = first_nonzero(hist)?;
    min = min.saturating_sub(1);
    let mut min2 = last_nonzero(hist)?;
    if min2 < BINS - 1 {
        min2 += 1;
    }
    let mut max = 0;
    let mut dmax = 0.0;
    for (i, &v) in data.iter().enumerate() {
        if v > dmax {
            max = i;
            dmax = v;
        }
    }

    let inverted = (max as isize - min as isize) < (min2 as isize - max as isize);
    if inverted {
        data.reverse();
        min = BINS - 1 - min2;
        max = BINS - 1 - max;
    }
    if min == max {
        return Some(if inverted { BINS - 1 - min } else { min });
    }

    let mut nx = data[max];
    let mut ny = min as f64 - max as f64;
    let d = (nx * nx + ny * ny).sqrt();
    nx /= d;
    ny /= d;
    let d = nx * min as f64 + ny * data[min];

    let mut split = min;
    let mut split_distance = 0.0;
    for (i, &v) in data.iter().enumerate().take(max + 1).skip(min + 1) {
        let distance = nx * i as f64 + ny * v - d;
        if distance > split_distance {
            split = i;
            split_distance = distance;
        }
    }
    let split = split.saturating_sub(1);

    Some(if inverted { BINS - 1 - split } else { split })
}

/// Yen's maximum correlation criterion.
pub(super) fn yen(hist: &Histogram) -> Option<usize> {
    let norm = normalized(hist)?;
    let mut p1 = [0.0; BINS];
    let mut p1_sq = [0.0; BINS];
    let mut p2_sq = [0.0; BINS];
    p1[0] = norm[0];
    p1_sq[0] = norm[0] * norm[0];
    for i in 1..BINS {
        p1[i] = p1[i - 1] + norm[i];
        p1_sq[i] = p1_sq[i - 1] + norm[i] * norm[i];
    }
    for i in (0..BINS - 1).rev() {
        p2_sq[i] = p2_sq[i + 1] + norm[i + 1] * norm[i + 1];
    }

    let mut threshold = None;
    let mut max_crit = f64::MIN_POSITIVE;
    for t in 0..BINS {
        let sq = p1_sq[t] * p2_sq[t];
        let spread = p1[t] * (1.0 - p1[t]);
        let crit = -(if sq > 0.0 { sq.ln() } else { 0.0 })
            + 2.0 * (if spread > 0.0 { spread.ln() } else { 0.0 });
        if crit > max_crit {
            max_crit = crit;
            threshold = Some(t);
        }
    }
    threshold
}
