//! Bit-packed 2D boolean mask.
//!
//! One bit per pixel in `u64` words (LSB first). Region masks are mostly
//! sparse, so the set-bit iterator skips empty words.

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

/// A 2D mask storing one bit per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer2 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    /// Total number of bits (width * height).
    len: usize,
}

impl BitBuffer2 {
    /// Create a new mask filled with the given value.
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let len = width * height;
        let mut buf = Self {
            words: vec![0; len.div_ceil(BITS_PER_WORD)],
            width,
            height,
            len,
        };
        buf.fill(value);
        buf
    }

    /// Create a new mask with all bits cleared.
    #[inline]
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, false)
    }

    /// Create a mask from a row-major slice of booleans.
    pub fn from_slice(width: usize, height: usize, data: &[bool]) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length {} does not match dimensions {}x{}",
            data.len(),
            width,
            height
        );
        let mut buf = Self::new_default(width, height);
        for (i, &value) in data.iter().enumerate() {
            if value {
                buf.set(i, true);
            }
        }
        buf
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
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        debug_assert!(idx < self.len);
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize, value: bool) {
        debug_assert!(idx < self.len);
        let bit = 1u64 << (idx % BITS_PER_WORD);
        if value {
            self.words[idx / BITS_PER_WORD] |= bit;
        } else {
            self.words[idx / BITS_PER_WORD] &= !bit;
        }
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.get(y * self.width + x)
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        self.set(y * self.width + x, value);
    }

    /// Fill all bits with the given value. Padding bits past `len` stay clear.
    pub fn fill(&mut self, value: bool) {
        self.words.fill(if value { !0 } else { 0 });
        if value {
            self.clear_padding();
        }
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether no bit is set.
    #[inline]
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Linear indices of set bits in ascending order.
    pub fn iter_ones(&self) -> OnesIter<'_> {
        OnesIter {
            words: &self.words,
            word_idx: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Set every bit that is set in `other`.
    pub fn union_with(&mut self, other: &Self) {
        self.assert_same_shape(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    /// Clear every bit that is set in `other`.
    pub fn subtract(&mut self, other: &Self) {
        self.assert_same_shape(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
    }

    /// Whether any bit is set in both masks.
    pub fn intersects(&self, other: &Self) -> bool {
        self.assert_same_shape(other);
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    /// Whether every set bit of `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.assert_same_shape(other);
        self.words
            .iter()
            .zip(&other.words)
            .all(|(a, b)| a & !b == 0)
    }

    fn clear_padding(&mut self) {
        let tail = self.len % BITS_PER_WORD;
        if tail == 0 {
            return;
        }
        if let Some(last) = self.words.last_mut() {
            *last &= (1u64 << tail) - 1;
        }
    }

    fn assert_same_shape(&self, other: &Self) {
        assert_eq!(self.width, other.width, "width mismatch");
        assert_eq!(self.height, other.height, "height mismatch");
    }
}

/// Iterator over the linear indices of set bits.
pub struct OnesIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl Iterator for OnesIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_idx];
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.word_idx * BITS_PER_WORD + bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_across_words() {
        let mut buf = BitBuffer2::new_filled(64, 64, false);
        for idx in [0, 63, 64, 127] {
            buf.set(idx, true);
        }
        assert!(buf.get(63) && buf.get(64));
        assert!(!buf.get(62) && !buf.get(65));
        assert_eq!(buf.count_ones(), 4);
    }

    #[test]
    fn test_fill_true_keeps_padding_clear() {
        let buf = BitBuffer2::new_filled(10, 10, true);
        assert_eq!(buf.count_ones(), 100);
        assert_eq!(buf.iter_ones().last(), Some(99));
    }

    #[test]
    fn test_iter_ones_sparse() {
        let mut buf = BitBuffer2::new_default(100, 100);
        buf.set_xy(3, 0, true);
        buf.set_xy(50, 50, true);
        buf.set_xy(99, 99, true);
        let ones: Vec<usize> = buf.iter_ones().collect();
        assert_eq!(ones, vec![3, 5050, 9999]);
    }

    #[test]
    fn test_iter_ones_empty() {
        assert_eq!(BitBuffer2::new_default(7, 3).iter_ones().count(), 0);
        assert_eq!(BitBuffer2::new_default(0, 0).iter_ones().count(), 0);
    }

    #[test]
    fn test_union_subtract_intersects() {
        let a = BitBuffer2::from_slice(3, 1, &[true, true, false]);
        let b = BitBuffer2::from_slice(3, 1, &[false, true, true]);
        assert!(a.intersects(&b));

        let mut u = a.clone();
        u.union_with(&b);
        assert_eq!(u.count_ones(), 3);

        let mut d = a.clone();
        d.subtract(&b);
        assert_eq!(d.iter_ones().collect::<Vec<_>>(), vec![0]);
        assert!(d.is_subset_of(&a));
        assert!(!a.is_subset_of(&d));
    }
}
