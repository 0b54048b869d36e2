//! Frequency windows expressed as inclusive sample-index ranges.

/// Inclusive index range `[start_index, end_index]` into a series.
///
/// A range with `start_index >= end_index` is degenerate and selects
/// nothing. Ranges are never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl WindowRange {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.start_index >= self.end_index
    }

    /// Number of samples selected.
    pub fn len(&self) -> usize {
        if self.is_degenerate() {
            0
        } else {
            self.end_index - self.start_index + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The selected part of `data`, clamped to its length.
    pub fn slice<'a, T>(&self, data: &'a [T]) -> &'a [T] {
        if self.is_degenerate() || self.start_index >= data.len() {
            return &[];
        }
        let end = self.end_index.min(data.len() - 1);
        &data[self.start_index..=end]
    }
}

/// Index of the sample closest to `target`; ties go to the lowest index.
///
/// `None` for an empty series.
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().enumerate() {
        let dist = (v - target).abs();
        match best {
            Some((_, d)) if !(dist < d) => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Window for optional frequency bounds.
///
/// A missing lower bound starts at the first sample, a missing upper bound
/// ends at the last one.
pub fn window_range(frequencies: &[f64], xmin: Option<f64>, xmax: Option<f64>) -> WindowRange {
    let last = frequencies.len().saturating_sub(1);
    let start_index = xmin
        .and_then(|x| nearest_index(frequencies, x))
        .unwrap_or(0);
    let end_index = xmax
        .and_then(|x| nearest_index(frequencies, x))
        .unwrap_or(last);
    WindowRange::new(start_index, end_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_index() {
        let f = [100.0, 200.0, 300.0, 400.0];
        assert_eq!(nearest_index(&f, 260.0), Some(2));
        assert_eq!(nearest_index(&f, -50.0), Some(0));
        assert_eq!(nearest_index(&f, 1e6), Some(3));
        // Equidistant: lowest index wins.
        assert_eq!(nearest_index(&f, 250.0), Some(1));
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn test_window_bounds() {
        let f: Vec<f64> = (0..11).map(|i| 100.0 + 10.0 * i as f64).collect();
        let w = window_range(&f, Some(121.0), Some(178.0));
        assert_eq!(w, WindowRange::new(2, 8));
        assert_eq!(w.len(), 7);
        let data: Vec<usize> = (0..11).collect();
        assert_eq!(w.slice(&data), &[2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_window_defaults() {
        let f = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(window_range(&f, None, None), WindowRange::new(0, 3));
        assert_eq!(window_range(&f, Some(2.2), None), WindowRange::new(1, 3));
        assert_eq!(window_range(&f, None, Some(2.2)), WindowRange::new(0, 1));
    }

    #[test]
    fn test_inverted_window_is_degenerate() {
        let f = [1.0, 2.0, 3.0, 4.0, 5.0];
        let w = window_range(&f, Some(4.0), Some(2.0));
        assert_eq!(w, WindowRange::new(3, 1));
        assert!(w.is_degenerate());
        assert!(w.slice(&f).is_empty());

        let same = window_range(&f, Some(3.0), Some(3.1));
        assert!(same.is_degenerate());
    }

    #[test]
    fn test_descending_frequencies() {
        let f = [500.0, 400.0, 300.0, 200.0];
        // Lower bound maps to a later index than the upper bound.
        let w = window_range(&f, Some(250.0), Some(450.0));
        assert!(w.is_degenerate());
        let w = window_range(&f, Some(450.0), Some(250.0));
        assert_eq!(w, WindowRange::new(0, 2));
    }

    #[test]
    fn test_slice_clamps() {
        let w = WindowRange::new(1, 10);
        assert_eq!(w.slice(&[0, 1, 2]), &[1, 2]);
        assert!(WindowRange::new(5, 10).slice(&[0, 1, 2]).is_empty());
    }
}
