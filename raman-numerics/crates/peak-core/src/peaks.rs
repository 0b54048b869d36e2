//! Local-maximum peak detection with a height cutoff and minimum spacing.

use std::cmp::Ordering;

/// Indices of local maxima of `x`.
///
/// A sample is a maximum when it is strictly greater than both neighbours.
/// A flat run bounded on both sides by strictly lower samples counts once,
/// at its middle sample (rounded down). The first and last samples are
/// never maxima.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut out = Vec::new();
    if x.len() < 3 {
        return out;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                out.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    out
}

/// Maxima of `x` with height at least `height`, at least `distance`
/// samples apart.
///
/// When two maxima are closer than `distance`, the taller one is kept; on
/// equal heights the later one wins, as in scipy's `find_peaks`. A
/// `distance` of 0 or 1 disables the spacing rule. The result is sorted by
/// index.
pub fn find_peaks(x: &[f64], height: f64, distance: usize) -> Vec<usize> {
    let mut peaks = local_maxima(x);
    peaks.retain(|&idx| x[idx] >= height);

    if distance > 1 && peaks.len() > 1 {
        let mut ranked = peaks.clone();
        ranked.sort_by(|&a, &b| {
            x[b].partial_cmp(&x[a])
                .unwrap_or(Ordering::Equal)
                .then(b.cmp(&a))
        });

        let mut selected: Vec<usize> = Vec::with_capacity(ranked.len());
        for cand in ranked {
            if selected.iter().all(|&kept| kept.abs_diff(cand) >= distance) {
                selected.push(cand);
            }
        }
        selected.sort_unstable();
        peaks = selected;
    }

    peaks
}
