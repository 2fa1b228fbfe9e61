//! Windowed sample statistics over history slices.

/// Last `n` elements of `series` (all of it when shorter).
#[inline]
pub fn tail(series: &[f64], n: usize) -> &[f64] {
    &series[series.len().saturating_sub(n)..]
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); `None` below two points.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Sample mean and standard deviation of a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std: f64,
    pub len: usize,
}

impl WindowStats {
    /// `None` below two points.
    pub fn compute(values: &[f64]) -> Option<Self> {
        Some(Self {
            mean: mean(values)?,
            std: sample_std(values)?,
            len: values.len(),
        })
    }

    /// `(mean - k·σ, mean + k·σ)`
    pub fn band(&self, k: f64) -> (f64, f64) {
        (self.mean - k * self.std, self.mean + k * self.std)
    }
}

/// Pearson correlation of two equal-length windows.
///
/// NaN when either side has zero variance; `None` below two points or on a
/// length mismatch.
pub fn correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let ma = mean(a)?;
    let mb = mean(b)?;
    let (mut cov, mut va, mut vb) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - ma, y - mb);
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }
    Some(cov / (va * vb).sqrt())
}
