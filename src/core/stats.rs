/// Relative spread at or below which a window counts as constant.
///
/// Running sums resolve a window's variance only to about
/// `f64::EPSILON * mean^2`, so a standard deviation under `sqrt(EPSILON)`
/// times the mean's magnitude is indistinguishable from zero.
pub const CONSTANT_REL_STD: f64 = 1.5e-8;

/// Whether a window with population statistics `(mean, std)` is constant.
///
/// The test is relative to the mean, so it does not depend on the scale of
/// the data: `[5, 5, 0] * 1e-16` has the same shape as `[5, 5, 0]`. A NaN
/// `std` is never constant.
#[inline]
pub fn is_constant(mean: f64, std: f64) -> bool {
    std <= CONSTANT_REL_STD * mean.abs()
}

/// Population mean and standard deviation of `values`, computed in two passes.
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (mean, var.max(0.0).sqrt())
}

/// Streaming sum and sum-of-squares over a window of fixed length `m`.
///
/// The window slides one element at a time: [`push`](Self::push) the element
/// entering at the tail, read [`mean_std`](Self::mean_std), then
/// [`pop`](Self::pop) the element leaving at the head. [`reset`](Self::reset)
/// recomputes both sums exactly from a prefix of `m - 1` values, which the
/// scan does once per buffer chunk so rounding error cannot build up across
/// the whole series.
#[derive(Debug, Clone)]
pub struct RunningStats {
    m: usize,
    ex: f64,
    ex2: f64,
}

impl RunningStats {
    /// Create an empty accumulator for windows of length `m`.
    pub fn new(m: usize) -> Self {
        debug_assert!(m > 0);
        Self {
            m,
            ex: 0.0,
            ex2: 0.0,
        }
    }

    /// Replace the running sums with exact sums over `prefix`.
    pub fn reset(&mut self, prefix: &[f64]) {
        debug_assert!(prefix.len() < self.m);
        self.ex = 0.0;
        self.ex2 = 0.0;
        for &x in prefix {
            self.ex += x;
            self.ex2 += x * x;
        }
    }

    /// Add the element entering the window.
    #[inline]
    pub fn push(&mut self, x: f64) {
        self.ex += x;
        self.ex2 += x * x;
    }

    /// Remove the element leaving the window.
    ///
    /// A non-finite `x` cannot be subtracted back out and leaves the sums
    /// NaN; the caller must [`reset`](Self::reset) afterwards.
    #[inline]
    pub fn pop(&mut self, x: f64) {
        self.ex -= x;
        self.ex2 -= x * x;
    }

    /// Window length.
    pub fn len(&self) -> usize {
        self.m
    }

    /// Whether the window length is zero. Always false for a constructed tracker.
    pub fn is_empty(&self) -> bool {
        self.m == 0
    }

    /// Raw `(sum, sum of squares)` of the current window.
    pub fn sums(&self) -> (f64, f64) {
        (self.ex, self.ex2)
    }

    /// Population mean and standard deviation of the current window.
    ///
    /// Variance is `E[X^2] - E[X]^2`, clamped to 0 against cancellation.
    #[inline]
    pub fn mean_std(&self) -> (f64, f64) {
        let m_f = self.m as f64;
        let mean = self.ex / m_f;
        let var = (self.ex2 / m_f - mean * mean).max(0.0);
        (mean, var.sqrt())
    }
}

/// Rolling mean and standard deviation for all subsequences of length `m`.
///
/// Computed in one pass over cumulative sums and sums-of-squares. Used by the
/// in-memory MASS baseline, which needs every window's statistics at once.
#[derive(Debug, Clone)]
pub struct RollingStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl RollingStats {
    /// Compute rolling statistics for subsequences of length `m`.
    ///
    /// Returns empty vectors when `ts` is shorter than `m`.
    pub fn compute(ts: &[f64], m: usize) -> Self {
        if m == 0 || ts.len() < m {
            return Self {
                mean: Vec::new(),
                std: Vec::new(),
            };
        }

        let n = ts.len();
        let n_subs = n - m + 1;

        let mut cumsum = vec![0.0; n + 1];
        let mut cumsum_sq = vec![0.0; n + 1];
        for i in 0..n {
            cumsum[i + 1] = cumsum[i] + ts[i];
            cumsum_sq[i + 1] = cumsum_sq[i] + ts[i] * ts[i];
        }

        let m_f = m as f64;
        let (mean, std) = (0..n_subs)
            .map(|i| {
                let sum = cumsum[i + m] - cumsum[i];
                let sum_sq = cumsum_sq[i + m] - cumsum_sq[i];
                let mu = sum / m_f;
                let var = (sum_sq / m_f - mu * mu).max(0.0);
                (mu, var.sqrt())
            })
            .unzip();

        Self { mean, std }
    }

    /// Number of subsequences covered.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Whether subsequence `i` is constant.
    #[inline]
    pub fn is_constant(&self, i: usize) -> bool {
        is_constant(self.mean[i], self.std[i])
    }
}
