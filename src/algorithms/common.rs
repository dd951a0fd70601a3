use realfft::RealFftPlanner;

use crate::error::{Result, SearchError};

/// Size threshold (n * m) above which we dispatch to the FFT path.
/// Below this, the naive O(n*m) loop wins due to lower constant overhead.
const FFT_THRESHOLD: usize = 256 * 1024;

fn check_lengths(q: &[f64], ts: &[f64]) -> Result<()> {
    if q.is_empty() || ts.len() < q.len() {
        return Err(SearchError::invalid(format!(
            "sliding dot product needs 0 < query length ({}) <= series length ({})",
            q.len(),
            ts.len()
        )));
    }
    Ok(())
}

/// Compute the sliding dot product between a query `q` and time series `ts`.
///
/// Returns a vector of length `ts.len() - q.len() + 1` where element `i` is
/// `dot(q, ts[i..i+m])`. Dispatches to the FFT implementation for large
/// inputs.
pub fn sliding_dot_product(q: &[f64], ts: &[f64]) -> Result<Vec<f64>> {
    if ts.len() * q.len() > FFT_THRESHOLD {
        sliding_dot_product_fft(q, ts)
    } else {
        sliding_dot_product_naive(q, ts)
    }
}

/// Naive O(n*m) sliding dot product.
pub fn sliding_dot_product_naive(q: &[f64], ts: &[f64]) -> Result<Vec<f64>> {
    check_lengths(q, ts)?;
    let m = q.len();
    let n_subs = ts.len() - m + 1;

    Ok((0..n_subs)
        .map(|i| q.iter().zip(&ts[i..i + m]).map(|(a, b)| a * b).sum())
        .collect())
}

/// FFT-based O(n log n) sliding dot product via cross-correlation.
///
/// Convolves the reversed query with the series using a real-to-complex FFT.
pub fn sliding_dot_product_fft(q: &[f64], ts: &[f64]) -> Result<Vec<f64>> {
    check_lengths(q, ts)?;
    let m = q.len();
    let n = ts.len();
    let n_subs = n - m + 1;
    let fft_len = (n + m - 1).next_power_of_two();

    let mut planner = RealFftPlanner::<f64>::new();
    let fft_forward = planner.plan_fft_forward(fft_len);
    let fft_inverse = planner.plan_fft_inverse(fft_len);

    let mut q_padded = vec![0.0; fft_len];
    for (dst, &src) in q_padded.iter_mut().zip(q.iter().rev()) {
        *dst = src;
    }
    let mut ts_padded = vec![0.0; fft_len];
    ts_padded[..n].copy_from_slice(ts);

    let fft_err = |e: realfft::FftError| SearchError::invalid(format!("FFT failed: {e}"));

    let mut q_spectrum = fft_forward.make_output_vec();
    let mut ts_spectrum = fft_forward.make_output_vec();
    fft_forward
        .process(&mut q_padded, &mut q_spectrum)
        .map_err(fft_err)?;
    fft_forward
        .process(&mut ts_padded, &mut ts_spectrum)
        .map_err(fft_err)?;

    for (q_val, ts_val) in q_spectrum.iter_mut().zip(ts_spectrum.iter()) {
        *q_val *= ts_val;
    }

    let mut result = vec![0.0; fft_len];
    fft_inverse
        .process(&mut q_spectrum, &mut result)
        .map_err(fft_err)?;

    // realfft inverse is unnormalized
    let norm = 1.0 / fft_len as f64;
    Ok(result[m - 1..m - 1 + n_subs]
        .iter()
        .map(|&x| x * norm)
        .collect())
}
