use ndarray::{Array1, Array2, ArrayView2, Zip};

/// Predictions are clamped into `[CLIP, 1 - CLIP]` before taking logs.
const CLIP: f32 = 1e-7;

/// Per-sample binary cross-entropy loss, no reduction.
///
/// # Arguments
/// * `preds` - Predicted probabilities.
/// * `labels` - Ground-truth labels in {0, 1}.
///
/// # Returns
/// The elementwise loss, same shape as `preds`. Finite for any prediction in
/// `[0, 1]`, boundaries included.
pub fn binary_cross_entropy(preds: ArrayView2<f32>, labels: ArrayView2<f32>) -> Array2<f32> {
    let mut loss = Array2::zeros(preds.raw_dim());

    Zip::from(&mut loss)
        .and(&preds)
        .and(&labels)
        .for_each(|l, &p, &y| {
            let p = p.clamp(CLIP, 1.0 - CLIP);
            *l = -y * p.ln() - (1.0 - y) * (1.0 - p).ln();
        });

    loss
}

/// Elementwise logistic sigmoid, computed via the tanh identity so large
/// magnitudes saturate instead of overflowing.
pub fn sigmoid(x: ArrayView2<f32>) -> Array2<f32> {
    x.mapv(|v| 0.5 * ((v * 0.5).tanh() + 1.0))
}

/// Fraction of positions where `y_true` and `y_pred` round to the same
/// integer.
pub fn accuracy(y_true: ArrayView2<f32>, y_pred: ArrayView2<f32>) -> f32 {
    let hits = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t.round() == p.round())
        .count();

    hits as f32 / y_true.len() as f32
}

/// Mean per-row L-`ord` distance between `x` and `cf`.
///
/// `ord` selects the norm taken along the last axis; it must be >= 1.
pub fn dist(x: ArrayView2<f32>, cf: ArrayView2<f32>, ord: u32) -> f32 {
    let diff = &x - &cf;

    let norms: Array1<f32> = diff
        .rows()
        .into_iter()
        .map(|row| match ord {
            1 => row.iter().map(|d| d.abs()).sum(),
            2 => row.iter().map(|d| d * d).sum::<f32>().sqrt(),
            p => row
                .iter()
                .map(|d| d.abs().powi(p as i32))
                .sum::<f32>()
                .powf(1.0 / p as f32),
        })
        .collect();

    norms.mean().unwrap_or_default()
}

/// Mean absolute difference between `x` and `cf` (L1 distance).
pub fn proximity(x: ArrayView2<f32>, cf: ArrayView2<f32>) -> f32 {
    dist(x, cf, 1)
}
