use log::warn;
use ndarray::{Array2, ArrayView2, s};
use serde::{Deserialize, Serialize};

/// One categorical feature encoded as a contiguous block of one-hot columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotGroup {
    /// The category levels, in column order.
    pub levels: Vec<String>,
}

impl OneHotGroup {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of columns this group occupies.
    pub fn width(&self) -> usize {
        self.levels.len()
    }
}

/// Categorical metadata carried by an explanation module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatInfo {
    /// Column index where the categorical blocks begin.
    pub cat_idx: usize,
    /// The one-hot groups, in column order.
    pub groups: Vec<OneHotGroup>,
}

impl CatInfo {
    /// Whether any categorical metadata has been configured.
    pub fn is_configured(&self) -> bool {
        self.cat_idx != 0 || !self.groups.is_empty()
    }
}

/// Emits an advisory warning when `module` is about to generate
/// counterfactuals without categorical metadata configured.
///
/// Execution proceeds regardless; without metadata the generated explanations
/// simply will not respect one-hot encoding constraints.
pub fn warn_if_unconfigured(module: &str, info: &CatInfo) {
    if !info.is_configured() {
        warn!(
            module = module;
            "no categorical metadata configured, generated counterfactuals will not respect one-hot constraints"
        );
    }
}

/// Projects the categorical blocks of `cf` onto valid one-hot encodings.
///
/// Columns `[0, cat_idx)` are the numeric prefix and are copied unchanged.
/// Each group's block is replaced row-wise: with `hard` set, by the one-hot
/// vector selecting the block's arg-max (first maximum wins); otherwise by a
/// softmax over the block, so every row becomes a probability vector.
///
/// Group widths are not validated against the column count of `cf`; the
/// caller must pass groups that, together with the numeric prefix, tile the
/// full feature vector.
///
/// # Arguments
/// * `cf` - Unnormalized counterfactuals, `[n_samples, n_features]`.
/// * `groups` - The one-hot groups, in column order.
/// * `cat_idx` - Column index where the categorical blocks begin.
/// * `hard` - Select hard one-hot vectors instead of softmax probabilities.
///
/// # Returns
/// An array of the same shape as `cf` with every categorical block
/// normalized.
pub fn cat_normalize(
    cf: ArrayView2<f32>,
    groups: &[OneHotGroup],
    cat_idx: usize,
    hard: bool,
) -> Array2<f32> {
    let mut out = cf.to_owned();
    let mut start = cat_idx;

    for group in groups {
        let end = start + group.width();
        if start == end {
            continue;
        }

        let mut block = out.slice_mut(s![.., start..end]);

        if hard {
            for mut row in block.rows_mut() {
                let mut best = 0;
                let mut best_val = row[0];
                for (i, &v) in row.iter().enumerate() {
                    if v > best_val {
                        best = i;
                        best_val = v;
                    }
                }
                row.fill(0.0);
                row[best] = 1.0;
            }
        } else {
            for mut row in block.rows_mut() {
                // max-subtracted softmax, exp never overflows
                let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
                row.mapv_inplace(|v| (v - max).exp());
                let sum = row.sum();
                row.mapv_inplace(|v| v / sum);
            }
        }

        start = end;
    }

    out
}
