use ndarray::{Array2, ArrayView1, ArrayView2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::StandardNormal;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    CfxError, Result,
    config::{ConfigCls, Configs, validate_configs},
    metrics::sigmoid,
};

/// A model definition.
///
/// A `Module` owns no parameters and no mutable state: `init` creates the
/// flat parameter collection for the model and `apply` evaluates it.
/// Whatever state a model has is threaded explicitly through the parameter
/// buffer.
pub trait Module {
    /// Creates the parameter collection.
    ///
    /// # Arguments
    /// * `rng` - Source of randomness for parameter initialization.
    /// * `x` - An example input batch, for modules that infer shapes from it.
    fn init(&self, rng: &mut StdRng, x: ArrayView2<f32>) -> Vec<f32>;

    /// Evaluates the model on a batch.
    ///
    /// # Arguments
    /// * `params` - The flat parameter collection produced by `init`.
    /// * `x` - The input batch, `[n_samples, n_features]`.
    /// * `training` - Whether this is a training-mode pass; always forwarded,
    ///   modules without stochastic layers may ignore it.
    fn apply(&self, params: &[f32], x: ArrayView2<f32>, training: bool) -> Result<Array2<f32>>;
}

/// A stateless (init, apply) pair wrapping a [`Module`].
#[derive(Debug, Clone)]
pub struct Transformed<M> {
    module: M,
}

impl<M: Module> Transformed<M> {
    /// Maps a random seed and an example input to a parameter collection.
    pub fn init(&self, seed: u64, x: ArrayView2<f32>) -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.module.init(&mut rng, x)
    }

    /// Maps parameters, an input batch and a training flag to the model
    /// output.
    pub fn apply(&self, params: &[f32], x: ArrayView2<f32>, training: bool) -> Result<Array2<f32>> {
        self.module.apply(params, x, training)
    }
}

/// Builds a [`Transformed`] model from configuration data.
///
/// The configuration source is validated first, then handed to `build` to
/// construct the module.
///
/// # Arguments
/// * `configs` - A raw JSON mapping or an existing configuration instance.
/// * `build` - Constructs the module from the validated configuration.
pub fn make_model<C, S, M, F>(configs: S, build: F) -> Result<Transformed<M>>
where
    C: ConfigCls,
    S: Into<Configs<C>>,
    M: Module,
    F: FnOnce(C) -> M,
{
    let configs = validate_configs(configs)?;
    Ok(Transformed {
        module: build(configs),
    })
}

/// Wraps a pre-instantiated module, constructed with explicit arguments
/// rather than a configuration mapping.
pub fn make_module<M: Module>(module: M) -> Transformed<M> {
    Transformed { module }
}

/// Configuration for the reference [`Mlp`] module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Layer widths, input features first, output units last.
    pub sizes: Vec<usize>,
}

impl ConfigCls for MlpConfig {}

/// A fully-connected sigmoid network.
///
/// Parameters live in one flat buffer, laid out layer by layer as the weight
/// matrix followed by the bias vector.
#[derive(Debug, Clone)]
pub struct Mlp {
    dims: Vec<(usize, usize)>,
}

impl Mlp {
    pub fn new(configs: &MlpConfig) -> Self {
        let dims = configs.sizes.windows(2).map(|w| (w[0], w[1])).collect();
        Self { dims }
    }

    /// The number of scalar parameters this model expects.
    pub fn num_params(&self) -> usize {
        self.dims.iter().map(|&(i, o)| (i + 1) * o).sum()
    }
}

impl Module for Mlp {
    fn init(&self, rng: &mut StdRng, _x: ArrayView2<f32>) -> Vec<f32> {
        let mut params = Vec::with_capacity(self.num_params());

        for &(fan_in, fan_out) in &self.dims {
            let scale = 1.0 / (fan_in as f32).sqrt();
            let w: Array2<f32> = Array2::random_using((fan_in, fan_out), StandardNormal, rng);
            params.extend(w.iter().map(|v| v * scale));
            // biases start at zero
            params.resize(params.len() + fan_out, 0.0);
        }

        params
    }

    fn apply(&self, params: &[f32], x: ArrayView2<f32>, _training: bool) -> Result<Array2<f32>> {
        let expected = self.num_params();
        if params.len() != expected {
            return Err(CfxError::SizeMismatch {
                a: "params",
                b: "model",
                got: params.len(),
                expected,
            });
        }
        if let Some(&(in_dim, _)) = self.dims.first() {
            if x.ncols() != in_dim {
                return Err(CfxError::SizeMismatch {
                    a: "input columns",
                    b: "model",
                    got: x.ncols(),
                    expected: in_dim,
                });
            }
        }

        let mut a = x.to_owned();
        let mut rest = params;

        for &(fan_in, fan_out) in &self.dims {
            let (w_raw, tail) = rest.split_at(fan_in * fan_out);
            let (b_raw, tail) = tail.split_at(fan_out);
            rest = tail;

            // total length checked up front, the views cannot fail
            let w = ArrayView2::from_shape((fan_in, fan_out), w_raw).unwrap();
            let b = ArrayView1::from_shape(fan_out, b_raw).unwrap();

            let z = a.dot(&w) + &b;
            a = sigmoid(z.view());
        }

        Ok(a)
    }
}
