use ndarray::ArrayView2;

use crate::{
    CfxError, Result,
    net::{Module, Transformed},
};

/// Strategy for turning gradients into parameter updates.
///
/// Implementations are pure: whatever accumulators an algorithm needs live in
/// `State`, which is consumed and returned by every [`update`] call. Nothing
/// is retained between calls.
///
/// [`update`]: GradientTransformation::update
pub trait GradientTransformation {
    /// Opaque accumulator threaded through successive update steps.
    type State;

    /// Creates the initial optimizer state for a parameter collection.
    fn init(&self, params: &[f32]) -> Self::State;

    /// Computes parameter updates from gradients.
    ///
    /// # Arguments
    /// * `grads` - The gradient, same length as `params`.
    /// * `state` - The optimizer state from the previous step.
    /// * `params` - The current parameters.
    ///
    /// # Returns
    /// The additive updates (`new = old + update`) and the next state, or an
    /// error if the buffer lengths disagree.
    fn update(
        &self,
        grads: &[f32],
        state: Self::State,
        params: &[f32],
    ) -> Result<(Vec<f32>, Self::State)>;
}

fn check_len(a: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(CfxError::SizeMismatch {
            a,
            b: "params",
            got,
            expected,
        });
    }
    Ok(())
}

/// Plain gradient descent.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Creates a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The length of the step taken against the gradient.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl GradientTransformation for GradientDescent {
    type State = ();

    fn init(&self, _params: &[f32]) -> Self::State {}

    fn update(
        &self,
        grads: &[f32],
        state: Self::State,
        params: &[f32],
    ) -> Result<(Vec<f32>, Self::State)> {
        check_len("grads", grads.len(), params.len())?;

        let lr = self.learning_rate;
        let updates = grads.iter().map(|g| -lr * g).collect();

        Ok((updates, state))
    }
}

/// Gradient descent with a velocity term.
#[derive(Debug, Clone)]
pub struct GradientDescentWithMomentum {
    learning_rate: f32,
    momentum: f32,
}

/// Accumulated velocity, one entry per parameter.
#[derive(Debug, Clone)]
pub struct MomentumState {
    velocity: Vec<f32>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum`.
    ///
    /// # Arguments
    /// * `learning_rate` - The length of the step taken along the velocity.
    /// * `momentum` - How much of the previous velocity each step keeps.
    pub fn new(learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
        }
    }
}

impl GradientTransformation for GradientDescentWithMomentum {
    type State = MomentumState;

    fn init(&self, params: &[f32]) -> Self::State {
        MomentumState {
            velocity: vec![0.0; params.len()],
        }
    }

    fn update(
        &self,
        grads: &[f32],
        mut state: Self::State,
        params: &[f32],
    ) -> Result<(Vec<f32>, Self::State)> {
        check_len("grads", grads.len(), params.len())?;
        check_len("opt state", state.velocity.len(), params.len())?;

        let lr = self.learning_rate;
        let mu = self.momentum;

        let mut updates = Vec::with_capacity(grads.len());
        for (v, g) in state.velocity.iter_mut().zip(grads) {
            *v = mu * *v + g;
            updates.push(-lr * *v);
        }

        Ok((updates, state))
    }
}

/// Adam.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
}

/// First and second moment estimates plus the running decay products.
#[derive(Debug, Clone)]
pub struct AdamState {
    beta1_t: f32,
    beta2_t: f32,
    v: Vec<f32>,
    s: Vec<f32>,
}

impl Adam {
    /// Creates a new `Adam`.
    ///
    /// # Arguments
    /// * `learning_rate` - The base step length, before bias correction.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the algorithm.
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        }
    }
}

impl GradientTransformation for Adam {
    type State = AdamState;

    fn init(&self, params: &[f32]) -> Self::State {
        AdamState {
            beta1_t: 1.0,
            beta2_t: 1.0,
            v: vec![0.0; params.len()],
            s: vec![0.0; params.len()],
        }
    }

    fn update(
        &self,
        grads: &[f32],
        mut state: Self::State,
        params: &[f32],
    ) -> Result<(Vec<f32>, Self::State)> {
        check_len("grads", grads.len(), params.len())?;
        check_len("opt state", state.v.len(), params.len())?;

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
        } = *self;

        state.beta1_t *= b1;
        state.beta2_t *= b2;

        let bc1 = 1.0 - state.beta1_t;
        let bc2 = 1.0 - state.beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        let mut updates = Vec::with_capacity(grads.len());
        for ((g, v), s) in grads.iter().zip(state.v.iter_mut()).zip(state.s.iter_mut()) {
            *v = b1 * *v + (1.0 - b1) * g;
            *s = b2 * *s + (1.0 - b2) * g.powi(2);
            updates.push(-step_size * *v / (s.sqrt() + eps));
        }

        Ok((updates, state))
    }
}

/// Initializes a transformed model and an optimizer together.
///
/// Runs one forward pass in training mode so shape problems surface before
/// any update step.
///
/// # Arguments
/// * `net` - The transformed model.
/// * `opt` - The optimizer.
/// * `x` - An example input batch.
/// * `seed` - Seed for parameter initialization.
///
/// # Returns
/// The initialized parameters and optimizer state.
pub fn init_net_opt<M, O>(
    net: &Transformed<M>,
    opt: &O,
    x: ArrayView2<f32>,
    seed: u64,
) -> Result<(Vec<f32>, O::State)>
where
    M: Module,
    O: GradientTransformation,
{
    let params = net.init(seed, x);
    net.apply(&params, x, true)?;
    let opt_state = opt.init(&params);

    Ok((params, opt_state))
}

/// Performs one optimizer update step.
///
/// Pure: the inputs are not mutated, the updated parameters and state are
/// returned.
///
/// # Arguments
/// * `grads` - The gradient of the loss with respect to `params`.
/// * `params` - The current parameters.
/// * `opt_state` - The optimizer state from the previous step.
/// * `opt` - The optimizer.
///
/// # Returns
/// The updated parameters and the next optimizer state.
pub fn grad_update<O: GradientTransformation>(
    grads: &[f32],
    params: &[f32],
    opt_state: O::State,
    opt: &O,
) -> Result<(Vec<f32>, O::State)> {
    let (updates, opt_state) = opt.update(grads, opt_state, params)?;
    let params = params.iter().zip(&updates).map(|(p, u)| p + u).collect();

    Ok((params, opt_state))
}
