use ndarray::{Array2, ArrayD, ArrayView2, Axis, Ix1, Ix2, IxDyn};

use crate::{CfxError, Result};

/// Views `x` as a single instance shaped `(1, k)`.
///
/// Accepts `(k,)` and `(1, k)`; any other shape is rejected.
pub(crate) fn as_single_instance(x: &ArrayD<f32>) -> Result<ArrayView2<'_, f32>> {
    if let Ok(flat) = x.view().into_dimensionality::<Ix1>() {
        return Ok(flat.insert_axis(Axis(0)));
    }

    match x.view().into_dimensionality::<Ix2>() {
        Ok(batched) if batched.nrows() == 1 => Ok(batched),
        _ => Err(CfxError::InvalidShape {
            what: "input",
            shape: x.shape().to_vec(),
        }),
    }
}

/// Adapts a batch-shaped function to single-instance inputs.
///
/// The returned function accepts an array shaped `(k,)` or `(1, k)`, calls
/// `f` exactly once with a `(1, k)` view, and reshapes the result back to
/// the caller's original shape. A multi-row input fails with a shape error
/// naming the offending shape; a result whose element count does not match
/// the input fails with an error describing both shapes.
pub fn single_instance<F>(f: F) -> impl Fn(&ArrayD<f32>) -> Result<ArrayD<f32>>
where
    F: Fn(ArrayView2<f32>) -> Result<Array2<f32>>,
{
    move |x| {
        let x_shape = x.shape().to_vec();
        let out = f(as_single_instance(x)?)?;

        let Ok(reshaped) = out.to_shape(IxDyn(&x_shape)) else {
            return Err(CfxError::IncompatibleReshape {
                got: out.shape().to_vec(),
                expected: x_shape,
            });
        };

        Ok(reshaped.into_owned())
    }
}
