use ndarray::{Array, Array2};
use ndarray_linalg::Scalar;
use num_traits::Float;

use crate::Result;

/// Generate the Vandermonde matrix of `degree` for observations `x`
///
/// The Vandermonde matrix is a (n x degree + 1) matrix. Each row of the matrix is a geometric
/// progression for an individual observation `x` from power `0` to `degree` inclusive, so a
/// degree-one matrix is the design matrix of a straight-line least-squares fit.
///
/// # Examples
///
/// ```
/// use mnp_sorption::math::vandermonde;
/// use ndarray::arr2;
///
/// let observations: Vec<f64> = vec![2., 3.];
/// let vander = vandermonde(&observations, 2).unwrap();
///
/// let expected = arr2(&[[1., 2., 4.], [1., 3., 9.]]);
/// assert_eq!(vander, expected);
/// ```
pub fn vandermonde<T: Copy + Scalar>(x: &[T], degree: usize) -> Result<Array2<T>> {
    let vals = x.iter().flat_map(|&xi| {
        (0..=degree).scan(T::one(), move |power, _| {
            let current = *power;
            *power = *power * xi;
            Some(current)
        })
    });

    Ok(Array::from_iter(vals).into_shape((x.len(), degree + 1))?)
}

/// Coefficient of determination of `predicted` against `observed`
///
/// $$
///     R^2 = 1 - \frac{\sum_i (y_i - \hat{y}_i)^2}{\sum_i (y_i - \bar{y})^2}
/// $$
///
/// Constant observations have no variance to explain: a perfect prediction scores one, anything
/// else scores zero.
pub fn r_squared<T: Float>(observed: &[T], predicted: &[T]) -> T {
    let count = <T as num_traits::NumCast>::from(observed.len()).unwrap_or_else(T::one);
    let mean = observed.iter().fold(T::zero(), |acc, &y| acc + y) / count;

    let (residual, total) = observed.iter().zip(predicted).fold(
        (T::zero(), T::zero()),
        |(residual, total), (&y, &y_hat)| {
            (
                residual + (y - y_hat).powi(2),
                total + (y - mean).powi(2),
            )
        },
    );

    if total == T::zero() {
        return if residual == T::zero() {
            T::one()
        } else {
            T::zero()
        };
    }

    T::one() - residual / total
}
