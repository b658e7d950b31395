//! Operations with NaNs.
//!
//! Every function here returns a new array; inputs are only ever borrowed.
use ndarray::{Array, Array1, ArrayView, ArrayView1, Dimension, ShapeBuilder};

/// Return a new array of the given shape filled with NaN.
///
/// `shape` is anything ndarray accepts as a shape: a plain `usize` for a
/// 1-D array or a tuple such as `(2, 3)`.
///
/// ```
/// use numpy_ext::nans;
///
/// let a = nans(3);
/// assert_eq!(a.len(), 3);
/// assert!(a.iter().all(|x| x.is_nan()));
///
/// let m = nans((2, 2));
/// assert_eq!(m.shape(), &[2, 2]);
/// ```
pub fn nans<Sh, D>(shape: Sh) -> Array<f64, D>
where
    D: Dimension,
    Sh: ShapeBuilder<Dim = D>,
{
    Array::from_elem(shape, f64::NAN)
}

/// Return the non-NaN elements of `array`, flattened in logical order.
///
/// ```
/// use ndarray::array;
/// use numpy_ext::drop_na;
///
/// assert_eq!(drop_na(array![f64::NAN, 1.0, 2.0].view()), array![1.0, 2.0]);
/// ```
pub fn drop_na<D: Dimension>(array: ArrayView<f64, D>) -> Array1<f64> {
    array.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// Return a copy of `array` with NaNs replaced by `value`.
///
/// Infinities are left untouched; see [`fill_not_finite`].
pub fn fill_na<D: Dimension>(array: ArrayView<f64, D>, value: f64) -> Array<f64, D> {
    array.mapv(|x| if x.is_nan() { value } else { x })
}

/// Return a copy of `array` with NaNs and infinities replaced by `value`.
///
/// ```
/// use ndarray::array;
/// use numpy_ext::fill_not_finite;
///
/// let out = fill_not_finite(array![f64::NAN, f64::INFINITY, 1.0, 2.0].view(), 99.0);
/// assert_eq!(out, array![99.0, 99.0, 1.0, 2.0]);
/// ```
pub fn fill_not_finite<D: Dimension>(array: ArrayView<f64, D>, value: f64) -> Array<f64, D> {
    array.mapv(|x| if x.is_finite() { x } else { value })
}

/// Return a new array with `size` NaNs added before the elements of `array`.
pub fn prepend_na(array: ArrayView1<f64>, size: usize) -> Array1<f64> {
    let mut out = Vec::with_capacity(size + array.len());
    out.resize(size, f64::NAN);
    out.extend(array.iter().copied());
    Array1::from_vec(out)
}
