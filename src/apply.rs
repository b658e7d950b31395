//! Apply a reducing function over rolling or expanding windows of one or
//! more aligned arrays.
use crate::error::{NumpyExtError, Result};
use crate::nan_ops::prepend_na;
use crate::parallel::Jobs;
use crate::window::{check_min_periods, check_window};
use ndarray::{s, Array1, ArrayView1};
use tracing::debug;

/// Length shared by every input array.
pub(crate) fn common_len(arrays: &[ArrayView1<f64>]) -> Result<usize> {
    let (first, rest) = arrays.split_first().ok_or(NumpyExtError::NoArrays)?;
    let expected = first.len();
    match rest.iter().find(|a| a.len() != expected) {
        Some(bad) => Err(NumpyExtError::LengthMismatch {
            expected,
            found: bad.len(),
        }),
        None => Ok(expected),
    }
}

/// Apply `func` to every rolling window of `arrays`.
///
/// `func` receives one slice per input array, in the order given, each of
/// length `window` and ending at the same index. Any extra parameters are
/// captured by the closure. The first `window - 1` entries of the result are
/// NaN so that it lines up with the inputs.
///
/// ```
/// use ndarray::array;
/// use numpy_ext::{rolling_apply, Jobs};
///
/// let a = array![1.0, 2.0, 3.0, 4.0, 5.0];
/// let b = array![1.5, 2.5, 3.5, 4.5, 5.5];
/// let k = -1.0;
/// let out = rolling_apply(
///     |w| (w[0].sum() + w[1].fold(f64::MIN, |m, &x| m.max(x))) * k,
///     2,
///     &[a.view(), b.view()],
///     Jobs::Sequential,
/// )
/// .unwrap();
/// assert!(out[0].is_nan());
/// assert_eq!(out.slice(ndarray::s![1..]), array![-5.5, -8.5, -11.5, -14.5]);
/// ```
pub fn rolling_apply<F>(
    func: F,
    window: usize,
    arrays: &[ArrayView1<f64>],
    jobs: Jobs,
) -> Result<Array1<f64>>
where
    F: Fn(&[ArrayView1<f64>]) -> f64 + Sync + Send,
{
    let len = common_len(arrays)?;
    check_window(len, window)?;

    debug!(
        window,
        arrays = arrays.len(),
        windows = len + 1 - window,
        jobs = ?jobs,
        "dispatching rolling_apply"
    );

    let values = jobs.map_indices(window - 1..len, |end| {
        let start = end + 1 - window;
        let slices: Vec<ArrayView1<f64>> =
            arrays.iter().map(|a| a.slice(s![start..=end])).collect();
        func(&slices)
    })?;

    Ok(prepend_na(ArrayView1::from(values.as_slice()), window - 1))
}

/// Apply `func` to every expanding window `arrays[*][..=i]` holding at
/// least `min_periods` elements.
///
/// The first `min_periods - 1` entries of the result are NaN.
pub fn expanding_apply<F>(
    func: F,
    min_periods: usize,
    arrays: &[ArrayView1<f64>],
    jobs: Jobs,
) -> Result<Array1<f64>>
where
    F: Fn(&[ArrayView1<f64>]) -> f64 + Sync + Send,
{
    let len = common_len(arrays)?;
    check_min_periods(len, min_periods)?;

    debug!(
        min_periods,
        arrays = arrays.len(),
        windows = len + 1 - min_periods,
        jobs = ?jobs,
        "dispatching expanding_apply"
    );

    let values = jobs.map_indices(min_periods - 1..len, |end| {
        let slices: Vec<ArrayView1<f64>> = arrays.iter().map(|a| a.slice(s![..=end])).collect();
        func(&slices)
    })?;

    Ok(prepend_na(ArrayView1::from(values.as_slice()), min_periods - 1))
}
