//! Exponentially spaced ranges and element-wise mapping.
use crate::error::{NumpyExtError, Result};
use ndarray::{Array, Array1, ArrayView, ArrayView1, Dimension};
use std::collections::HashSet;

/// Return values from `start` towards `end` (exclusive) where the spacing
/// grows by `step_mult` after every value but never drops below `min_step`.
///
/// The direction of travel follows the sign of `end - start`, so a
/// decreasing range is produced when `end < start`. `start == end` gives an
/// empty array.
///
/// ```
/// use ndarray::array;
/// use numpy_ext::expstep_range;
///
/// let r = expstep_range(1.0, 100.0, 1.0, 1.5).unwrap();
/// assert_eq!(
///     r,
///     array![1.0, 2.0, 3.5, 5.75, 9.125, 14.1875, 21.78125, 33.171875, 50.2578125, 75.88671875]
/// );
/// ```
pub fn expstep_range(start: f64, end: f64, min_step: f64, step_mult: f64) -> Result<Array1<f64>> {
    if step_mult <= 0.0 || step_mult.is_nan() {
        return Err(NumpyExtError::InvalidStepMultiplier(step_mult));
    }
    if min_step <= 0.0 || min_step.is_nan() {
        return Err(NumpyExtError::InvalidMinStep(min_step));
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(NumpyExtError::NonFiniteBound { start, end });
    }

    let sign = if start < end { 1.0 } else { -1.0 };
    let before_end = |x: f64| (start < end && x < end) || (start > end && x > end);

    let mut values = Vec::new();
    let mut last = start;
    let mut step = min_step;
    while before_end(last) {
        values.push(last);
        let next = last + step.max(min_step) * sign;
        if next == last {
            return Err(NumpyExtError::StepUnderflow { at: last });
        }
        last = next;
        step = (step * step_mult).abs();
    }
    Ok(Array1::from_vec(values))
}

/// Like [`expstep_range`], with `round` applied to every value.
///
/// Values repeated after rounding are dropped; the first occurrence is kept
/// and the original order is preserved.
///
/// ```
/// use ndarray::array;
/// use numpy_ext::expstep_range_rounded;
///
/// let r = expstep_range_rounded(1.0, 100.0, 1.0, 1.5, f64::ceil).unwrap();
/// assert_eq!(r, array![1.0, 2.0, 4.0, 6.0, 10.0, 15.0, 22.0, 34.0, 51.0, 76.0]);
/// ```
pub fn expstep_range_rounded<R>(
    start: f64,
    end: f64,
    min_step: f64,
    step_mult: f64,
    round: R,
) -> Result<Array1<f64>>
where
    R: Fn(f64) -> f64,
{
    let rounded = expstep_range(start, end, min_step, step_mult)?.mapv(round);
    Ok(first_occurrences(rounded.view())
        .into_iter()
        .map(|i| rounded[i])
        .collect())
}

/// Indices of the first occurrence of every distinct value, in order.
pub(crate) fn first_occurrences(values: ArrayView1<f64>) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .enumerate()
        // -0.0 and 0.0 are the same value
        .filter(|(_, x)| seen.insert(if **x == 0.0 { 0u64 } else { x.to_bits() }))
        .map(|(i, _)| i)
        .collect()
}

/// Apply `func` to each element of `array`, keeping its shape.
///
/// ```
/// use ndarray::array;
/// use numpy_ext::apply_map;
///
/// let out = apply_map(|&x| if x < 3 { 0 } else { 1 }, array![[2, 2], [3, 3]].view());
/// assert_eq!(out, array![[0, 0], [1, 1]]);
/// ```
pub fn apply_map<A, B, D, F>(func: F, array: ArrayView<A, D>) -> Array<B, D>
where
    D: Dimension,
    F: FnMut(&A) -> B,
{
    array.map(func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_expstep_range_increasing() {
        let r = expstep_range(1.0, 100.0, 1.0, 1.5).unwrap();
        assert_eq!(r.len(), 10);
        assert_eq!(r[0], 1.0);
        assert_eq!(r[9], 75.88671875);
        assert!(r.iter().all(|&x| x < 100.0));
    }

    #[test]
    fn test_expstep_range_decreasing() {
        let r = expstep_range(-1.0, -100.0, 1.0, 1.5).unwrap();
        assert_eq!(
            r,
            array![
                -1.0,
                -2.0,
                -3.5,
                -5.75,
                -9.125,
                -14.1875,
                -21.78125,
                -33.171875,
                -50.2578125,
                -75.88671875
            ]
        );
    }

    #[test]
    fn test_expstep_range_truncated() {
        let r = expstep_range_rounded(100.0, 1.0, 1.0, 1.5, f64::trunc).unwrap();
        assert_eq!(
            r,
            array![100.0, 99.0, 97.0, 95.0, 91.0, 86.0, 79.0, 67.0, 50.0, 25.0]
        );
    }

    #[test]
    fn test_expstep_range_rounded_dedupes() {
        // Steps of 0.5 collapse pairwise under floor
        let r = expstep_range_rounded(0.0, 3.0, 0.5, 1.0, f64::floor).unwrap();
        assert_eq!(r, array![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_expstep_range_min_step_floor() {
        // A shrinking multiplier never takes the step below min_step
        let r = expstep_range(0.0, 5.0, 1.0, 0.5).unwrap();
        assert_eq!(r, array![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_expstep_range_empty() {
        assert_eq!(expstep_range(5.0, 5.0, 1.0, 2.0).unwrap().len(), 0);
    }

    #[test]
    fn test_expstep_range_errors() {
        assert_eq!(
            expstep_range(1.0, 10.0, 1.0, 0.0).unwrap_err(),
            NumpyExtError::InvalidStepMultiplier(0.0)
        );
        assert_eq!(
            expstep_range(1.0, 10.0, -1.0, 1.0).unwrap_err(),
            NumpyExtError::InvalidMinStep(-1.0)
        );
        // step_mult is checked first
        assert!(matches!(
            expstep_range(1.0, 10.0, 0.0, -2.0),
            Err(NumpyExtError::InvalidStepMultiplier(_))
        ));
        assert!(matches!(
            expstep_range(1.0, f64::INFINITY, 1.0, 1.0),
            Err(NumpyExtError::NonFiniteBound { .. })
        ));
        assert!(matches!(
            expstep_range(1e20, 2e20, 1.0, 1.0),
            Err(NumpyExtError::StepUnderflow { .. })
        ));
    }

    #[test]
    fn test_first_occurrences() {
        let v = array![3.0, 3.0, -0.0, 0.0, 1.0, 3.0];
        assert_eq!(first_occurrences(v.view()), vec![0, 2, 4]);
    }

    #[test]
    fn test_apply_map() {
        let a = array![[2, 2], [3, 3]];
        let out = apply_map(|&x| if x < 3 { 0 } else { 1 }, a.view());
        assert_eq!(out, array![[0, 0], [1, 1]]);

        let f = array![1.0, 4.0, 9.0];
        assert_eq!(apply_map(|x: &f64| x.sqrt(), f.view()), array![1.0, 2.0, 3.0]);
    }
}
