//! Rolling and expanding window iterators.
//!
//! Full windows are yielded as borrowed views into the input; rows that need
//! NaN padding are allocated.
use crate::error::{NumpyExtError, Result};
use crate::nan_ops::{nans, prepend_na};
use ndarray::{s, Array1, Array2, ArrayView1, CowArray, Ix1};

/// A single window row.
pub type Row<'a> = CowArray<'a, f64, Ix1>;

/// Check window arguments shared by [`rolling`] and `rolling_apply`.
pub(crate) fn check_window(len: usize, window: usize) -> Result<()> {
    if window == 0 {
        return Err(NumpyExtError::InvalidWindow);
    }
    if len < window {
        return Err(NumpyExtError::WindowTooLarge { window, len });
    }
    Ok(())
}

/// Check min_periods arguments shared by [`expanding`] and `expanding_apply`.
pub(crate) fn check_min_periods(len: usize, min_periods: usize) -> Result<()> {
    if min_periods == 0 {
        return Err(NumpyExtError::InvalidMinPeriods);
    }
    if len < min_periods {
        return Err(NumpyExtError::MinPeriodsTooLarge { min_periods, len });
    }
    Ok(())
}

/// Iterator over rolling windows, see [`rolling`].
#[derive(Debug, Clone)]
pub struct Rolling<'a> {
    array: ArrayView1<'a, f64>,
    window: usize,
    // index of the last element of the next row
    next: usize,
}

impl<'a> Iterator for Rolling<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.next;
        if i >= self.array.len() {
            return None;
        }
        self.next += 1;

        if i + 1 >= self.window {
            let start = i + 1 - self.window;
            Some(CowArray::from(self.array.slice_move(s![start..=i])))
        } else {
            let head = self.array.slice_move(s![..=i]);
            Some(CowArray::from(prepend_na(head, self.window - 1 - i)))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rolling<'_> {}

/// Return an iterator over rolling windows of size `window`.
///
/// Unless `skip_nans` is set, the first `window - 1` rows are left-padded
/// with NaN so that there is one row per input element.
///
/// ```
/// use ndarray::array;
/// use numpy_ext::rolling;
///
/// let a = array![1.0, 2.0, 3.0, 4.0, 5.0];
/// let sums: Vec<f64> = rolling(a.view(), 2, true)
///     .unwrap()
///     .map(|row| row.sum())
///     .collect();
/// assert_eq!(sums, vec![3.0, 5.0, 7.0, 9.0]);
/// ```
pub fn rolling(array: ArrayView1<'_, f64>, window: usize, skip_nans: bool) -> Result<Rolling<'_>> {
    check_window(array.len(), window)?;
    let next = if skip_nans { window - 1 } else { 0 };
    Ok(Rolling {
        array,
        window,
        next,
    })
}

/// Return the rolling windows stacked into a `(rows, window)` matrix.
pub fn rolling_matrix(array: ArrayView1<f64>, window: usize, skip_nans: bool) -> Result<Array2<f64>> {
    let rows = rolling(array, window, skip_nans)?;
    let mut out = Array2::from_elem((rows.len(), window), f64::NAN);
    for (mut dst, row) in out.rows_mut().into_iter().zip(rows) {
        dst.assign(&row);
    }
    Ok(out)
}

/// Iterator over expanding windows, see [`expanding`].
#[derive(Debug, Clone)]
pub struct Expanding<'a> {
    array: ArrayView1<'a, f64>,
    min_periods: usize,
    // number of NaN-only rows emitted before the first real one
    pad_rows: usize,
    pos: usize,
}

impl Expanding<'_> {
    fn total(&self) -> usize {
        self.pad_rows + self.array.len() + 1 - self.min_periods
    }
}

impl<'a> Iterator for Expanding<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.pos;
        if p >= self.total() {
            return None;
        }
        self.pos += 1;

        if p < self.pad_rows {
            return Some(CowArray::from(nans(p + 1)));
        }
        let end = self.min_periods + (p - self.pad_rows);
        Some(CowArray::from(self.array.slice_move(s![..end])))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Expanding<'_> {}

/// Return an iterator over expanding windows `array[..i]` for
/// `i in min_periods..=len`.
///
/// Unless `skip_nans` is set, the rows are preceded by all-NaN rows of
/// length `1..min_periods`.
pub fn expanding(
    array: ArrayView1<'_, f64>,
    min_periods: usize,
    skip_nans: bool,
) -> Result<Expanding<'_>> {
    check_min_periods(array.len(), min_periods)?;
    let pad_rows = if skip_nans { 0 } else { min_periods - 1 };
    Ok(Expanding {
        array,
        min_periods,
        pad_rows,
        pos: 0,
    })
}

/// Return the expanding windows as owned rows.
pub fn expanding_rows(
    array: ArrayView1<f64>,
    min_periods: usize,
    skip_nans: bool,
) -> Result<Vec<Array1<f64>>> {
    Ok(expanding(array, min_periods, skip_nans)?
        .map(|row| row.into_owned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Axis};

    fn same(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b.iter())
                .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
    }

    #[test]
    fn test_rolling_matrix_padded() {
        let a = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let m = rolling_matrix(a.view(), 2, false).unwrap();
        assert_eq!(m.shape(), &[5, 2]);
        assert!(m[[0, 0]].is_nan());
        assert_eq!(m[[0, 1]], 1.0);
        assert_eq!(m.row(4), array![4.0, 5.0]);

        let sums = m.sum_axis(Axis(1));
        assert!(same(
            sums.as_slice().unwrap(),
            &[f64::NAN, 3.0, 5.0, 7.0, 9.0]
        ));
    }

    #[test]
    fn test_rolling_skip_nans() {
        let a = array![1.0, 2.0, 3.0, 4.0];
        let rows: Vec<_> = rolling(a.view(), 3, true).unwrap().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], array![1.0, 2.0, 3.0]);
        assert_eq!(rows[1], array![2.0, 3.0, 4.0]);
        // Full windows borrow from the input
        assert!(rows.iter().all(|r| r.is_view()));
    }

    #[test]
    fn test_rolling_padding_rows() {
        let a = array![1.0, 2.0, 3.0, 4.0];
        let rows: Vec<_> = rolling(a.view(), 3, false).unwrap().collect();
        assert_eq!(rows.len(), 4);
        assert!(same(rows[0].as_slice().unwrap(), &[f64::NAN, f64::NAN, 1.0]));
        assert!(same(rows[1].as_slice().unwrap(), &[f64::NAN, 1.0, 2.0]));
        assert!(rows[0].is_owned());
        assert!(rows[2].is_view());
    }

    #[test]
    fn test_rolling_exact_size() {
        let a = Array1::from_iter((0..10).map(|i| i as f64));
        let mut it = rolling(a.view(), 4, true).unwrap();
        assert_eq!(it.len(), 7);
        it.next();
        assert_eq!(it.len(), 6);

        assert_eq!(rolling(a.view(), 4, false).unwrap().len(), 10);
    }

    #[test]
    fn test_expanding_exact_size() {
        let a = array![1.0, 2.0, 3.0, 4.0, 5.0];
        // two NaN rows, then three data rows
        let mut it = expanding(a.view(), 3, false).unwrap();
        assert_eq!(it.len(), 5);
        it.next();
        assert_eq!(it.len(), 4);
        assert_eq!(it.count(), 4);

        let mut it = expanding(a.view(), 3, true).unwrap();
        assert_eq!(it.len(), 3);
        assert_eq!(it.next().unwrap().len(), 3);
        assert_eq!(it.len(), 2);
    }

    #[test]
    fn test_rolling_window_equal_to_len() {
        let a = array![1.0, 2.0];
        let m = rolling_matrix(a.view(), 2, true).unwrap();
        assert_eq!(m, array![[1.0, 2.0]]);
    }

    #[test]
    fn test_rolling_errors() {
        let a = array![1.0, 2.0];
        assert_eq!(
            rolling(a.view(), 3, false).unwrap_err(),
            NumpyExtError::WindowTooLarge { window: 3, len: 2 }
        );
        assert_eq!(
            rolling(a.view(), 0, false).unwrap_err(),
            NumpyExtError::InvalidWindow
        );
    }

    #[test]
    fn test_expanding_rows() {
        let a = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let rows = expanding_rows(a.view(), 3, true).unwrap();
        assert_eq!(
            rows,
            vec![
                array![1.0, 2.0, 3.0],
                array![1.0, 2.0, 3.0, 4.0],
                array![1.0, 2.0, 3.0, 4.0, 5.0],
            ]
        );
    }

    #[test]
    fn test_expanding_with_nan_rows() {
        let a = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let rows = expanding_rows(a.view(), 3, false).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 2);
        assert!(rows[0].iter().chain(rows[1].iter()).all(|x| x.is_nan()));
        assert_eq!(rows[2], array![1.0, 2.0, 3.0]);
        assert_eq!(rows[4].len(), 5);
    }

    #[test]
    fn test_expanding_min_periods_one() {
        let a = array![7.0, 8.0];
        let rows: Vec<_> = expanding(a.view(), 1, false).unwrap().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], array![7.0]);
        assert_eq!(rows[1], array![7.0, 8.0]);
    }

    #[test]
    fn test_expanding_errors() {
        let a = array![1.0, 2.0];
        assert_eq!(
            expanding(a.view(), 3, true).unwrap_err(),
            NumpyExtError::MinPeriodsTooLarge {
                min_periods: 3,
                len: 2
            }
        );
        assert_eq!(
            expanding(a.view(), 0, true).unwrap_err(),
            NumpyExtError::InvalidMinPeriods
        );
    }
}
