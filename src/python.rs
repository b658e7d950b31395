//! Python bindings, compiled with the `python` feature.
//!
//! Inputs are converted with `numpy.asarray(x, "float64")`, so lists and
//! integer arrays are accepted wherever a float array is expected.
use crate::apply::common_len;
use crate::error::NumpyExtError;
use crate::misc::first_occurrences;
use crate::parallel::Jobs;
use crate::window::{check_min_periods, check_window};
use crate::{
    apply_map, drop_na, expanding, expstep_range, fill_na, fill_not_finite, nans, prepend_na,
    rolling, rolling_matrix,
};
use ndarray::{s, ArrayView1, IxDyn};
use numpy::{IntoPyArray, PyArray1, PyArrayDyn, PyReadonlyArray1, PyReadonlyArrayDyn};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyInt, PyList, PyTuple};
use tracing::debug;

impl From<NumpyExtError> for PyErr {
    fn from(err: NumpyExtError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn to_f64_array<'py>(obj: &Bound<'py, PyAny>) -> PyResult<PyReadonlyArrayDyn<'py, f64>> {
    let np = PyModule::import(obj.py(), "numpy")?;
    np.call_method1("asarray", (obj, "float64"))?.extract()
}

fn to_f64_1d<'py>(obj: &Bound<'py, PyAny>) -> PyResult<PyReadonlyArray1<'py, f64>> {
    let np = PyModule::import(obj.py(), "numpy")?;
    let converted = np.call_method1("asarray", (obj, "float64"))?;
    let ndim: usize = converted.getattr("ndim")?.extract()?;
    if ndim != 1 {
        return Err(NumpyExtError::NotOneDimensional { ndim }.into());
    }
    converted.extract()
}

/// Float copy of `obj` together with the dtype it had.
fn to_f64_keeping_dtype<'py>(
    obj: &Bound<'py, PyAny>,
) -> PyResult<(PyReadonlyArrayDyn<'py, f64>, Bound<'py, PyAny>)> {
    let np = PyModule::import(obj.py(), "numpy")?;
    let original = np.call_method1("asarray", (obj,))?;
    let dtype = original.getattr("dtype")?;
    Ok((to_f64_array(&original)?, dtype))
}

/// Shape argument of `nans`: an int or a tuple of ints.
#[derive(FromPyObject)]
pub(crate) enum Shape {
    Length(usize),
    Dims(Vec<usize>),
}

/// A Python number that remembers whether it was an int.
#[derive(Clone, Copy)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl<'py> FromPyObject<'py> for Number {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        if ob.is_instance_of::<PyInt>() {
            Ok(Number::Int(ob.extract()?))
        } else {
            Ok(Number::Float(ob.extract()?))
        }
    }
}

impl Number {
    fn value(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    fn is_int(self) -> bool {
        matches!(self, Number::Int(_))
    }
}

/// Exponentially spaced values.
///
/// The result is int64 when `start`, `min_step` and `step_mult` are all
/// ints, float64 otherwise. `round_func` receives that array and may
/// change the dtype again.
#[pyfunction]
#[pyo3(
    name = "expstep_range",
    signature = (start, end, min_step=Number::Int(1), step_mult=Number::Int(1), round_func=None)
)]
pub(crate) fn expstep_range_py<'py>(
    py: Python<'py>,
    start: Number,
    end: Number,
    min_step: Number,
    step_mult: Number,
    round_func: Option<&Bound<'py, PyAny>>,
) -> PyResult<PyObject> {
    let values = expstep_range(start.value(), end.value(), min_step.value(), step_mult.value())?;
    let mut values = values.into_pyarray(py).into_any();
    if start.is_int() && min_step.is_int() && step_mult.is_int() {
        values = values.call_method1("astype", ("int64",))?;
    }
    let Some(round_func) = round_func else {
        return Ok(values.unbind());
    };

    // round_func is vectorized and may change the dtype, so dedupe on a
    // float copy and index the rounded array itself.
    let np = PyModule::import(py, "numpy")?;
    let rounded = np.call_method1("asarray", (round_func.call1((values,))?,))?;
    let as_float = to_f64_1d(&rounded)?;
    let keep = first_occurrences(as_float.as_array());
    Ok(rounded.get_item(PyArray1::from_vec(py, keep))?.unbind())
}

#[pyfunction]
#[pyo3(name = "apply_map")]
pub(crate) fn apply_map_py<'py>(
    py: Python<'py>,
    func: &Bound<'py, PyAny>,
    array: &Bound<'py, PyAny>,
) -> PyResult<PyObject> {
    let (values, dtype) = to_f64_keeping_dtype(array)?;

    let mut failure: Option<PyErr> = None;
    let mapped = apply_map(
        |&x| {
            if failure.is_some() {
                return f64::NAN;
            }
            match func.call1((x,)).and_then(|r| r.extract::<f64>()) {
                Ok(v) => v,
                Err(err) => {
                    failure = Some(err);
                    f64::NAN
                }
            }
        },
        values.as_array(),
    );
    if let Some(err) = failure {
        return Err(err);
    }
    // results are cast back to the input dtype
    Ok(mapped.into_pyarray(py).call_method1("astype", (dtype,))?.unbind())
}

#[pyfunction]
#[pyo3(name = "nans")]
pub(crate) fn nans_py(py: Python<'_>, shape: Shape) -> Bound<'_, PyArrayDyn<f64>> {
    let dims = match shape {
        Shape::Length(n) => vec![n],
        Shape::Dims(dims) => dims,
    };
    nans(IxDyn(&dims)).into_pyarray(py)
}

#[pyfunction]
#[pyo3(name = "drop_na")]
pub(crate) fn drop_na_py<'py>(
    py: Python<'py>,
    array: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let array = to_f64_array(array)?;
    Ok(drop_na(array.as_array()).into_pyarray(py))
}

/// Copy of `array` with NaNs replaced by `value`, in the input dtype.
#[pyfunction]
#[pyo3(name = "fill_na")]
pub(crate) fn fill_na_py<'py>(
    py: Python<'py>,
    array: &Bound<'py, PyAny>,
    value: f64,
) -> PyResult<PyObject> {
    let (values, dtype) = to_f64_keeping_dtype(array)?;
    let filled = fill_na(values.as_array(), value).into_pyarray(py);
    Ok(filled.call_method1("astype", (dtype,))?.unbind())
}

/// Copy of `array` with NaNs and infinities replaced by `value`, in the
/// input dtype.
#[pyfunction]
#[pyo3(name = "fill_not_finite", signature = (array, value=0.0))]
pub(crate) fn fill_not_finite_py<'py>(
    py: Python<'py>,
    array: &Bound<'py, PyAny>,
    value: f64,
) -> PyResult<PyObject> {
    let (values, dtype) = to_f64_keeping_dtype(array)?;
    let filled = fill_not_finite(values.as_array(), value).into_pyarray(py);
    Ok(filled.call_method1("astype", (dtype,))?.unbind())
}

#[pyfunction]
#[pyo3(name = "prepend_na")]
pub(crate) fn prepend_na_py<'py>(
    py: Python<'py>,
    array: &Bound<'py, PyAny>,
    size: usize,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let array = to_f64_1d(array)?;
    Ok(prepend_na(array.as_array(), size).into_pyarray(py))
}

/// Rolling windows as a `(rows, window)` matrix when `as_array` is set,
/// otherwise as a list of row arrays.
#[pyfunction]
#[pyo3(name = "rolling", signature = (array, window, skip_nans=false, as_array=false))]
pub(crate) fn rolling_py<'py>(
    py: Python<'py>,
    array: &Bound<'py, PyAny>,
    window: usize,
    skip_nans: bool,
    as_array: bool,
) -> PyResult<PyObject> {
    let array = to_f64_1d(array)?;
    let view = array.as_array();
    if as_array {
        let matrix = rolling_matrix(view, window, skip_nans)?;
        return Ok(matrix.into_pyarray(py).into_any().unbind());
    }
    let rows = rolling(view, window, skip_nans)?.map(|row| PyArray1::from_array(py, &row));
    Ok(PyList::new(py, rows)?.into_any().unbind())
}

/// Expanding windows as a list of row arrays, or a numpy object array when
/// `as_array` is set.
#[pyfunction]
#[pyo3(name = "expanding", signature = (array, min_periods=1, skip_nans=true, as_array=false))]
pub(crate) fn expanding_py<'py>(
    py: Python<'py>,
    array: &Bound<'py, PyAny>,
    min_periods: usize,
    skip_nans: bool,
    as_array: bool,
) -> PyResult<PyObject> {
    let array = to_f64_1d(array)?;
    let rows: Vec<_> = expanding(array.as_array(), min_periods, skip_nans)?
        .map(|row| PyArray1::from_array(py, &row))
        .collect();
    if as_array {
        let np = PyModule::import(py, "numpy")?;
        let out = np.call_method1("empty", (rows.len(), "object"))?;
        for (i, row) in rows.into_iter().enumerate() {
            out.set_item(i, row)?;
        }
        return Ok(out.unbind());
    }
    Ok(PyList::new(py, rows)?.into_any().unbind())
}

fn load_arrays<'py>(arrays: &Bound<'py, PyTuple>) -> PyResult<Vec<PyReadonlyArray1<'py, f64>>> {
    arrays.iter().map(|a| to_f64_1d(&a)).collect()
}

/// Call `func(*[a[start..stop] for a in views], **kwargs)`.
fn call_window<'py>(
    func: &Bound<'py, PyAny>,
    views: &[ArrayView1<f64>],
    start: usize,
    stop: usize,
    kwargs: Option<&Bound<'py, PyDict>>,
) -> PyResult<f64> {
    let py = func.py();
    let args = PyTuple::new(
        py,
        views
            .iter()
            .map(|v| PyArray1::from_array(py, &v.slice(s![start..stop]))),
    )?;
    func.call(args, kwargs)?.extract()
}

fn log_dispatch(name: &str, jobs: Jobs, windows: usize) {
    // Python callables need the GIL, so there is nothing to gain from a pool
    debug!(jobs = ?jobs, windows, "evaluating {name} sequentially under the GIL");
}

#[pyfunction]
#[pyo3(name = "rolling_apply", signature = (func, window, *arrays, n_jobs=1, **kwargs))]
pub(crate) fn rolling_apply_py<'py>(
    py: Python<'py>,
    func: &Bound<'py, PyAny>,
    window: usize,
    arrays: &Bound<'py, PyTuple>,
    n_jobs: i64,
    kwargs: Option<&Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let jobs = Jobs::from_n_jobs(n_jobs)?;
    let arrays = load_arrays(arrays)?;
    let views: Vec<ArrayView1<f64>> = arrays.iter().map(|a| a.as_array()).collect();
    let len = common_len(&views)?;
    check_window(len, window)?;
    log_dispatch("rolling_apply", jobs, len + 1 - window);

    let values = (window - 1..len)
        .map(|end| call_window(func, &views, end + 1 - window, end + 1, kwargs))
        .collect::<PyResult<Vec<f64>>>()?;
    Ok(prepend_na(ArrayView1::from(values.as_slice()), window - 1).into_pyarray(py))
}

#[pyfunction]
#[pyo3(name = "expanding_apply", signature = (func, min_periods, *arrays, n_jobs=1, **kwargs))]
pub(crate) fn expanding_apply_py<'py>(
    py: Python<'py>,
    func: &Bound<'py, PyAny>,
    min_periods: usize,
    arrays: &Bound<'py, PyTuple>,
    n_jobs: i64,
    kwargs: Option<&Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let jobs = Jobs::from_n_jobs(n_jobs)?;
    let arrays = load_arrays(arrays)?;
    let views: Vec<ArrayView1<f64>> = arrays.iter().map(|a| a.as_array()).collect();
    let len = common_len(&views)?;
    check_min_periods(len, min_periods)?;
    log_dispatch("expanding_apply", jobs, len + 1 - min_periods);

    let values = (min_periods - 1..len)
        .map(|end| call_window(func, &views, 0, end + 1, kwargs))
        .collect::<PyResult<Vec<f64>>>()?;
    Ok(prepend_na(ArrayView1::from(values.as_slice()), min_periods - 1).into_pyarray(py))
}
