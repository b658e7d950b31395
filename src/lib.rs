//! Array helpers on top of `ndarray`.
//!
//! Operations with NaNs: [`nans`], [`drop_na`], [`fill_na`],
//! [`fill_not_finite`], [`prepend_na`].
//!
//! Window operations: [`rolling`], [`rolling_apply`], [`expanding`],
//! [`expanding_apply`].
//!
//! Others: [`apply_map`], [`expstep_range`].
//!
//! Building with the `python` feature adds a `numpy_ext` Python extension
//! module exposing the same functions.
#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod apply;
pub mod error;
pub mod misc;
pub mod nan_ops;
pub mod parallel;
pub mod window;

#[cfg(feature = "python")]
mod python;

pub use apply::{expanding_apply, rolling_apply};
pub use error::{NumpyExtError, Result};
pub use misc::{apply_map, expstep_range, expstep_range_rounded};
pub use nan_ops::{drop_na, fill_na, fill_not_finite, nans, prepend_na};
pub use parallel::Jobs;
pub use window::{expanding, expanding_rows, rolling, rolling_matrix, Expanding, Rolling, Row};

#[cfg(feature = "python")]
#[pymodule]
fn numpy_ext(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(python::expstep_range_py, m)?)?;
    m.add_function(wrap_pyfunction!(python::apply_map_py, m)?)?;

    // Operations with nans
    m.add_function(wrap_pyfunction!(python::nans_py, m)?)?;
    m.add_function(wrap_pyfunction!(python::drop_na_py, m)?)?;
    m.add_function(wrap_pyfunction!(python::fill_na_py, m)?)?;
    m.add_function(wrap_pyfunction!(python::fill_not_finite_py, m)?)?;
    m.add_function(wrap_pyfunction!(python::prepend_na_py, m)?)?;

    // Window operations
    m.add_function(wrap_pyfunction!(python::rolling_py, m)?)?;
    m.add_function(wrap_pyfunction!(python::rolling_apply_py, m)?)?;
    m.add_function(wrap_pyfunction!(python::expanding_py, m)?)?;
    m.add_function(wrap_pyfunction!(python::expanding_apply_py, m)?)?;

    Ok(())
}
