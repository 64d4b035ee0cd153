//! Python-boundary helpers for the PyO3 bindings.
//!
//! Conversions live here so that `lib.rs` only declares classes and
//! functions: configuration objects coming from Python are normalized into
//! [`ModelConfig`], and `ndarray` results are copied into numpy arrays.

#[cfg(feature = "python-bindings")]
use ndarray::{ArrayView1, ArrayView2};

#[cfg(feature = "python-bindings")]
use numpy::{PyArray1, PyArray2, PyArrayMethods};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PyAny, PyDict, PyString},
};

#[cfg(feature = "python-bindings")]
use crate::config::ModelConfig;

/// Build a [`ModelConfig`] from `None`, a JSON string, or a dict keyed by
/// the camelCase parameter names. `None` yields the reference economy.
#[cfg(feature = "python-bindings")]
pub fn extract_config<'py>(
    py: Python<'py>, raw: Option<&Bound<'py, PyAny>>,
) -> PyResult<ModelConfig> {
    let Some(raw) = raw else {
        return Ok(ModelConfig::default());
    };
    if raw.is_none() {
        return Ok(ModelConfig::default());
    }
    let text: String = if raw.is_instance_of::<PyString>() {
        raw.extract()?
    } else if raw.is_instance_of::<PyDict>() {
        py.import("json")?.call_method1("dumps", (raw,))?.extract()?
    } else {
        return Err(PyTypeError::new_err("config must be None, a JSON string, or a dict"));
    };
    Ok(ModelConfig::from_json(&text)?)
}

/// Copy a vector into a fresh 1-D numpy array.
///
/// Goes through an element iterator so the copy does not depend on the
/// `ndarray` release numpy was built against.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn vector_to_py<'py>(py: Python<'py>, values: ArrayView1<'_, f64>) -> Bound<'py, PyArray1<f64>> {
    PyArray1::from_iter(py, values.iter().copied())
}

/// Copy a matrix into a fresh C-ordered 2-D numpy array.
#[cfg(feature = "python-bindings")]
pub fn matrix_to_py<'py>(
    py: Python<'py>, values: ArrayView2<'_, f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let (rows, cols) = values.dim();
    PyArray1::from_iter(py, values.iter().copied()).reshape([rows, cols])
}

#[cfg(all(test, feature = "python-bindings"))]
mod tests {
    use super::*;
    use ndarray::array;
    use numpy::PyUntypedArrayMethods;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Boundary conversions under an embedded interpreter. Run with
    // `--features python-bindings` (not `extension-module`, which leaves
    // libpython unlinked).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Matrices arrive in numpy with their logical row-major layout, including
    // non-contiguous views.
    fn matrix_copy_keeps_logical_layout() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            // Arrange
            let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];

            // Act
            let plain = matrix_to_py(py, m.view()).unwrap();
            let transposed = matrix_to_py(py, m.t()).unwrap();

            // Assert
            assert_eq!(plain.shape(), &[2, 3]);
            assert_eq!(plain.readonly().as_slice().unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
            assert_eq!(transposed.shape(), &[3, 2]);
            assert_eq!(transposed.readonly().as_slice().unwrap(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        });
    }

    #[test]
    fn vector_copy_preserves_values() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            let v = array![0.5, -1.0, 2.0];

            let out = vector_to_py(py, v.view());

            assert_eq!(out.readonly().as_slice().unwrap(), &[0.5, -1.0, 2.0]);
        });
    }

    #[test]
    fn config_accepts_none_json_and_dict() {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(|py| {
            // Arrange
            let base = ModelConfig { l_num: 3, ..ModelConfig::default() }.to_json().unwrap();
            let text = PyString::new(py, &base);
            let dict = py
                .import("json")
                .and_then(|json| json.call_method1("loads", (base.as_str(),)))
                .and_then(|obj| Ok(obj.downcast_into::<PyDict>()?))
                .unwrap();
            dict.set_item("kNum", 30).unwrap();
            dict.set_item("kappa", 0.5).unwrap();
            let number = 3_i64.into_pyobject(py).unwrap();

            // Act
            let from_none = extract_config(py, None).unwrap();
            let from_json = extract_config(py, Some(text.as_any())).unwrap();
            let from_dict = extract_config(py, Some(dict.as_any())).unwrap();
            let bad = extract_config(py, Some(number.as_any()));

            // Assert
            assert_eq!(from_none, ModelConfig::default());
            assert_eq!(from_json.l_num, 3);
            assert_eq!((from_dict.k_num, from_dict.kappa, from_dict.l_num), (30, 0.5, 3));
            assert!(bad.unwrap_err().is_instance_of::<PyTypeError>(py));
        });
    }
}
