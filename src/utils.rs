//! Python-boundary helpers: argument extraction and option building for the
//! `_rust_rasch` extension module.
#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use crate::rasch::{
    curve::CurveOptions,
    errors::RaschError,
    estimator::EstimatorOptions,
    probability::IntoLogit,
    response::Response,
};

/// Borrow a contiguous `f64` view of a numpy array, pandas Series or plain
/// sequence, copying only when the input is not already contiguous float64.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    let direct = raw.extract::<PyReadonlyArray1<f64>>().ok().filter(|a| a.as_slice().is_ok());
    if let Some(array) = direct {
        return Ok(array);
    }
    if let Ok(converted) = raw.call_method("to_numpy", (false,), None) {
        let series = converted.extract::<PyReadonlyArray1<f64>>().ok();
        if let Some(array) = series.filter(|a| a.as_slice().is_ok()) {
            return Ok(array);
        }
    }
    let values: Vec<f64> = raw.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(values.into_pyarray(py).readonly())
}

/// Copy a float sequence into a `Vec<f64>`.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Vec<f64>> {
    let array = extract_f64_array(py, raw)?;
    let slice = array.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

/// Coerce one Python value (number or numeric text) into a finite logit.
#[cfg(feature = "python-bindings")]
pub fn extract_logit(raw: &Bound<'_, PyAny>) -> PyResult<f64> {
    if let Ok(text) = raw.extract::<String>() {
        return Ok(text.into_logit()?);
    }
    match raw.extract::<f64>() {
        Ok(value) => Ok(value.into_logit()?),
        Err(_) => Err(RaschError::InvalidLogit {
            input: raw.repr().map(|r| r.to_string()).unwrap_or_default(),
            reason: "Value is neither a number nor numeric text.",
        }
        .into()),
    }
}

/// Extract a sequence of optional logits; `None` and NaN mark unknowns.
#[cfg(feature = "python-bindings")]
pub fn extract_optional_logits(raw: &Bound<'_, PyAny>) -> PyResult<Vec<Option<f64>>> {
    let items: Vec<Bound<'_, PyAny>> = raw.extract()?;
    items
        .iter()
        .map(|item| {
            if item.is_none() {
                return Ok(None);
            }
            match item.extract::<f64>() {
                Ok(value) if value.is_nan() => Ok(None),
                _ => extract_logit(item).map(Some),
            }
        })
        .collect()
}

/// Extract 0/1 (or boolean) response codes.
#[cfg(feature = "python-bindings")]
pub fn extract_responses(raw: &Bound<'_, PyAny>) -> PyResult<Vec<Response>> {
    let codes: Vec<i64> = raw.extract().map_err(|_| {
        PyTypeError::new_err("responses must be a sequence of 0/1 integers or booleans")
    })?;
    codes.into_iter().map(|code| Response::from_code(code).map_err(PyErr::from)).collect()
}

#[cfg(feature = "python-bindings")]
pub fn build_estimator_options(
    bracket: Option<(f64, f64)>, tol: Option<f64>, max_iter: Option<u64>, verbose: Option<bool>,
) -> PyResult<EstimatorOptions> {
    let defaults = EstimatorOptions::default();
    Ok(EstimatorOptions::new(
        bracket.unwrap_or((defaults.lower, defaults.upper)),
        tol.unwrap_or(defaults.tol),
        max_iter.unwrap_or(defaults.max_iter),
        verbose.unwrap_or(defaults.verbose),
    )?)
}

#[cfg(feature = "python-bindings")]
pub fn build_curve_options(
    lower: Option<f64>, upper: Option<f64>, points: Option<usize>,
) -> PyResult<CurveOptions> {
    let defaults = CurveOptions::default();
    Ok(CurveOptions::new(
        lower.unwrap_or(defaults.lower),
        upper.unwrap_or(defaults.upper),
        points.unwrap_or(defaults.points),
    )?)
}
