//! rust_rasch — Rasch-model psychometrics with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the measurement engine to Python via the `_rust_rasch` extension
//! module. The engine turns assessment response data into calibrated
//! measurements: ability estimates, item and person fit, test information,
//! reliability and item characteristic curves.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: `rasch` (pure engine), `matrix` (record
//!   schemas and response-matrix assembly) and `report` (analysis passes,
//!   fit tables, CSV export).
//! - When `python-bindings` is enabled, define the `_rust_rasch.engine`
//!   submodule with the engine functions and the [`AbilityResult`] class.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, argument coercion and error mapping.
//! - Coercion failures surface in Python as `TypeError`, every other engine
//!   error as `ValueError`.
//!
//! Downstream usage
//! ----------------
//! - Rust callers build records, run a
//!   [`RaschAnalysis`](report::analysis::RaschAnalysis) and read the
//!   resulting report; the PyO3 items can be ignored.
//! - Python callers import `rust_rasch._rust_rasch.engine` (usually through a
//!   thin pure-Python facade).
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_rasch_pipeline.rs`.

pub mod matrix;
pub mod rasch;
pub mod report;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

#[cfg(feature = "python-bindings")]
use crate::{
    rasch::{
        curve::item_characteristic_curve,
        estimator::{AbilityEstimate, NonConvergence, estimate_ability},
        fit::infit_outfit,
        information::{reliability, standard_error, test_information},
        probability::probability,
        simulation::{SimOptions, simulate_responses},
    },
    utils::{
        build_curve_options, build_estimator_options, extract_f64_vec, extract_logit,
        extract_optional_logits, extract_responses,
    },
};

/// AbilityResult — Python-facing outcome of a single ability estimation.
///
/// Fields
/// ------
/// - `inner`: [`AbilityEstimate`]
///   Converged estimate or the reason estimation failed to converge.
///
/// Notes
/// -----
/// - `theta` is `None` whenever `converged` is `False`; `reason` then names
///   the cause (`"no_sign_change"` or `"max_iterations"`).
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_rasch.engine")]
pub struct AbilityResult {
    inner: AbilityEstimate,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl AbilityResult {
    #[getter]
    pub fn theta(&self) -> Option<f64> {
        self.inner.theta()
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.is_converged()
    }

    #[getter]
    pub fn iterations(&self) -> Option<u64> {
        match self.inner {
            AbilityEstimate::Converged { iterations, .. } => Some(iterations),
            AbilityEstimate::NotConverged(NonConvergence::MaxIterations { iterations, .. }) => {
                Some(iterations)
            }
            AbilityEstimate::NotConverged(NonConvergence::NoSignChange { .. }) => None,
        }
    }

    #[getter]
    pub fn reason(&self) -> Option<&'static str> {
        match self.inner {
            AbilityEstimate::Converged { .. } => None,
            AbilityEstimate::NotConverged(NonConvergence::NoSignChange { .. }) => {
                Some("no_sign_change")
            }
            AbilityEstimate::NotConverged(NonConvergence::MaxIterations { .. }) => {
                Some("max_iterations")
            }
        }
    }

    fn __repr__(&self) -> String {
        match self.inner.theta() {
            Some(theta) => format!("AbilityResult(theta={theta}, converged=True)"),
            None => format!("AbilityResult(theta=None, reason={:?})", self.reason()),
        }
    }
}

/// Probability of a correct response; accepts numbers or numeric text.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "rasch_probability", text_signature = "(ability, difficulty, /)")]
fn py_rasch_probability(
    ability: &Bound<'_, PyAny>, difficulty: &Bound<'_, PyAny>,
) -> PyResult<f64> {
    Ok(probability(extract_logit(ability)?, extract_logit(difficulty)?))
}

/// `(infit, outfit)` for aligned observed/expected values.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "infit_outfit", text_signature = "(observed, expected, /)")]
fn py_infit_outfit<'py>(
    py: Python<'py>, observed: &Bound<'py, PyAny>, expected: &Bound<'py, PyAny>,
) -> PyResult<(f64, f64)> {
    let observed = extract_f64_vec(py, observed, "observed")?;
    let expected = extract_f64_vec(py, expected, "expected")?;
    let fit = infit_outfit(&observed, &expected)?;
    Ok((fit.infit(), fit.outfit()))
}

#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "test_information", text_signature = "(ability, difficulties, /)")]
fn py_test_information<'py>(
    py: Python<'py>, ability: &Bound<'py, PyAny>, difficulties: &Bound<'py, PyAny>,
) -> PyResult<f64> {
    let ability = extract_logit(ability)?;
    let difficulties = extract_f64_vec(py, difficulties, "difficulties")?;
    Ok(test_information(ability, &difficulties))
}

#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "standard_error", text_signature = "(ability, difficulties, /)")]
fn py_standard_error<'py>(
    py: Python<'py>, ability: &Bound<'py, PyAny>, difficulties: &Bound<'py, PyAny>,
) -> PyResult<f64> {
    let ability = extract_logit(ability)?;
    let difficulties = extract_f64_vec(py, difficulties, "difficulties")?;
    Ok(standard_error(ability, &difficulties)?)
}

/// Reliability coefficient; `None`/NaN abilities are skipped.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "reliability", text_signature = "(abilities, difficulties, /)")]
fn py_reliability<'py>(
    py: Python<'py>, abilities: &Bound<'py, PyAny>, difficulties: &Bound<'py, PyAny>,
) -> PyResult<f64> {
    let abilities = extract_optional_logits(abilities)?;
    let difficulties = extract_f64_vec(py, difficulties, "difficulties")?;
    Ok(reliability(&abilities, &difficulties)?.coefficient())
}

#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    name = "estimate_ability",
    signature = (
        responses,
        difficulties,
        bracket = None,
        tol = None,
        max_iter = None,
        verbose = None,
    ),
    text_signature = "(responses, difficulties, /, bracket=(-4.0, 4.0), tol=1e-10, max_iter=100, \
                      verbose=False)"
)]
fn py_estimate_ability<'py>(
    py: Python<'py>, responses: &Bound<'py, PyAny>, difficulties: &Bound<'py, PyAny>,
    bracket: Option<(f64, f64)>, tol: Option<f64>, max_iter: Option<u64>, verbose: Option<bool>,
) -> PyResult<AbilityResult> {
    let responses = extract_responses(responses)?;
    let difficulties = extract_f64_vec(py, difficulties, "difficulties")?;
    let opts = build_estimator_options(bracket, tol, max_iter, verbose)?;
    let inner = estimate_ability(&responses, &difficulties, &opts)?;
    Ok(AbilityResult { inner })
}

/// `(thetas, probabilities)` sampled along the ICC of one item.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    name = "item_characteristic_curve",
    signature = (difficulty, lower = None, upper = None, points = None),
    text_signature = "(difficulty, /, lower=-4.0, upper=4.0, points=100)"
)]
fn py_item_characteristic_curve(
    difficulty: &Bound<'_, PyAny>, lower: Option<f64>, upper: Option<f64>, points: Option<usize>,
) -> PyResult<(Vec<f64>, Vec<f64>)> {
    let opts = build_curve_options(lower, upper, points)?;
    let curve = item_characteristic_curve(extract_logit(difficulty)?, &opts)?;
    Ok(curve.iter().map(|p| (p.theta, p.probability)).unzip())
}

/// Simulated 0/1 responses at ability `theta`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    name = "simulate_responses",
    signature = (theta, difficulties, seed = None),
    text_signature = "(theta, difficulties, /, seed=None)"
)]
fn py_simulate_responses<'py>(
    py: Python<'py>, theta: f64, difficulties: &Bound<'py, PyAny>, seed: Option<u64>,
) -> PyResult<Vec<u8>> {
    let difficulties = extract_f64_vec(py, difficulties, "difficulties")?;
    let responses = simulate_responses(theta, &difficulties, &SimOptions { seed })?;
    Ok(responses.iter().map(|r| u8::from(r.is_correct())).collect())
}

/// _rust_rasch — PyO3 module initializer for the Rust extension.
///
/// Purpose
/// -------
/// Create the `engine` submodule, register its functions and classes, and
/// insert it into `sys.modules` so `rust_rasch.engine` imports work.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating the submodule or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_rasch<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let engine_mod = PyModule::new(py, "engine")?;
    engine(py, m, &engine_mod)?;

    py.import("sys")?.getattr("modules")?.set_item("rust_rasch.engine", engine_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn engine<'py>(
    _py: Python, rust_rasch: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<AbilityResult>()?;
    m.add_function(wrap_pyfunction!(py_rasch_probability, m)?)?;
    m.add_function(wrap_pyfunction!(py_infit_outfit, m)?)?;
    m.add_function(wrap_pyfunction!(py_test_information, m)?)?;
    m.add_function(wrap_pyfunction!(py_standard_error, m)?)?;
    m.add_function(wrap_pyfunction!(py_reliability, m)?)?;
    m.add_function(wrap_pyfunction!(py_estimate_ability, m)?)?;
    m.add_function(wrap_pyfunction!(py_item_characteristic_curve, m)?)?;
    m.add_function(wrap_pyfunction!(py_simulate_responses, m)?)?;
    rust_rasch.add_submodule(m)?;
    Ok(())
}
