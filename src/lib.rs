//! rust_aiyagari — stationary equilibrium of the Aiyagari (1994) economy,
//! with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and, behind the `python-bindings`
//! feature, as the PyO3 bridge exposing the model to Python via the
//! `_rust_aiyagari` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: [`config`] (validated parameters),
//!   [`errors`] (crate error type), [`fixed_point`] (damped iteration engine),
//!   [`markov`] (Rouwenhorst chains) and [`model`] (firm, households,
//!   distribution, equilibrium).
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer, with
//!   `markov` and `model` registered as importable submodules.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - Configuration reaching the model has passed [`config::Parameters::from_config`].
//!
//! Conventions
//! -----------
//! - State-space arrays are `kNum × lNum` with capital along rows.
//! - Errors are [`errors::ModelError`] internally and `ValueError` /
//!   `RuntimeError` at the Python boundary.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use rust_aiyagari::{config::Parameters, model::solve_equilibrium};
//!
//! let params = Parameters::default();
//! let state = solve_equilibrium(&params, 10.0)?;
//! println!("K = {:.4}, r = {:.4}", state.capital, state.prices.r);
//! # Ok::<(), rust_aiyagari::errors::ModelError>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/integration_equilibrium.rs`
//!   runs the reference economy end to end.

pub mod config;
pub mod errors;
pub mod fixed_point;
pub mod markov;
pub mod model;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{PyArray1, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    config::{Parameters, Technology},
    model::{EquilibriumSolver, EquilibriumState},
    utils::{extract_config, matrix_to_py, vector_to_py},
};

/// Discretize an AR(1) process; returns `(states, transition)`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "rouwenhorst", signature = (n, mu, rho, sigma))]
fn rouwenhorst_py<'py>(
    py: Python<'py>, n: usize, mu: f64, rho: f64, sigma: f64,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray2<f64>>)> {
    let chain = markov::rouwenhorst(n, mu, rho, sigma)?;
    Ok((vector_to_py(py, chain.states()), matrix_to_py(py, chain.transition())?))
}

/// Interest rate and wage `(r, w)` at aggregates `(K, L)`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "firm_prices", signature = (capital, labor, alpha, delta = 0.0))]
fn firm_prices_py(capital: f64, labor: f64, alpha: f64, delta: f64) -> PyResult<(f64, f64)> {
    let technology = Technology::new(alpha, delta)?;
    let prices = model::firm_prices(capital, labor, &technology)?;
    Ok((prices.r, prices.w))
}

/// AiyagariModel — Python-facing handle on a validated parameter set.
///
/// Constructed via `AiyagariModel(config=None)` where `config` is `None`
/// (reference economy), a JSON string, or a dict with the camelCase keys
/// `alpha, beta, gamma, mu, rho, sigma, kMin, kMax, kNum, lNum, kappa, tol,
/// maxIter` and the optional inner-loop keys.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_aiyagari.model")]
pub struct AiyagariModel {
    params: Parameters,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl AiyagariModel {
    #[new]
    #[pyo3(signature = (config = None))]
    pub fn new<'py>(py: Python<'py>, config: Option<&Bound<'py, PyAny>>) -> PyResult<Self> {
        let config = extract_config(py, config)?;
        Ok(Self { params: Parameters::from_config(&config)? })
    }

    /// Solve for the stationary equilibrium from `initial_capital`.
    ///
    /// The GIL is released while the solver runs.
    #[pyo3(signature = (initial_capital = 10.0))]
    pub fn solve(&self, py: Python<'_>, initial_capital: f64) -> PyResult<AiyagariEquilibrium> {
        let params = self.params;
        let state = py.allow_threads(move || {
            EquilibriumSolver::new(&params).and_then(|solver| solver.solve(initial_capital))
        })?;
        Ok(AiyagariEquilibrium { inner: state })
    }

    /// Aggregate labor supply implied by the income process.
    #[getter]
    pub fn labor(&self) -> PyResult<f64> {
        Ok(EquilibriumSolver::new(&self.params)?.labor())
    }
}

/// AiyagariEquilibrium — solved equilibrium returned by `AiyagariModel.solve`.
///
/// Scalars are exposed as properties; policy and distribution arrays are
/// copied into fresh numpy arrays on access.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_aiyagari.model")]
pub struct AiyagariEquilibrium {
    inner: EquilibriumState,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl AiyagariEquilibrium {
    #[getter]
    pub fn capital(&self) -> f64 {
        self.inner.capital
    }

    #[getter]
    pub fn labor(&self) -> f64 {
        self.inner.labor
    }

    #[getter]
    pub fn r(&self) -> f64 {
        self.inner.prices.r
    }

    #[getter]
    pub fn w(&self) -> f64 {
        self.inner.prices.w
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn consumption<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        matrix_to_py(py, self.inner.policy.consumption())
    }

    #[getter]
    pub fn next_capital<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        matrix_to_py(py, self.inner.policy.next_capital())
    }

    #[getter]
    pub fn distribution<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f64>>> {
        matrix_to_py(py, self.inner.distribution.mass())
    }

    #[getter]
    pub fn labor_distribution<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        vector_to_py(py, self.inner.labor_distribution.view())
    }

    /// `(capital, implied_capital, r, w, change)` per outer iteration.
    #[getter]
    pub fn history(&self) -> Vec<(f64, f64, f64, f64, f64)> {
        self.inner
            .history
            .iter()
            .map(|rec| (rec.capital, rec.implied_capital, rec.r, rec.w, rec.change))
            .collect()
    }

    /// Aggregates and history as a JSON document.
    pub fn summary_json(&self) -> PyResult<String> {
        let text = serde_json::to_string_pretty(&self.inner.summary())
            .map_err(errors::ModelError::from)?;
        Ok(text)
    }
}

/// _rust_aiyagari — PyO3 module initializer for the Python extension.
///
/// Creates the `markov` and `model` submodules, attaches them to the parent
/// module and registers them in `sys.modules` so dotted imports work.
///
/// # Errors
/// `PyErr` if creating submodules or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_aiyagari<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let markov_mod = PyModule::new(_py, "markov")?;
    let model_mod = PyModule::new(_py, "model")?;
    markov_module(_py, m, &markov_mod)?;
    model_module(_py, m, &model_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    let modules = _py.import("sys")?.getattr("modules")?;
    modules.set_item("rust_aiyagari.markov", markov_mod)?;
    modules.set_item("rust_aiyagari.model", model_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn markov_module<'py>(
    _py: Python, rust_aiyagari: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(rouwenhorst_py, m)?)?;
    rust_aiyagari.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn model_module<'py>(
    _py: Python, rust_aiyagari: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(firm_prices_py, m)?)?;
    m.add_class::<AiyagariModel>()?;
    m.add_class::<AiyagariEquilibrium>()?;
    rust_aiyagari.add_submodule(m)?;
    Ok(())
}
