//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod engine_bindings;
mod live_bindings;

/// Python module definition
#[pymodule]
fn spectrum_scope(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<engine_bindings::PySpectrumEngine>()?;
    m.add_class::<live_bindings::PyLiveAnalyzer>()?;

    // Add WindowType enum
    m.add_class::<engine_bindings::PyWindowType>()?;

    Ok(())
}
