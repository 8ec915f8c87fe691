// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII Shield: detect and redact personal information in chat messages
// before it reaches a language model

pub mod scanner;
pub mod service;

#[cfg(feature = "python")]
mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module: pii_shield
///
/// # Examples
///
/// ```python
/// from pii_shield import PiiScannerRust
///
/// scanner = PiiScannerRust({"sensitivity": "High (Sensitive)"})
/// report = scanner.scan("Call me at 555-123-4567")
/// print(report["sanitized_text"])  # "Call me at [REDACTED]"
/// print(report["pii_items"][0]["type"])  # "Phone Number"
/// ```
#[cfg(feature = "python")]
#[pymodule]
fn pii_shield(m: &Bound<'_, pyo3::types::PyModule>) -> PyResult<()> {
    m.add_class::<python::PiiScannerRust>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add(
        "__doc__",
        "PII detection and redaction for chat messages",
    )?;

    Ok(())
}
