// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PyO3 bindings for the scanner

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::scanner::{
    CustomPattern, PiiCategory, PiiItem, PiiScanner, ScanReport, ScannerConfig, SensitivityLevel,
};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Extract configuration from a Python dict; missing keys keep defaults
fn config_from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<ScannerConfig> {
    let mut config = ScannerConfig::default();

    macro_rules! extract_field {
        ($field:ident) => {
            if let Some(value) = dict.get_item(stringify!($field))? {
                config.$field = value.extract()?;
            }
        };
    }

    extract_field!(redaction_text);
    extract_field!(context_window);
    extract_field!(fallback_enabled);
    extract_field!(log_detections);
    extract_field!(whitelist_patterns);

    if let Some(value) = dict.get_item("sensitivity")? {
        let level: String = value.extract()?;
        config.sensitivity = level.parse().map_err(value_error)?;
    }

    if let Some(value) = dict.get_item("disabled_categories")? {
        let names: Vec<String> = value.extract()?;
        config.disabled_categories = names
            .iter()
            .map(|name| name.parse::<PiiCategory>())
            .collect::<Result<_, _>>()
            .map_err(value_error)?;
    }

    if let Some(value) = dict.get_item("custom_patterns")? {
        let items: Vec<Bound<'_, PyDict>> = value.extract()?;
        for item in items {
            let pattern: String = item
                .get_item("pattern")?
                .ok_or_else(|| PyValueError::new_err("Missing 'pattern' field"))?
                .extract()?;
            let description: String = item
                .get_item("description")?
                .ok_or_else(|| PyValueError::new_err("Missing 'description' field"))?
                .extract()?;
            let enabled: bool = match item.get_item("enabled")? {
                Some(val) => val.extract()?,
                None => true,
            };
            config.custom_patterns.push(CustomPattern {
                pattern,
                description,
                enabled,
            });
        }
    }

    Ok(config)
}

fn item_to_py<'py>(py: Python<'py>, item: &PiiItem) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("type", &item.label)?;
    dict.set_item("category", item.category.as_str())?;
    dict.set_item("confidence", item.confidence)?;
    dict.set_item("context", item.context.as_deref())?;
    dict.set_item("value", &item.value)?;
    dict.set_item("hash", &item.hash)?;
    dict.set_item("position", item.position.map(|[start, end]| (start, end)))?;
    Ok(dict)
}

fn report_to_py<'py>(py: Python<'py>, report: &ScanReport) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("detected", report.detected)?;
    dict.set_item("level", report.level.label())?;
    dict.set_item("sanitized_text", &report.sanitized_text)?;

    let categories = PyList::empty(py);
    for hit in &report.categories {
        let entry = PyDict::new(py);
        entry.set_item("category", hit.category.as_str())?;
        entry.set_item("label", &hit.label)?;
        entry.set_item("confidence", hit.confidence)?;
        entry.set_item("context", hit.context.as_deref())?;
        categories.append(entry)?;
    }
    dict.set_item("categories", categories)?;

    let matches = PyList::empty(py);
    for m in &report.matches {
        let entry = PyDict::new(py);
        entry.set_item("category", m.category.as_str())?;
        entry.set_item("label", &m.label)?;
        entry.set_item("start", m.start)?;
        entry.set_item("end", m.end)?;
        entry.set_item("confidence", m.confidence)?;
        entry.set_item("context", &m.context)?;
        entry.set_item("value", &m.value)?;
        matches.append(entry)?;
    }
    dict.set_item("matches", matches)?;

    let items = PyList::empty(py);
    for item in report.pii_items() {
        items.append(item_to_py(py, &item)?)?;
    }
    dict.set_item("pii_items", items)?;

    Ok(dict)
}

/// PII scanner exposed to Python
///
/// # Example (Python)
/// ```python
/// from pii_shield import PiiScannerRust
///
/// scanner = PiiScannerRust({"fallback_enabled": False})
/// report = scanner.scan("My SSN is 123-45-6789", "High (Sensitive)")
/// print(report["sanitized_text"])  # "My SSN is [REDACTED]"
/// ```
#[pyclass]
pub struct PiiScannerRust {
    scanner: PiiScanner,
}

impl PiiScannerRust {
    fn level(&self, level: Option<&str>) -> PyResult<SensitivityLevel> {
        match level {
            Some(raw) => raw.parse().map_err(value_error),
            None => Ok(self.scanner.config().sensitivity),
        }
    }
}

#[pymethods]
impl PiiScannerRust {
    /// Create a scanner
    ///
    /// # Configuration Keys
    /// * `sensitivity` (str): "High (Sensitive)", "Medium (Standard)", "Low (Minimal)"
    /// * `redaction_text` (str): placeholder for redacted spans (default: "[REDACTED]")
    /// * `context_window` (int): characters of context each side of a match
    /// * `fallback_enabled` (bool): allow the random "potential PII" hit
    /// * `disabled_categories` (list[str]): category names to skip
    /// * `custom_patterns` (list[dict]): `pattern`, `description`, optional `enabled`
    /// * `whitelist_patterns` (list[str]): regexes for values never reported
    #[new]
    #[pyo3(signature = (config = None))]
    pub fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config = match config {
            Some(dict) => config_from_py_dict(dict)?,
            None => ScannerConfig::default(),
        };
        let scanner = PiiScanner::new(config).map_err(value_error)?;
        Ok(Self { scanner })
    }

    /// Scan text and return the full report as a dict
    #[pyo3(signature = (text, level = None))]
    pub fn scan<'py>(
        &self,
        py: Python<'py>,
        text: &str,
        level: Option<&str>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let level = self.level(level)?;
        let report = self.scanner.scan_at(text, level);
        report_to_py(py, &report)
    }

    /// Redacted copy of the text
    pub fn sanitize(&self, text: &str) -> String {
        self.scanner.sanitize(text)
    }
}
