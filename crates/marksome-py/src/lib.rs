//! Python bindings for the marksome parser.

use std::sync::{Arc, Mutex};

use marksome_core::{
    ast::Text,
    render::{to_html, References},
    span::Span as CoreSpan,
    stats::collect_references,
    Segment,
};
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyString};

// ============================================================================
// Span
// ============================================================================

/// Source location in the input text (byte offsets).
#[pyclass(frozen, get_all, name = "Span")]
#[derive(Clone)]
pub struct PySpan {
    pub start: u32,
    pub end: u32,
}

#[pymethods]
impl PySpan {
    fn __repr__(&self) -> String {
        format!("Span({}, {})", self.start, self.end)
    }

    #[getter]
    fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreSpan> for PySpan {
    fn from(s: CoreSpan) -> Self {
        PySpan {
            start: s.start,
            end: s.end,
        }
    }
}

// ============================================================================
// Segment types
// ============================================================================

/// Literal text, escapes removed.
#[pyclass(frozen, get_all, name = "Text")]
pub struct PyText {
    pub content: String,
    pub span: PySpan,
}

#[pymethods]
impl PyText {
    fn __repr__(&self) -> String {
        format!("Text({:?})", self.content)
    }
}

/// Emphasis (italic).
#[pyclass(frozen, get_all, name = "Emphasis")]
pub struct PyEmphasis {
    pub content: PyObject,
    pub span: PySpan,
}

/// Strong (bold).
#[pyclass(frozen, get_all, name = "Strong")]
pub struct PyStrong {
    pub content: PyObject,
    pub span: PySpan,
}

/// Reference link; `reference` is the raw key.
#[pyclass(frozen, get_all, name = "ReferenceLink")]
pub struct PyReferenceLink {
    pub content: PyObject,
    pub reference: String,
    pub span: PySpan,
}

#[pymethods]
impl PyReferenceLink {
    fn __repr__(&self) -> String {
        format!("ReferenceLink(reference={:?})", self.reference)
    }
}

// ============================================================================
// Conversion
// ============================================================================

enum Step<'s, 'a> {
    Enter(&'s Segment<'a>),
    Exit(&'s Segment<'a>),
}

/// Convert `segments` to a list of Python objects, bottom-up.
///
/// Uses an explicit stack with one buffer per open container, so deeply
/// nested input cannot exhaust the call stack.
fn convert_segments(py: Python<'_>, segments: &[Segment<'_>]) -> PyResult<PyObject> {
    let mut buffers: Vec<Vec<PyObject>> = vec![Vec::new()];
    let mut steps: Vec<Step<'_, '_>> = segments.iter().rev().map(Step::Enter).collect();

    while let Some(step) = steps.pop() {
        match step {
            Step::Enter(Segment::Text(t)) => {
                let object = convert_text(py, t)?;
                if let Some(buffer) = buffers.last_mut() {
                    buffer.push(object);
                }
            }
            Step::Enter(segment) => {
                buffers.push(Vec::new());
                steps.push(Step::Exit(segment));
                steps.extend(segment.content().iter().rev().map(Step::Enter));
            }
            Step::Exit(segment) => {
                let children = buffers.pop().unwrap_or_default();
                let content = PyList::new(py, children)?.into_any().unbind();
                let object = convert_container(py, segment, content)?;
                if let Some(buffer) = buffers.last_mut() {
                    buffer.push(object);
                }
            }
        }
    }

    let top = buffers.pop().unwrap_or_default();
    Ok(PyList::new(py, top)?.into_any().unbind())
}

fn convert_text(py: Python<'_>, t: &Text<'_>) -> PyResult<PyObject> {
    let text = PyText {
        content: t.content.to_string(),
        span: t.span.into(),
    };
    Ok(Py::new(py, text)?.into_any())
}

/// Wrap already converted children in the class matching `segment`.
fn convert_container(
    py: Python<'_>,
    segment: &Segment<'_>,
    content: PyObject,
) -> PyResult<PyObject> {
    let object = match segment {
        Segment::Text(t) => convert_text(py, t)?,
        Segment::Emphasis(e) => Py::new(
            py,
            PyEmphasis {
                content,
                span: e.span.into(),
            },
        )?
        .into_any(),
        Segment::Strong(s) => Py::new(
            py,
            PyStrong {
                content,
                span: s.span.into(),
            },
        )?
        .into_any(),
        Segment::ReferenceLink(l) => Py::new(
            py,
            PyReferenceLink {
                content,
                reference: l.reference.to_string(),
                span: l.span.into(),
            },
        )?
        .into_any(),
    };
    Ok(object)
}

/// Build a reference table from a dict of `key -> url | callable`.
///
/// Callables receive `(index, children_html)` and return a string. The
/// first exception raised by a callable is stored in `failure`.
fn convert_references(
    references: &Bound<'_, PyDict>,
    failure: &Arc<Mutex<Option<PyErr>>>,
) -> PyResult<References> {
    let mut table = References::new();

    for (key, value) in references.iter() {
        let key: String = key.extract()?;

        if let Ok(url) = value.downcast::<PyString>() {
            table.insert_url(key, url.to_str()?);
        } else if value.is_callable() {
            let callback = value.clone().unbind();
            let failure = Arc::clone(failure);
            table.insert_render(key, move |index, children| {
                Python::with_gil(|py| {
                    match callback
                        .bind(py)
                        .call1((index, children))
                        .and_then(|html| html.extract::<String>())
                    {
                        Ok(html) => html,
                        Err(err) => {
                            if let Ok(mut slot) = failure.lock() {
                                slot.get_or_insert(err);
                            }
                            String::new()
                        }
                    }
                })
            });
        } else {
            return Err(PyTypeError::new_err(format!(
                "reference '{}' must be a str or a callable",
                key
            )));
        }
    }

    Ok(table)
}

// ============================================================================
// Functions
// ============================================================================

/// Parse inline markup into a list of segments.
///
/// Never raises: malformed markup is returned as text.
///
/// Args:
///     text: Inline markup
///
/// Returns:
///     list[Text | Strong | Emphasis | ReferenceLink]
#[pyfunction]
#[pyo3(text_signature = "(text)")]
fn parse(py: Python<'_>, text: &str) -> PyResult<PyObject> {
    convert_segments(py, &marksome_core::parse(text))
}

/// Render inline markup to HTML, wrapped in an outer `<span>`.
///
/// Args:
///     text: Inline markup
///     references: Mapping of reference key to URL or to a callable
///         `(index, children_html) -> str`
///
/// Returns:
///     str: HTML
///
/// Raises:
///     TypeError: On a reference that is neither str nor callable
///     Exception: Whatever a reference callable raised
#[pyfunction]
#[pyo3(signature = (text, references=None), text_signature = "(text, references=None)")]
fn render_html(text: &str, references: Option<&Bound<'_, PyDict>>) -> PyResult<String> {
    let failure = Arc::new(Mutex::new(None));
    let table = match references {
        Some(dict) => convert_references(dict, &failure)?,
        None => References::new(),
    };

    let html = to_html(text, &table);

    let raised = failure.lock().ok().and_then(|mut slot| slot.take());
    match raised {
        Some(err) => Err(err),
        None => Ok(html),
    }
}

/// Distinct reference keys used in `text`, in order of first appearance.
#[pyfunction]
#[pyo3(text_signature = "(text)")]
fn references(text: &str) -> Vec<String> {
    let segments = marksome_core::parse(text);
    collect_references(&segments)
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Module
// ============================================================================

/// Marksome - inline markup parser for product copy.
#[pymodule]
fn pymarksome(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySpan>()?;
    m.add_class::<PyText>()?;
    m.add_class::<PyEmphasis>()?;
    m.add_class::<PyStrong>()?;
    m.add_class::<PyReferenceLink>()?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(render_html, m)?)?;
    m.add_function(wrap_pyfunction!(references, m)?)?;
    Ok(())
}
