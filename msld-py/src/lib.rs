//! Python bindings for the msld retinal vessel line detector.
//!
//! This module exposes the high-level msld API to Python via PyO3. Images are
//! 2D `float32` arrays (height x width) with vessels bright; labels and masks
//! are 2D `bool` arrays of the same shape.

use numpy::{
    IntoPyArray, PyArray2, PyArrayMethods, PyReadonlyArray2, PyReadonlyArray3,
    PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use msld::{Border, Msld as RustMsld, MsldConfig, MsldError, OwnedImage, Sample};

/// Convert an MsldError to a Python exception.
fn to_py_err(err: MsldError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

fn parse_border(border: &str) -> PyResult<Border> {
    match border.to_lowercase().as_str() {
        "reflect" => Ok(Border::Reflect),
        "replicate" => Ok(Border::Replicate),
        _ => Err(PyValueError::new_err(
            "border must be 'reflect' or 'replicate'",
        )),
    }
}

fn owned_from_array<T: Copy + numpy::Element>(
    array: &PyReadonlyArray2<'_, T>,
) -> PyResult<OwnedImage<T>> {
    let shape = array.shape();
    let height = shape[0];
    let width = shape[1];
    let data: Vec<T> = array.as_slice()?.to_vec();
    OwnedImage::new(data, width, height).map_err(to_py_err)
}

fn to_pyarray<'py, T: Copy + numpy::Element>(
    py: Python<'py>,
    image: OwnedImage<T>,
) -> PyResult<Bound<'py, PyArray2<T>>> {
    let (width, height) = image.dims();
    image
        .into_data()
        .into_pyarray(py)
        .reshape([height, width])
}

/// Build samples from parallel lists of images, labels and masks.
fn build_dataset(
    images: Vec<PyReadonlyArray2<'_, f32>>,
    labels: Vec<PyReadonlyArray2<'_, bool>>,
    masks: Vec<PyReadonlyArray2<'_, bool>>,
) -> PyResult<Vec<Sample>> {
    if images.len() != labels.len() || images.len() != masks.len() {
        return Err(PyValueError::new_err(
            "images, labels and masks must have the same length",
        ));
    }
    images
        .iter()
        .zip(&labels)
        .zip(&masks)
        .map(|((image, label), mask)| {
            Sample::new(
                owned_from_array(image)?,
                owned_from_array(label)?,
                owned_from_array(mask)?,
            )
            .map_err(to_py_err)
        })
        .collect()
}

/// ROC curve over the region-of-interest pixels of a dataset.
#[pyclass]
pub struct RocCurve {
    /// False-positive rates, by decreasing threshold.
    #[pyo3(get)]
    pub fpr: Vec<f64>,
    /// True-positive rates, by decreasing threshold.
    #[pyo3(get)]
    pub tpr: Vec<f64>,
    /// Thresholds; the first one is +inf.
    #[pyo3(get)]
    pub thresholds: Vec<f32>,
    /// Area under the curve.
    #[pyo3(get)]
    pub auc: f64,
}

#[pymethods]
impl RocCurve {
    fn __repr__(&self) -> String {
        format!(
            "RocCurve(points={}, auc={:.4})",
            self.thresholds.len(),
            self.auc
        )
    }
}

/// Accuracy and confusion matrix at the detector threshold.
#[pyclass]
pub struct NaiveMetrics {
    /// Fraction of ROI pixels classified correctly.
    #[pyo3(get)]
    pub accuracy: f64,
    /// Confusion matrix `[[TN, FP], [FN, TP]]` normalized per true class.
    #[pyo3(get)]
    pub confusion: [[f64; 2]; 2],
    /// Raw counts `[[TN, FP], [FN, TP]]`.
    #[pyo3(get)]
    pub counts: [[u64; 2]; 2],
}

#[pymethods]
impl NaiveMetrics {
    fn __repr__(&self) -> String {
        format!("NaiveMetrics(accuracy={:.4})", self.accuracy)
    }
}

/// Multi-scale line detector.
#[pyclass]
pub struct Msld {
    inner: RustMsld,
}

#[pymethods]
impl Msld {
    /// Create a new detector.
    ///
    /// Args:
    ///     window_size: Side of the averaging window, odd (default: 15)
    ///     scales: Line lengths (default: [3, 5, 7, 9, 11, 13, 15])
    ///     orientations: Number of line orientations (default: 12)
    ///     border: "reflect" or "replicate" (default: "reflect")
    ///     parallel: Enable parallel execution (default: False)
    #[new]
    #[pyo3(signature = (
        window_size = 15,
        scales = None,
        orientations = 12,
        border = "reflect",
        parallel = false
    ))]
    fn new(
        window_size: usize,
        scales: Option<Vec<usize>>,
        orientations: usize,
        border: &str,
        parallel: bool,
    ) -> PyResult<Self> {
        let cfg = MsldConfig {
            window_size,
            scales: scales.unwrap_or_else(|| MsldConfig::default().scales),
            orientations,
            border: parse_border(border)?,
            parallel,
        };
        let inner = RustMsld::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Segmentation threshold.
    #[getter]
    fn threshold(&self) -> f32 {
        self.inner.threshold()
    }

    #[setter]
    fn set_threshold(&mut self, threshold: f32) {
        self.inner.set_threshold(threshold);
    }

    /// Single-scale line response of a 2D float32 image.
    fn bld<'py>(
        &self,
        py: Python<'py>,
        image: PyReadonlyArray2<'py, f32>,
        scale: usize,
    ) -> PyResult<Bound<'py, PyArray2<f32>>> {
        let owned = owned_from_array(&image)?;
        let response = self.inner.bld(owned.view(), scale).map_err(to_py_err)?;
        to_pyarray(py, response)
    }

    /// Combined multi-scale line response of a 2D float32 image.
    fn combine<'py>(
        &self,
        py: Python<'py>,
        image: PyReadonlyArray2<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray2<f32>>> {
        let owned = owned_from_array(&image)?;
        let response = self.inner.combine(owned.view()).map_err(to_py_err)?;
        to_pyarray(py, response)
    }

    /// Binary vessel map of a 2D float32 image.
    fn segment<'py>(
        &self,
        py: Python<'py>,
        image: PyReadonlyArray2<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray2<bool>>> {
        let owned = owned_from_array(&image)?;
        let segmented = self.inner.segment(owned.view()).map_err(to_py_err)?;
        to_pyarray(py, segmented)
    }

    /// Learn the accuracy-maximizing threshold and store it.
    ///
    /// Returns:
    ///     (threshold, accuracy)
    fn learn_threshold(
        &mut self,
        images: Vec<PyReadonlyArray2<'_, f32>>,
        labels: Vec<PyReadonlyArray2<'_, bool>>,
        masks: Vec<PyReadonlyArray2<'_, bool>>,
    ) -> PyResult<(f32, f64)> {
        let dataset = build_dataset(images, labels, masks)?;
        self.inner.learn_threshold(&dataset).map_err(to_py_err)
    }

    /// ROC curve of the combined response over the dataset.
    fn roc(
        &self,
        images: Vec<PyReadonlyArray2<'_, f32>>,
        labels: Vec<PyReadonlyArray2<'_, bool>>,
        masks: Vec<PyReadonlyArray2<'_, bool>>,
    ) -> PyResult<RocCurve> {
        let dataset = build_dataset(images, labels, masks)?;
        let analysis = self.inner.roc(&dataset).map_err(to_py_err)?;
        let auc = analysis.auc();
        Ok(RocCurve {
            fpr: analysis.curve.fpr,
            tpr: analysis.curve.tpr,
            thresholds: analysis.curve.thresholds,
            auc,
        })
    }

    /// Area under the ROC curve over the dataset.
    fn auc(
        &self,
        images: Vec<PyReadonlyArray2<'_, f32>>,
        labels: Vec<PyReadonlyArray2<'_, bool>>,
        masks: Vec<PyReadonlyArray2<'_, bool>>,
    ) -> PyResult<f64> {
        let dataset = build_dataset(images, labels, masks)?;
        self.inner.auc(&dataset).map_err(to_py_err)
    }

    /// Accuracy and confusion matrix at the current threshold.
    fn naive_metrics(
        &self,
        images: Vec<PyReadonlyArray2<'_, f32>>,
        labels: Vec<PyReadonlyArray2<'_, bool>>,
        masks: Vec<PyReadonlyArray2<'_, bool>>,
    ) -> PyResult<NaiveMetrics> {
        let dataset = build_dataset(images, labels, masks)?;
        let metrics = self.inner.naive_metrics(&dataset).map_err(to_py_err)?;
        Ok(NaiveMetrics {
            accuracy: metrics.accuracy,
            confusion: metrics.normalized,
            counts: metrics.counts.counts(),
        })
    }

    /// Dice coefficient of the segmentation, pooled over the dataset ROI.
    fn dice(
        &self,
        images: Vec<PyReadonlyArray2<'_, f32>>,
        labels: Vec<PyReadonlyArray2<'_, bool>>,
        masks: Vec<PyReadonlyArray2<'_, bool>>,
    ) -> PyResult<f64> {
        let dataset = build_dataset(images, labels, masks)?;
        self.inner.dice(&dataset).map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        let cfg = self.inner.config();
        format!(
            "Msld(window_size={}, scales={:?}, orientations={}, threshold={})",
            cfg.window_size,
            cfg.scales,
            cfg.orientations,
            self.inner.threshold()
        )
    }
}

/// Dice coefficient between two boolean arrays of the same shape.
#[pyfunction]
fn dice(
    targets: PyReadonlyArray2<'_, bool>,
    predictions: PyReadonlyArray2<'_, bool>,
) -> PyResult<f64> {
    if targets.shape() != predictions.shape() {
        return Err(PyValueError::new_err(
            "targets and predictions must have the same shape",
        ));
    }
    msld::dice(targets.as_slice()?, predictions.as_slice()?).map_err(to_py_err)
}

/// Inverted green channel of an RGB image (height x width x 3, float32 in [0, 1]).
#[pyfunction]
fn green_inverted<'py>(
    py: Python<'py>,
    rgb: PyReadonlyArray3<'py, f32>,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let shape = rgb.shape();
    if shape[2] != 3 {
        return Err(PyValueError::new_err("expected an (H, W, 3) array"));
    }
    let (height, width) = (shape[0], shape[1]);
    let image = msld::green_inverted(rgb.as_slice()?, width, height).map_err(to_py_err)?;
    to_pyarray(py, image)
}

/// Python module for msld vessel segmentation.
#[pymodule]
fn _msld(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Msld>()?;
    m.add_class::<RocCurve>()?;
    m.add_class::<NaiveMetrics>()?;
    m.add_function(wrap_pyfunction!(dice, m)?)?;
    m.add_function(wrap_pyfunction!(green_inverted, m)?)?;

    // Add version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
