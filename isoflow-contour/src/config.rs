//! Contouring options

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration for the Flying Edges contour filter
#[derive(Debug, Clone)]
pub struct ContourConfig {
    /// Whether to compute unit vertex normals (the negated, normalized gradient)
    pub compute_normals: bool,
    /// Whether to output the raw interpolated gradient per vertex
    pub compute_gradients: bool,
    /// Whether to output the isovalue as a per-vertex scalar
    pub compute_scalars: bool,
    /// Whether to interpolate the volume's point attributes onto vertices
    pub interpolate_attributes: bool,
    /// Component of a multi-component field to contour
    pub array_component: usize,
    /// Skip the parts of each row that cannot hold contour
    pub computational_trimming: bool,
    /// Raised by another thread to abandon the computation
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            compute_normals: true,
            compute_gradients: false,
            compute_scalars: true,
            interpolate_attributes: false,
            array_component: 0,
            computational_trimming: true,
            cancel: None,
        }
    }
}

impl ContourConfig {
    pub fn with_normals(mut self, enabled: bool) -> Self {
        self.compute_normals = enabled;
        self
    }

    pub fn with_gradients(mut self, enabled: bool) -> Self {
        self.compute_gradients = enabled;
        self
    }

    pub fn with_scalars(mut self, enabled: bool) -> Self {
        self.compute_scalars = enabled;
        self
    }

    pub fn with_attributes(mut self, enabled: bool) -> Self {
        self.interpolate_attributes = enabled;
        self
    }

    pub fn with_component(mut self, component: usize) -> Self {
        self.array_component = component;
        self
    }

    /// Enable or disable computational trimming
    ///
    /// Output is identical either way; disabling only costs time.
    pub fn with_trimming(mut self, enabled: bool) -> Self {
        self.computational_trimming = enabled;
        self
    }

    /// Share a flag that aborts the computation once set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// True when the cancellation flag has been raised
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Whether any per-vertex gradient has to be evaluated
    pub(crate) fn needs_gradients(&self) -> bool {
        self.compute_normals || self.compute_gradients
    }
}
