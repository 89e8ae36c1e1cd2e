/// Options for writing CubeML.
///
/// The default values are:
/// - `threshold`: `1000`
/// - `edge_items`: `3`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmlOptions {
    threshold: usize,
    edge_items: usize,
}

impl Default for CmlOptions {
    fn default() -> Self {
        Self {
            threshold: 1000,
            edge_items: 3,
        }
    }
}

impl CmlOptions {
    /// Return the threshold.
    ///
    /// Point and bound sequences with more values than the threshold are written elided,
    /// with a checksum of the full sequence.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Set the threshold.
    pub fn set_threshold(&mut self, threshold: usize) -> &mut Self {
        self.threshold = threshold;
        self
    }

    /// Set the threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Return the number of values kept at each end of an elided sequence.
    #[must_use]
    pub fn edge_items(&self) -> usize {
        self.edge_items
    }

    /// Set the number of values kept at each end of an elided sequence.
    pub fn set_edge_items(&mut self, edge_items: usize) -> &mut Self {
        self.edge_items = edge_items;
        self
    }

    /// Set the number of values kept at each end of an elided sequence.
    #[must_use]
    pub fn with_edge_items(mut self, edge_items: usize) -> Self {
        self.edge_items = edge_items;
        self
    }
}
