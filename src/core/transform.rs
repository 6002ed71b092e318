use crate::core::expand::expand_row;
use crate::core::normalize::normalize_row;
use crate::domain::model::{QueryOptions, Row};

/// Per-row pipeline: expansion first, so parsed fields get normalized too.
#[derive(Debug, Clone, Copy)]
pub struct RowTransformer {
    expand: bool,
    normalize: bool,
}

impl RowTransformer {
    pub fn new(options: &QueryOptions) -> Self {
        Self {
            expand: options.expand,
            normalize: options.normalize,
        }
    }

    pub fn apply(&self, row: &mut Row) {
        if self.expand {
            expand_row(row);
        }
        if self.normalize {
            normalize_row(row);
        }
    }
}
