//! Checker configuration

/// Limits applied while registering types and checking expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Maximum number of tuple elements or bundle fields
    pub product_max_size: usize,
    /// Maximum number of cases in a union
    pub sum_max_branches: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            product_max_size: 256,
            sum_max_branches: 256,
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product_max_size(mut self, max: usize) -> Self {
        self.product_max_size = max;
        self
    }

    pub fn with_sum_max_branches(mut self, max: usize) -> Self {
        self.sum_max_branches = max;
        self
    }
}
