use serde::{Deserialize, Serialize};

/// Wire shape of every list endpoint: the total number of matching records
/// plus one page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: usize, results: Vec<T>) -> Self {
        Self { count, results }
    }

    pub fn empty() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}
