//! Ordered isovalue lists

use itertools::Itertools;
use std::ops::Deref;

/// The isovalues to extract, in output order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourValues {
    values: Vec<f64>,
}

impl ContourValues {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// A list holding one value
    pub fn single(value: f64) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// `count` evenly spaced values from `min` to `max` inclusive
    ///
    /// A single value yields `min`; zero values yield an empty list.
    pub fn generate(count: usize, min: f64, max: f64) -> Self {
        let values = match count {
            0 => Vec::new(),
            1 => vec![min],
            _ => {
                let step = (max - min) / (count - 1) as f64;
                (0..count).map(|i| min + step * i as f64).collect()
            }
        };
        Self { values }
    }

    /// Values sorted ascending with duplicates removed
    pub fn sorted_unique(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .copied()
                .sorted_by(f64::total_cmp)
                .dedup()
                .collect(),
        }
    }

    /// Replace the value at `index`, growing the list if needed
    pub fn set(&mut self, index: usize, value: f64) {
        if index >= self.values.len() {
            self.values.resize(index + 1, 0.0);
        }
        self.values[index] = value;
    }
}

impl Deref for ContourValues {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl From<f64> for ContourValues {
    fn from(value: f64) -> Self {
        Self::single(value)
    }
}

impl From<Vec<f64>> for ContourValues {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for ContourValues {
    fn from(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }
}

impl FromIterator<f64> for ContourValues {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
