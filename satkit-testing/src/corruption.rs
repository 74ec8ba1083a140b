// Satkit Testing - Index corruption
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Deliberate index corruption for exercising host validation.

use satkit::IndexError;
use serde::{Deserialize, Serialize};

/// A single corruption applied to the head of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexCorruption {
    /// Swap positions `[0, 3)` with `[3, 6)`.
    NonMonotonic,
    /// Overwrite positions `[6, 9)` with copies of position 6.
    NonUnique,
}

impl IndexCorruption {
    /// Samples needed to apply this corruption.
    pub fn min_len(&self) -> usize {
        match self {
            IndexCorruption::NonMonotonic => 6,
            IndexCorruption::NonUnique => 9,
        }
    }

    /// Corrupt the index in place.
    pub fn apply<T: Copy>(&self, index: &mut [T]) -> Result<(), IndexError> {
        let needed = self.min_len();
        if index.len() < needed {
            return Err(IndexError::TooShortToCorrupt {
                needed,
                available: index.len(),
            });
        }
        match self {
            IndexCorruption::NonMonotonic => index[0..6].rotate_left(3),
            IndexCorruption::NonUnique => {
                let repeated = index[6];
                index[6..9].fill(repeated);
            }
        }
        Ok(())
    }
}

/// Ordered list of corruptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedIndex {
    pub steps: Vec<IndexCorruption>,
}

impl MalformedIndex {
    /// Non-monotonic, then non-unique.
    pub fn standard() -> Self {
        Self {
            steps: vec![IndexCorruption::NonMonotonic, IndexCorruption::NonUnique],
        }
    }

    /// Apply every step. Nothing is modified if the index is too short for
    /// any of them.
    pub fn apply<T: Copy>(&self, index: &mut [T]) -> Result<(), IndexError> {
        let needed = self.steps.iter().map(|s| s.min_len()).max().unwrap_or(0);
        if index.len() < needed {
            return Err(IndexError::TooShortToCorrupt {
                needed,
                available: index.len(),
            });
        }
        for step in &self.steps {
            step.apply(index)?;
        }
        Ok(())
    }
}
