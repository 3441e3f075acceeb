//! Bundles and their height windows.

use serde::{Deserialize, Serialize};
use shared_types::{BlockHeight, BundleId, Timestamp};

/// Unit of work: one report per bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: BundleId,
    pub from_timestamp: Timestamp,
    pub to_timestamp: Timestamp,
}

impl Bundle {
    pub fn new(id: impl Into<String>, from_timestamp: Timestamp, to_timestamp: Timestamp) -> Self {
        Self {
            id: BundleId::new(id),
            from_timestamp,
            to_timestamp,
        }
    }
}

/// Inclusive block-height bounds of a bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightWindow {
    pub from: BlockHeight,
    pub to: BlockHeight,
}

impl HeightWindow {
    pub fn is_valid(&self) -> bool {
        self.from <= self.to
    }

    pub fn len(&self) -> u64 {
        if self.is_valid() {
            self.to - self.from + 1
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
