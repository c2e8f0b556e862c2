// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Processor descriptor produced by the probe

use std::fmt;

use crate::feature::{CpuFeature, FeatureSet};

/// Snapshot of the host CPU's feature set and topology
///
/// Only the probe functions build one, so every value upholds the
/// invariants below. Values are immutable once built; a zero affinity mask
/// means "unknown", not "no processors".
///
/// # Invariants
///
/// - `thread_count() >= core_count() >= 1`
/// - [`CpuFeature::HyperThreading`] is set exactly when
///   `thread_count() != core_count()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessorInfo {
    features: FeatureSet,
    thread_count: u32,
    core_count: u32,
    affinity_mask: usize,
}

impl ProcessorInfo {
    pub(crate) fn new(
        features: FeatureSet,
        thread_count: u32,
        core_count: u32,
        affinity_mask: usize,
    ) -> Self {
        ProcessorInfo {
            features,
            thread_count,
            core_count,
            affinity_mask,
        }
    }

    /// Detected feature flags
    pub fn features(&self) -> FeatureSet {
        self.features
    }

    /// Check a single feature flag
    pub fn has_feature(&self, feature: CpuFeature) -> bool {
        self.features.has(feature)
    }

    /// Logical execution units visible to the process
    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    /// Physical cores visible to the process
    pub fn core_count(&self) -> u32 {
        self.core_count
    }

    /// Processors the process may run on, one bit per logical processor
    pub fn affinity_mask(&self) -> usize {
        self.affinity_mask
    }

    /// More logical threads than physical cores
    pub fn is_hyperthreaded(&self) -> bool {
        self.has_feature(CpuFeature::HyperThreading)
    }

    /// Logical threads per physical core, rounded down
    pub fn threads_per_core(&self) -> u32 {
        self.thread_count / self.core_count.max(1)
    }

    /// Number of processors set in the affinity mask (0 if unknown)
    pub fn allowed_processor_count(&self) -> u32 {
        self.affinity_mask.count_ones()
    }
}

impl fmt::Display for ProcessorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cores / {} threads, affinity {:#x}, features: {}",
            self.core_count, self.thread_count, self.affinity_mask, self.features
        )
    }
}
