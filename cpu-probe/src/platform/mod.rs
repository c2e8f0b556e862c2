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
//! Platform capability surface
//!
//! The probe aggregates answers from five independent capabilities. Each one
//! is a method on [`Platform`] so the aggregation can run against the live
//! OS ([`NativePlatform`]) or against a test double.
//!
//! # Degradation
//!
//! A capability that does not exist on the target answers
//! [`ProbeError::Unsupported`]; a capability whose system call fails answers
//! [`ProbeError::Os`]. The probe treats both the same way.

mod native;

pub use native::NativePlatform;

use crate::error::ProbeError;
use crate::feature::CpuFeature;

pub(crate) const AFFINITY: &str = "process affinity mask";
pub(crate) const TOPOLOGY: &str = "logical processor topology";
pub(crate) const ONLINE_PROCESSORS: &str = "online processor count";
pub(crate) const HARDWARE_CONCURRENCY: &str = "hardware concurrency";

/// What a [`TopologyRecord`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// A physical core; the mask lists its logical processors
    ProcessorCore,
    /// A NUMA node
    NumaNode,
    /// A cache shared by the processors in the mask
    Cache,
    /// A physical package (socket)
    ProcessorPackage,
    /// Anything else the OS reports
    Other,
}

/// One entry of a logical-processor topology enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopologyRecord {
    /// Kind of entry
    pub relationship: Relationship,
    /// Logical processors covered by the entry
    pub processor_mask: usize,
}

impl TopologyRecord {
    /// A core record covering the logical processors in `processor_mask`
    pub fn core(processor_mask: usize) -> Self {
        TopologyRecord {
            relationship: Relationship::ProcessorCore,
            processor_mask,
        }
    }
}

/// Source of raw CPU facts
///
/// Implementations must not panic. Feature queries answer `false` for
/// anything the platform cannot check.
pub trait Platform {
    /// Whether the instruction-set extension is supported
    fn has_feature(&self, feature: CpuFeature) -> bool;

    /// Processors the current process may run on
    fn affinity_mask(&self) -> Result<usize, ProbeError>;

    /// Per-core topology enumeration
    fn topology(&self) -> Result<Vec<TopologyRecord>, ProbeError>;

    /// POSIX-style count of online processors
    fn online_processors(&self) -> Result<u32, ProbeError>;

    /// Number of threads the process can run in parallel
    fn hardware_concurrency(&self) -> Result<u32, ProbeError>;
}
