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
//! # CPU Probe
//!
//! One-shot detection of the host CPU's instruction-set extensions and
//! topology, meant to run once during engine start-up.
//!
//! ## Features
//!
//! - **Instruction sets**: MMX, 3DNow!, AltiVec, SSE through SSE4.2, AVX, AVX2
//! - **Topology**: physical cores, logical threads, hyperthreading
//! - **Affinity**: the processors the process may run on
//! - **Best effort**: missing OS facilities degrade to defaults, never errors
//! - **Injectable**: every OS query sits behind the [`Platform`] trait
//!
//! ## Example
//!
//! ```rust
//! use cpu_probe::{probe, CpuFeature};
//!
//! let (info, _any_feature) = probe();
//! if info.has_feature(CpuFeature::Avx2) {
//!     // pick the AVX2 path
//! }
//! println!("{info}");
//! ```

#![warn(missing_docs)]

/// Probe error taxonomy
pub mod error;

/// Instruction-set feature flags
pub mod feature;

/// Processor descriptor
pub mod info;

/// Platform capability interface and native implementation
pub mod platform;

/// Thread pool sizing from probed topology
pub mod pool;

mod probe;

pub use error::ProbeError;
pub use feature::{CpuFeature, FeatureSet};
pub use info::ProcessorInfo;
pub use platform::{NativePlatform, Platform, Relationship, TopologyRecord};
pub use pool::ThreadPoolConfig;
pub use probe::{
    count_set_bits, probe, probe_detailed, probe_detailed_with, probe_with, ProbeStatus,
    TopologySource,
};

#[cfg(feature = "parallel")]
pub use pool::build_thread_pool;
