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
//! Processor probe
//!
//! Aggregates instruction-set flags, the affinity mask and core/thread
//! counts from a [`Platform`] into a [`ProcessorInfo`].
//!
//! # Topology Sources
//!
//! Core and thread counts come from the first source that answers:
//!
//! 1. **Enumerated**: per-core topology records. Each core record counts as
//!    one physical core and contributes the popcount of its mask to the
//!    logical count.
//! 2. **OnlineCount**: the online processor count for cores and the hardware
//!    concurrency for threads, taken independently. If only the online count
//!    answers it is used for both.
//! 3. **HardwareConcurrency**: the hardware concurrency for both, assuming
//!    no hyperthreading. A platform whose enumeration lists no cores goes
//!    here directly.
//! 4. **Default**: one core, one thread.
//!
//! Counts are then normalized so that `threads >= cores >= 1`.
//!
//! Nothing here fails. Missing or failing capabilities degrade to the
//! documented defaults and are logged at `debug` level.

use tracing::{debug, info, trace};

use crate::error::ProbeError;
use crate::feature::{CpuFeature, FeatureSet};
use crate::info::ProcessorInfo;
use crate::platform::{NativePlatform, Platform, Relationship};

/// Where the core and thread counts came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologySource {
    /// Per-core topology enumeration
    Enumerated,
    /// Online processor count plus hardware concurrency
    OnlineCount,
    /// Hardware concurrency alone
    HardwareConcurrency,
    /// Nothing answered; one core, one thread
    Default,
}

/// Independent success signals for one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeStatus {
    /// At least one instruction-set flag was reported
    pub features_detected: bool,
    /// At least one flag of any kind ended up set.
    ///
    /// This is the value [`probe`] returns.
    pub any_feature: bool,
    /// The affinity mask came from the OS rather than the zero default
    pub affinity_detected: bool,
    /// Source of the core and thread counts
    pub topology_source: TopologySource,
}

impl ProbeStatus {
    /// Core and thread counts reflect real topology rather than a guess
    pub fn topology_detected(&self) -> bool {
        matches!(
            self.topology_source,
            TopologySource::Enumerated | TopologySource::OnlineCount
        )
    }
}

/// Number of set bits in a processor mask
pub fn count_set_bits(mask: usize) -> u32 {
    mask.count_ones()
}

/// Probe the host CPU
///
/// Returns the descriptor and whether any feature flag was set. The flag is
/// a weak signal: a machine with none of the listed extensions reports
/// `false` even though its counts are correct. Use [`probe_detailed`] for
/// per-capability status.
///
/// # Example
///
/// ```rust
/// let (info, _) = cpu_probe::probe();
/// assert!(info.thread_count() >= info.core_count());
/// assert!(info.core_count() >= 1);
/// ```
pub fn probe() -> (ProcessorInfo, bool) {
    probe_with(&NativePlatform)
}

/// Probe using an injected [`Platform`]
pub fn probe_with<P: Platform + ?Sized>(platform: &P) -> (ProcessorInfo, bool) {
    let (info, status) = probe_detailed_with(platform);
    (info, status.any_feature)
}

/// Probe the host CPU, reporting each capability's outcome separately
pub fn probe_detailed() -> (ProcessorInfo, ProbeStatus) {
    probe_detailed_with(&NativePlatform)
}

/// Probe using an injected [`Platform`], reporting each capability's outcome
pub fn probe_detailed_with<P: Platform + ?Sized>(platform: &P) -> (ProcessorInfo, ProbeStatus) {
    let mut features = FeatureSet::empty();
    for feature in CpuFeature::INSTRUCTION_SETS {
        features.set(feature.flag(), platform.has_feature(feature));
    }
    let features_detected = !features.is_empty();

    let (affinity_mask, affinity_detected) = match platform.affinity_mask() {
        Ok(mask) => (mask, true),
        Err(err) => {
            debug!(error = %err, "affinity mask unknown, using 0");
            (0, false)
        }
    };

    let counts = resolve_counts(platform);
    let (core_count, thread_count) = normalize(counts.cores, counts.threads);

    if thread_count != core_count {
        features.insert(FeatureSet::HYPER_THREADING);
    }

    let info = ProcessorInfo::new(features, thread_count, core_count, affinity_mask);
    let status = ProbeStatus {
        features_detected,
        any_feature: !features.is_empty(),
        affinity_detected,
        topology_source: counts.source,
    };

    info!(
        cores = core_count,
        threads = thread_count,
        affinity_mask,
        features = %features,
        source = ?counts.source,
        "processor probe complete"
    );

    (info, status)
}

struct Counts {
    cores: u32,
    threads: u32,
    source: TopologySource,
}

fn resolve_counts<P: Platform + ?Sized>(platform: &P) -> Counts {
    match platform.topology() {
        Ok(records) => {
            let (cores, threads) = records
                .iter()
                .filter(|record| record.relationship == Relationship::ProcessorCore)
                .fold((0u32, 0u32), |(cores, threads), record| {
                    (
                        cores.saturating_add(1),
                        threads.saturating_add(count_set_bits(record.processor_mask)),
                    )
                });
            trace!(records = records.len(), cores, threads, "enumerated topology");

            if cores > 0 {
                return Counts {
                    cores,
                    threads,
                    source: TopologySource::Enumerated,
                };
            }
            // An enumerating platform has no online count to fall back on.
            debug!("topology enumeration listed no processor cores");
            return from_concurrency(platform.hardware_concurrency());
        }
        Err(err) => debug!(error = %err, "topology enumeration unavailable"),
    }

    match (platform.online_processors(), platform.hardware_concurrency()) {
        (Ok(cores), Ok(threads)) => Counts {
            cores,
            threads,
            source: TopologySource::OnlineCount,
        },
        (Ok(online), Err(err)) => {
            debug!(
                error = %err,
                "hardware concurrency unavailable, using online processor count"
            );
            Counts {
                cores: online,
                threads: online,
                source: TopologySource::OnlineCount,
            }
        }
        (Err(err), concurrency) => {
            debug!(error = %err, "online processor count unavailable");
            from_concurrency(concurrency)
        }
    }
}

fn from_concurrency(concurrency: Result<u32, ProbeError>) -> Counts {
    match concurrency {
        Ok(threads) => Counts {
            cores: threads,
            threads,
            source: TopologySource::HardwareConcurrency,
        },
        Err(err) => {
            debug!(error = %err, "hardware concurrency unavailable, assuming one processor");
            Counts {
                cores: 1,
                threads: 1,
                source: TopologySource::Default,
            }
        }
    }
}

/// Enforce `threads >= cores >= 1`
fn normalize(cores: u32, threads: u32) -> (u32, u32) {
    let threads = threads.max(1);
    let cores = cores.clamp(1, threads);
    (cores, threads)
}
