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
//! End-to-end probe scenarios against scripted platforms

mod common;

use common::StubPlatform;
use cpu_probe::{
    probe, probe_detailed_with, probe_with, CpuFeature, FeatureSet, ProbeError, Relationship,
    TopologyRecord, TopologySource,
};

#[test]
fn test_only_reported_features_are_set() {
    let stub = StubPlatform::new()
        .with_features(&[CpuFeature::Sse, CpuFeature::Sse2])
        .with_concurrency(4);

    let (info, success) = probe_with(&stub);
    assert_eq!(info.features(), FeatureSet::SSE | FeatureSet::SSE2);
    assert!(success);
}

#[test]
fn test_degenerate_topology_falls_back_to_hardware_concurrency() {
    let stub = StubPlatform::new()
        .with_topology(vec![TopologyRecord {
            relationship: Relationship::NumaNode,
            processor_mask: 0xf,
        }])
        .with_concurrency(6);

    let (info, status) = probe_detailed_with(&stub);
    assert_eq!(info.core_count(), 6);
    assert_eq!(info.thread_count(), 6);
    assert!(!info.is_hyperthreaded());
    assert_eq!(status.topology_source, TopologySource::HardwareConcurrency);
}

#[test]
fn test_empty_topology_falls_back_to_hardware_concurrency() {
    let stub = StubPlatform::new().with_topology(Vec::new()).with_concurrency(3);

    let (info, _) = probe_with(&stub);
    assert_eq!(info.core_count(), 3);
    assert_eq!(info.thread_count(), 3);
}

#[test]
fn test_coreless_topology_ignores_online_count() {
    let stub = StubPlatform::new()
        .with_topology(Vec::new())
        .with_online(2)
        .with_concurrency(8);

    let (info, status) = probe_detailed_with(&stub);
    assert_eq!((info.core_count(), info.thread_count()), (8, 8));
    assert!(!info.is_hyperthreaded());
    assert_eq!(status.topology_source, TopologySource::HardwareConcurrency);
}

#[test]
fn test_online_count_alone_sets_both_counts() {
    let stub = StubPlatform::new().with_online(6);

    let (info, status) = probe_detailed_with(&stub);
    assert_eq!((info.core_count(), info.thread_count()), (6, 6));
    assert_eq!(status.topology_source, TopologySource::OnlineCount);
    assert!(status.topology_detected());
}

#[test]
fn test_unsupported_affinity_defaults_to_zero() {
    let stub = StubPlatform::new()
        .with_features(&[CpuFeature::Mmx])
        .with_concurrency(2);

    let (info, status) = probe_detailed_with(&stub);
    assert_eq!(info.affinity_mask(), 0);
    assert_eq!(info.allowed_processor_count(), 0);
    assert!(!status.affinity_detected);
}

#[test]
fn test_reported_affinity_is_kept() {
    let stub = StubPlatform::new().with_affinity(0b1010).with_concurrency(4);

    let (info, status) = probe_detailed_with(&stub);
    assert_eq!(info.affinity_mask(), 0b1010);
    assert_eq!(info.allowed_processor_count(), 2);
    assert!(status.affinity_detected);
}

#[test]
fn test_repeated_probes_are_identical() {
    let stub = StubPlatform::new()
        .with_features(&[CpuFeature::Sse, CpuFeature::Avx, CpuFeature::Avx2])
        .with_affinity(0xff)
        .with_topology(vec![TopologyRecord::core(0b11), TopologyRecord::core(0b1100)])
        .with_concurrency(4);

    let first = probe_detailed_with(&stub);
    let second = probe_detailed_with(&stub);
    assert_eq!(first, second);
}

#[test]
fn test_four_hyperthreaded_cores() {
    let records = (0..4)
        .map(|core| TopologyRecord::core(0b11 << (core * 2)))
        .collect();
    let stub = StubPlatform::new()
        .with_features(&[CpuFeature::Sse2])
        .with_affinity(0xff)
        .with_topology(records);

    let (info, status) = probe_detailed_with(&stub);
    assert_eq!(info.core_count(), 4);
    assert_eq!(info.thread_count(), 8);
    assert_eq!(info.threads_per_core(), 2);
    assert!(info.has_feature(CpuFeature::HyperThreading));
    assert_eq!(status.topology_source, TopologySource::Enumerated);
}

#[test]
fn test_no_features_reports_failure_but_keeps_counts() {
    let stub = StubPlatform::new().with_online(4).with_concurrency(4);

    let (info, success) = probe_with(&stub);
    assert!(!success);
    assert_eq!(info.core_count(), 4);
    assert_eq!(info.thread_count(), 4);
}

/// A platform whose system calls all fail rather than being absent
struct FailingPlatform;

impl cpu_probe::Platform for FailingPlatform {
    fn has_feature(&self, _feature: CpuFeature) -> bool {
        false
    }

    fn affinity_mask(&self) -> Result<usize, ProbeError> {
        Err(ProbeError::Os {
            capability: "process affinity mask",
            source: std::io::Error::from_raw_os_error(1),
        })
    }

    fn topology(&self) -> Result<Vec<TopologyRecord>, ProbeError> {
        Err(ProbeError::Os {
            capability: "logical processor topology",
            source: std::io::Error::from_raw_os_error(1),
        })
    }

    fn online_processors(&self) -> Result<u32, ProbeError> {
        Err(ProbeError::InvalidValue {
            capability: "online processor count",
            value: -1,
        })
    }

    fn hardware_concurrency(&self) -> Result<u32, ProbeError> {
        Err(ProbeError::Os {
            capability: "hardware concurrency",
            source: std::io::Error::from_raw_os_error(1),
        })
    }
}

#[test]
fn test_failing_syscalls_degrade_like_missing_ones() {
    let (info, status) = probe_detailed_with(&FailingPlatform);
    assert_eq!(info.core_count(), 1);
    assert_eq!(info.thread_count(), 1);
    assert_eq!(info.affinity_mask(), 0);
    assert_eq!(status.topology_source, TopologySource::Default);
}

#[test]
fn test_native_probe_from_many_threads() {
    let (expected, _) = probe();

    let handles: Vec<_> = (0..4).map(|_| std::thread::spawn(probe)).collect();
    for handle in handles {
        let (info, _) = handle.join().unwrap();
        assert_eq!(info.features(), expected.features());
        assert_eq!(info.core_count(), expected.core_count());
        assert_eq!(info.thread_count(), expected.thread_count());
    }
}
