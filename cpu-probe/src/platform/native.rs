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
//! Live OS and hardware queries
//!
//! # Platform Support
//!
//! | Capability | Source |
//! |---|---|
//! | features (x86, x86_64) | CPUID via `raw-cpuid`; AVX/AVX2 also require OS XSAVE support |
//! | features (PowerPC) | AltiVec from the compile-time target feature |
//! | affinity | `sched_getaffinity` (Linux, Android), `GetProcessAffinityMask` (Windows) |
//! | topology | `GetLogicalProcessorInformation` (Windows) |
//! | online processors | `sysconf(_SC_NPROCESSORS_ONLN)` (Unix) |
//! | hardware concurrency | `std::thread::available_parallelism` |
//!
//! Everything else reports [`ProbeError::Unsupported`].

use super::{Platform, TopologyRecord};
use super::{AFFINITY, HARDWARE_CONCURRENCY, ONLINE_PROCESSORS, TOPOLOGY};
use crate::error::ProbeError;
use crate::feature::CpuFeature;

/// The host machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativePlatform;

impl NativePlatform {
    /// Create a handle to the host machine
    pub fn new() -> Self {
        NativePlatform
    }
}

impl Platform for NativePlatform {
    fn has_feature(&self, feature: CpuFeature) -> bool {
        has_feature_impl(feature)
    }

    fn affinity_mask(&self) -> Result<usize, ProbeError> {
        affinity_mask_impl()
    }

    fn topology(&self) -> Result<Vec<TopologyRecord>, ProbeError> {
        topology_impl()
    }

    fn online_processors(&self) -> Result<u32, ProbeError> {
        online_processors_impl()
    }

    fn hardware_concurrency(&self) -> Result<u32, ProbeError> {
        let threads = std::thread::available_parallelism().map_err(|source| ProbeError::Os {
            capability: HARDWARE_CONCURRENCY,
            source,
        })?;
        Ok(u32::try_from(threads.get()).unwrap_or(u32::MAX))
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn has_feature_impl(feature: CpuFeature) -> bool {
    use raw_cpuid::CpuId;

    let cpuid = CpuId::new();

    match feature {
        CpuFeature::Mmx => cpuid.get_feature_info().map_or(false, |info| info.has_mmx()),
        CpuFeature::Sse => cpuid.get_feature_info().map_or(false, |info| info.has_sse()),
        CpuFeature::Sse2 => cpuid.get_feature_info().map_or(false, |info| info.has_sse2()),
        CpuFeature::Sse3 => cpuid.get_feature_info().map_or(false, |info| info.has_sse3()),
        CpuFeature::Sse41 => cpuid.get_feature_info().map_or(false, |info| info.has_sse41()),
        CpuFeature::Sse42 => cpuid.get_feature_info().map_or(false, |info| info.has_sse42()),
        CpuFeature::ThreeDNow => cpuid
            .get_extended_processor_and_feature_identifiers()
            .map_or(false, |info| info.has_3dnow()),
        // CPUID alone says nothing about whether the OS saves YMM state
        CpuFeature::Avx => {
            cpuid.get_feature_info().map_or(false, |info| info.has_avx())
                && std::arch::is_x86_feature_detected!("avx")
        }
        CpuFeature::Avx2 => {
            cpuid
                .get_extended_feature_info()
                .map_or(false, |info| info.has_avx2())
                && std::arch::is_x86_feature_detected!("avx2")
        }
        CpuFeature::AltiVec | CpuFeature::HyperThreading => false,
    }
}

#[cfg(any(target_arch = "powerpc", target_arch = "powerpc64"))]
fn has_feature_impl(feature: CpuFeature) -> bool {
    matches!(feature, CpuFeature::AltiVec) && cfg!(target_feature = "altivec")
}

#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "powerpc",
    target_arch = "powerpc64"
)))]
fn has_feature_impl(_feature: CpuFeature) -> bool {
    false
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn affinity_mask_impl() -> Result<usize, ProbeError> {
    use std::mem;

    // SAFETY: cpu_set_t is plain data and all-zero is the empty set.
    let mut set: libc::cpu_set_t = unsafe { mem::zeroed() };
    // SAFETY: `set` is a valid, writable cpu_set_t of the size passed.
    let rc = unsafe { libc::sched_getaffinity(0, mem::size_of::<libc::cpu_set_t>(), &mut set) };
    if rc != 0 {
        return Err(ProbeError::last_os_error(AFFINITY));
    }

    // Processors past the mask width are not representable.
    let mask = (0..usize::BITS as usize)
        // SAFETY: `cpu` is below CPU_SETSIZE and `set` was filled above.
        .filter(|&cpu| unsafe { libc::CPU_ISSET(cpu, &set) })
        .fold(0usize, |mask, cpu| mask | (1usize << cpu));
    Ok(mask)
}

#[cfg(windows)]
fn affinity_mask_impl() -> Result<usize, ProbeError> {
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, GetProcessAffinityMask};

    let mut process_mask: usize = 0;
    let mut system_mask: usize = 0;
    // SAFETY: both out-pointers reference live locals; the pseudo-handle
    // returned by GetCurrentProcess needs no cleanup.
    let ok = unsafe {
        GetProcessAffinityMask(GetCurrentProcess(), &mut process_mask, &mut system_mask)
    };
    if ok == 0 {
        return Err(ProbeError::last_os_error(AFFINITY));
    }
    Ok(process_mask)
}

#[cfg(not(any(target_os = "linux", target_os = "android", windows)))]
fn affinity_mask_impl() -> Result<usize, ProbeError> {
    Err(ProbeError::unsupported(AFFINITY))
}

#[cfg(windows)]
fn topology_impl() -> Result<Vec<TopologyRecord>, ProbeError> {
    use super::Relationship;
    use std::{mem, ptr};
    use windows_sys::Win32::System::SystemInformation::{
        GetLogicalProcessorInformation, RelationCache, RelationNumaNode, RelationProcessorCore,
        RelationProcessorPackage, SYSTEM_LOGICAL_PROCESSOR_INFORMATION,
    };

    let entry_size = mem::size_of::<SYSTEM_LOGICAL_PROCESSOR_INFORMATION>();

    // First call only reports the required buffer length.
    let mut length: u32 = 0;
    // SAFETY: a null buffer with zero length is the documented size query.
    unsafe { GetLogicalProcessorInformation(ptr::null_mut(), &mut length) };
    if length == 0 {
        return Err(ProbeError::last_os_error(TOPOLOGY));
    }

    let capacity = length as usize / entry_size;
    // SAFETY: the struct is plain data; zeroed entries are valid.
    let mut buffer: Vec<SYSTEM_LOGICAL_PROCESSOR_INFORMATION> =
        vec![unsafe { mem::zeroed() }; capacity];
    let mut length = (capacity * entry_size) as u32;
    // SAFETY: `buffer` holds `length` writable bytes.
    let ok = unsafe { GetLogicalProcessorInformation(buffer.as_mut_ptr(), &mut length) };
    if ok == 0 {
        return Err(ProbeError::last_os_error(TOPOLOGY));
    }

    let filled = (length as usize / entry_size).min(buffer.len());
    let records = buffer[..filled]
        .iter()
        .map(|entry| {
            let relationship = match entry.Relationship {
                RelationProcessorCore => Relationship::ProcessorCore,
                RelationNumaNode => Relationship::NumaNode,
                RelationCache => Relationship::Cache,
                RelationProcessorPackage => Relationship::ProcessorPackage,
                _ => Relationship::Other,
            };
            TopologyRecord {
                relationship,
                processor_mask: entry.ProcessorMask,
            }
        })
        .collect();
    Ok(records)
}

#[cfg(not(windows))]
fn topology_impl() -> Result<Vec<TopologyRecord>, ProbeError> {
    Err(ProbeError::unsupported(TOPOLOGY))
}

#[cfg(unix)]
fn online_processors_impl() -> Result<u32, ProbeError> {
    // SAFETY: sysconf has no memory-safety preconditions.
    let online = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if online < 0 {
        return Err(ProbeError::last_os_error(ONLINE_PROCESSORS));
    }
    match u32::try_from(online) {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ProbeError::InvalidValue {
            capability: ONLINE_PROCESSORS,
            value: online as i64,
        }),
    }
}

#[cfg(not(unix))]
fn online_processors_impl() -> Result<u32, ProbeError> {
    Err(ProbeError::unsupported(ONLINE_PROCESSORS))
}
