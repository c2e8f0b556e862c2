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
//! Instruction-set feature flags
//!
//! A closed enumeration of the extensions the engine cares about and a
//! fixed-width bitset keyed by it.

use std::fmt;

use bitflags::bitflags;

/// Instruction-set extension (or topology trait) reported by the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CpuFeature {
    /// MMX integer SIMD
    Mmx,
    /// AMD 3DNow!
    ThreeDNow,
    /// PowerPC AltiVec / VMX
    AltiVec,
    /// SSE (Streaming SIMD Extensions)
    Sse,
    /// SSE2
    Sse2,
    /// SSE3
    Sse3,
    /// SSE4.1
    Sse41,
    /// SSE4.2
    Sse42,
    /// AVX (Advanced Vector Extensions)
    Avx,
    /// AVX2
    Avx2,
    /// More logical threads than physical cores are visible
    HyperThreading,
}

impl CpuFeature {
    /// Every member of the enumeration
    pub const ALL: [CpuFeature; 11] = [
        CpuFeature::Mmx,
        CpuFeature::ThreeDNow,
        CpuFeature::AltiVec,
        CpuFeature::Sse,
        CpuFeature::Sse2,
        CpuFeature::Sse3,
        CpuFeature::Sse41,
        CpuFeature::Sse42,
        CpuFeature::Avx,
        CpuFeature::Avx2,
        CpuFeature::HyperThreading,
    ];

    /// The members that are queried from the feature-detection facility.
    ///
    /// HyperThreading is derived from topology instead.
    pub const INSTRUCTION_SETS: [CpuFeature; 10] = [
        CpuFeature::Mmx,
        CpuFeature::ThreeDNow,
        CpuFeature::AltiVec,
        CpuFeature::Sse,
        CpuFeature::Sse2,
        CpuFeature::Sse3,
        CpuFeature::Sse41,
        CpuFeature::Sse42,
        CpuFeature::Avx,
        CpuFeature::Avx2,
    ];

    /// Stable display name
    pub const fn name(self) -> &'static str {
        match self {
            CpuFeature::Mmx => "MMX",
            CpuFeature::ThreeDNow => "3DNow!",
            CpuFeature::AltiVec => "AltiVec",
            CpuFeature::Sse => "SSE",
            CpuFeature::Sse2 => "SSE2",
            CpuFeature::Sse3 => "SSE3",
            CpuFeature::Sse41 => "SSE4.1",
            CpuFeature::Sse42 => "SSE4.2",
            CpuFeature::Avx => "AVX",
            CpuFeature::Avx2 => "AVX2",
            CpuFeature::HyperThreading => "HT",
        }
    }

    /// The single-bit set for this feature
    pub const fn flag(self) -> FeatureSet {
        match self {
            CpuFeature::Mmx => FeatureSet::MMX,
            CpuFeature::ThreeDNow => FeatureSet::THREE_DNOW,
            CpuFeature::AltiVec => FeatureSet::ALTIVEC,
            CpuFeature::Sse => FeatureSet::SSE,
            CpuFeature::Sse2 => FeatureSet::SSE2,
            CpuFeature::Sse3 => FeatureSet::SSE3,
            CpuFeature::Sse41 => FeatureSet::SSE4_1,
            CpuFeature::Sse42 => FeatureSet::SSE4_2,
            CpuFeature::Avx => FeatureSet::AVX,
            CpuFeature::Avx2 => FeatureSet::AVX2,
            CpuFeature::HyperThreading => FeatureSet::HYPER_THREADING,
        }
    }
}

impl fmt::Display for CpuFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Fixed-width set of [`CpuFeature`]s
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FeatureSet: u16 {
        /// MMX
        const MMX = 1 << 0;
        /// 3DNow!
        const THREE_DNOW = 1 << 1;
        /// AltiVec
        const ALTIVEC = 1 << 2;
        /// SSE
        const SSE = 1 << 3;
        /// SSE2
        const SSE2 = 1 << 4;
        /// SSE3
        const SSE3 = 1 << 5;
        /// SSE4.1
        const SSE4_1 = 1 << 6;
        /// SSE4.2
        const SSE4_2 = 1 << 7;
        /// AVX
        const AVX = 1 << 8;
        /// AVX2
        const AVX2 = 1 << 9;
        /// HyperThreading present
        const HYPER_THREADING = 1 << 10;
    }
}

impl FeatureSet {
    /// Check membership of a single feature
    pub fn has(&self, feature: CpuFeature) -> bool {
        self.contains(feature.flag())
    }

    /// Number of features in the set
    pub fn len(&self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Iterate over the contained features in enumeration order
    pub fn features(&self) -> impl Iterator<Item = CpuFeature> + '_ {
        CpuFeature::ALL.into_iter().filter(move |f| self.has(*f))
    }
}

impl From<CpuFeature> for FeatureSet {
    fn from(feature: CpuFeature) -> Self {
        feature.flag()
    }
}

impl FromIterator<CpuFeature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = CpuFeature>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FeatureSet::empty(), |set, feature| set | feature.flag())
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, feature) in self.features().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(feature.name())?;
        }
        Ok(())
    }
}
