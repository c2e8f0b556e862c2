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
//! Scripted platform shared by the integration tests

#![allow(dead_code)]

use cpu_probe::{CpuFeature, FeatureSet, Platform, ProbeError, TopologyRecord};

/// Platform whose every answer is set up front
#[derive(Debug, Clone, Default)]
pub struct StubPlatform {
    pub features: FeatureSet,
    pub affinity: Option<usize>,
    pub topology: Option<Vec<TopologyRecord>>,
    pub online: Option<u32>,
    pub concurrency: Option<u32>,
}

impl StubPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(mut self, features: &[CpuFeature]) -> Self {
        self.features = features.iter().copied().collect();
        self
    }

    pub fn with_affinity(mut self, mask: usize) -> Self {
        self.affinity = Some(mask);
        self
    }

    pub fn with_topology(mut self, records: Vec<TopologyRecord>) -> Self {
        self.topology = Some(records);
        self
    }

    pub fn with_online(mut self, count: u32) -> Self {
        self.online = Some(count);
        self
    }

    pub fn with_concurrency(mut self, count: u32) -> Self {
        self.concurrency = Some(count);
        self
    }
}

impl Platform for StubPlatform {
    fn has_feature(&self, feature: CpuFeature) -> bool {
        self.features.has(feature)
    }

    fn affinity_mask(&self) -> Result<usize, ProbeError> {
        self.affinity
            .ok_or_else(|| ProbeError::unsupported("process affinity mask"))
    }

    fn topology(&self) -> Result<Vec<TopologyRecord>, ProbeError> {
        self.topology
            .clone()
            .ok_or_else(|| ProbeError::unsupported("logical processor topology"))
    }

    fn online_processors(&self) -> Result<u32, ProbeError> {
        self.online
            .ok_or_else(|| ProbeError::unsupported("online processor count"))
    }

    fn hardware_concurrency(&self) -> Result<u32, ProbeError> {
        self.concurrency
            .ok_or_else(|| ProbeError::unsupported("hardware concurrency"))
    }
}
