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
//! Thread pool sizing
//!
//! Turns a [`ProcessorInfo`] into a worker count and, with the `parallel`
//! feature, into a configured Rayon thread pool.

use crate::info::ProcessorInfo;

#[cfg(feature = "parallel")]
use tracing::debug;

/// Configuration for sizing a worker pool from probed topology
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Size from physical cores instead of logical threads
    pub use_physical_cores: bool,
    /// Threads left free for the caller (main loop, I/O, ...)
    pub reserved_threads: usize,
    /// Lower bound on the worker count
    pub min_threads: usize,
    /// Upper bound on the worker count; wins over `min_threads`
    pub max_threads: Option<usize>,
    /// Prefix for worker thread names
    pub thread_name_prefix: Option<String>,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        ThreadPoolConfig {
            use_physical_cores: false,
            reserved_threads: 0,
            min_threads: 1,
            max_threads: None,
            thread_name_prefix: None,
        }
    }
}

impl ThreadPoolConfig {
    /// Create a configuration using every logical thread
    pub fn new() -> Self {
        Self::default()
    }

    /// Size from physical cores
    pub fn physical_cores_only(mut self) -> Self {
        self.use_physical_cores = true;
        self
    }

    /// Leave `count` threads for the caller
    pub fn with_reserved_threads(mut self, count: usize) -> Self {
        self.reserved_threads = count;
        self
    }

    /// Set the lower bound on the worker count
    pub fn with_min_threads(mut self, count: usize) -> Self {
        assert!(count >= 1, "Minimum thread count must be at least 1");
        self.min_threads = count;
        self
    }

    /// Set the upper bound on the worker count
    pub fn with_max_threads(mut self, count: usize) -> Self {
        assert!(count >= 1, "Maximum thread count must be at least 1");
        self.max_threads = Some(count);
        self
    }

    /// Name worker threads `"{prefix}-{index}"`
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = Some(prefix.into());
        self
    }

    /// Number of workers for the given processor
    ///
    /// Never less than 1.
    pub fn worker_count(&self, info: &ProcessorInfo) -> usize {
        let base = if self.use_physical_cores {
            info.core_count()
        } else {
            info.thread_count()
        };

        let mut count = (base as usize)
            .saturating_sub(self.reserved_threads)
            .max(self.min_threads);
        if let Some(max) = self.max_threads {
            count = count.min(max);
        }
        count.max(1)
    }
}

/// Build a Rayon thread pool sized for the given processor
///
/// # Errors
///
/// Returns the Rayon error if the worker threads cannot be spawned.
#[cfg(feature = "parallel")]
pub fn build_thread_pool(
    info: &ProcessorInfo,
    config: &ThreadPoolConfig,
) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    let workers = config.worker_count(info);
    debug!(
        workers,
        cores = info.core_count(),
        threads = info.thread_count(),
        "building thread pool"
    );

    let mut builder = rayon::ThreadPoolBuilder::new().num_threads(workers);
    if let Some(prefix) = config.thread_name_prefix.clone() {
        builder = builder.thread_name(move |index| format!("{prefix}-{index}"));
    }
    builder.build()
}
