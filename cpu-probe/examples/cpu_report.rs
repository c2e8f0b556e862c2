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
//! Processor report example
//!
//! Probes the host CPU, prints what was found and how a worker pool would be
//! sized from it.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example cpu_report
//!
//! # Show the degradation log for capabilities this platform lacks
//! RUST_LOG=cpu_probe=debug cargo run --example cpu_report
//! ```

use cpu_probe::{probe_detailed, CpuFeature, ThreadPoolConfig, TopologySource};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== CPU Probe ===\n");

    let (info, status) = probe_detailed();

    println!("Instruction sets:");
    for feature in CpuFeature::INSTRUCTION_SETS {
        let mark = if info.has_feature(feature) { "yes" } else { "no" };
        println!("  {:<8} {}", feature.name(), mark);
    }
    println!();

    println!("Topology:");
    println!("  Physical cores:   {}", info.core_count());
    println!("  Logical threads:  {}", info.thread_count());
    println!("  Hyperthreading:   {}", info.is_hyperthreaded());
    let source = match status.topology_source {
        TopologySource::Enumerated => "per-core enumeration",
        TopologySource::OnlineCount => "online processor count",
        TopologySource::HardwareConcurrency => "hardware concurrency (no SMT assumed)",
        TopologySource::Default => "unknown (defaulted to 1)",
    };
    println!("  Source:           {}", source);
    println!();

    println!("Affinity:");
    if status.affinity_detected {
        println!("  Mask:             {:#x}", info.affinity_mask());
        println!("  Allowed CPUs:     {}", info.allowed_processor_count());
    } else {
        println!("  Mask:             unknown on this platform");
    }
    println!();

    println!("Worker pool sizing:");
    let all_threads = ThreadPoolConfig::new();
    let physical = ThreadPoolConfig::new().physical_cores_only();
    let reserved = ThreadPoolConfig::new().with_reserved_threads(1);
    println!("  All threads:      {}", all_threads.worker_count(&info));
    println!("  Physical cores:   {}", physical.worker_count(&info));
    println!("  One reserved:     {}", reserved.worker_count(&info));

    #[cfg(feature = "parallel")]
    {
        match cpu_probe::build_thread_pool(&info, &reserved) {
            Ok(pool) => println!("  Rayon pool:       {} workers", pool.current_num_threads()),
            Err(err) => println!("  Rayon pool:       failed ({err})"),
        }
    }

    println!();
    println!("Summary: {info}");
}
