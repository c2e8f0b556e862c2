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
//! Platform capability errors
//!
//! These never escape the probe: the aggregation substitutes documented
//! defaults and logs the degradation instead.

use std::io;

use thiserror::Error;

/// Why a platform capability could not answer
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProbeError {
    /// The capability does not exist on this target
    #[error("{capability} is not supported on this platform")]
    Unsupported {
        /// Capability that was queried
        capability: &'static str,
    },

    /// The underlying system call failed
    #[error("{capability} query failed: {source}")]
    Os {
        /// Capability that was queried
        capability: &'static str,
        /// Error reported by the OS
        #[source]
        source: io::Error,
    },

    /// The OS answered with a value that cannot be a processor count or mask
    #[error("{capability} returned invalid value {value}")]
    InvalidValue {
        /// Capability that was queried
        capability: &'static str,
        /// Raw value
        value: i64,
    },
}

impl ProbeError {
    /// Shorthand for [`ProbeError::Unsupported`]
    pub fn unsupported(capability: &'static str) -> Self {
        ProbeError::Unsupported { capability }
    }

    /// Wrap the calling thread's last OS error
    pub fn last_os_error(capability: &'static str) -> Self {
        ProbeError::Os {
            capability,
            source: io::Error::last_os_error(),
        }
    }

    /// Whether this is a missing capability rather than a failed call
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ProbeError::Unsupported { .. })
    }
}
