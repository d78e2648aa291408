// Copyright 2025 eraflo
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

//! Defines the error type reported by graphics devices.
//!
//! The render queue itself does not recover from misuse: violated preconditions
//! are assertions. Only failures surfaced by the device travel as [`ResourceError`].

use super::api::{BufferId, ResourceGroupId};
use thiserror::Error;

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A generic resource could not be found.
    #[error("Resource not found with ID.")]
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    #[error("Invalid resource handle or ID.")]
    InvalidHandle,
    /// A write or unmap targeted a buffer that is not mapped.
    #[error("Buffer {0:?} is not mapped for writing.")]
    NotMapped(BufferId),
    /// A map targeted a buffer that is already mapped.
    #[error("Buffer {0:?} is already mapped.")]
    AlreadyMapped(BufferId),
    /// A resource group referenced by a command is unknown to the device.
    #[error("Unknown resource group {0:?}.")]
    UnknownResourceGroup(ResourceGroupId),
    /// An error originating from the specific graphics backend implementation.
    #[error("Backend-specific resource error: {0}")]
    BackendError(String),
    /// An attempt was made to access a resource out of its bounds.
    #[error("Resource access out of bounds.")]
    OutOfBounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_display() {
        assert_eq!(
            ResourceError::NotFound.to_string(),
            "Resource not found with ID."
        );
        assert_eq!(
            ResourceError::NotMapped(BufferId(3)).to_string(),
            "Buffer BufferId(3) is not mapped for writing."
        );
        assert_eq!(
            ResourceError::BackendError("device lost".to_string()).to_string(),
            "Backend-specific resource error: device lost"
        );
    }
}
