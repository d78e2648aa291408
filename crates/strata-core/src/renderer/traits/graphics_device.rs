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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The opaque resource layer the render queue allocates scratch memory through.
///
/// Mapping is explicit and strictly paired: a buffer is mapped once, written
/// any number of times through [`write_mapped_buffer`](Self::write_mapped_buffer),
/// then unmapped before the command buffer referencing it is executed.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Returns the device limits used to cap scratch buffer sizes.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Creates a new GPU buffer.
    /// ## Arguments
    /// * `descriptor` - A reference to a `BufferDescriptor` containing the buffer configuration.
    /// ## Returns
    /// A `Result` containing the ID of the created buffer or an error if the creation fails.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Destroys a GPU buffer. The buffer must not be mapped.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Maps a buffer for CPU writes.
    /// ## Errors
    /// * `ResourceError::AlreadyMapped` - If the buffer is mapped already.
    fn map_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Writes `data` into a mapped buffer at `offset`.
    /// ## Arguments
    /// * `id` - The ID of the buffer to write to.
    /// * `offset` - The byte offset in the buffer where the data will be written.
    /// * `data` - A slice of bytes containing the data to be written.
    /// ## Errors
    /// * `ResourceError::NotMapped` - If the buffer is not mapped.
    /// * `ResourceError::OutOfBounds` - If the write exceeds the buffer size.
    fn write_mapped_buffer(&self, id: BufferId, offset: u64, data: &[u8])
        -> Result<(), ResourceError>;

    /// Unmaps a previously mapped buffer.
    fn unmap_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Creates a resource group aggregating the given resources.
    fn create_resource_group(
        &self,
        descriptor: &ResourceGroupDescriptor,
    ) -> Result<ResourceGroupId, ResourceError>;

    /// Destroys a resource group.
    fn destroy_resource_group(&self, id: ResourceGroupId) -> Result<(), ResourceError>;
}
