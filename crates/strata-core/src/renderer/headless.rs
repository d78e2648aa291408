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

//! Headless graphics device for testing and tooling.
//!
//! This device performs no GPU work. Buffers are plain byte vectors, so written
//! scratch data can be inspected after a frame. Mapping rules are enforced the
//! same way a real backend would reject misuse.

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsDevice;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct HeadlessBuffer {
    label: Option<String>,
    usage: BufferUsage,
    data: Vec<u8>,
    mapped: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: usize,
    created_buffers: usize,
    buffers: HashMap<BufferId, HeadlessBuffer>,
    resource_groups: HashMap<ResourceGroupId, Vec<ResourceGroupResource>>,
}

impl HeadlessState {
    fn allocate_id(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn buffer_mut(&mut self, id: BufferId) -> Result<&mut HeadlessBuffer, ResourceError> {
        self.buffers.get_mut(&id).ok_or(ResourceError::InvalidHandle)
    }
}

/// An in-memory [`GraphicsDevice`].
#[derive(Debug, Default)]
pub struct HeadlessGraphicsDevice {
    capabilities: DeviceCapabilities,
    state: Mutex<HeadlessState>,
}

impl HeadlessGraphicsDevice {
    /// Creates a device reporting the default capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a device reporting custom capabilities.
    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            state: Mutex::default(),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, HeadlessState>, ResourceError> {
        self.state
            .lock()
            .map_err(|_| ResourceError::BackendError("headless device state poisoned".into()))
    }

    /// A copy of the current contents of a buffer.
    pub fn buffer_contents(&self, id: BufferId) -> Option<Vec<u8>> {
        let state = self.state().ok()?;
        state.buffers.get(&id).map(|buffer| buffer.data.clone())
    }

    /// The debug label a buffer was created with.
    pub fn buffer_label(&self, id: BufferId) -> Option<String> {
        let state = self.state().ok()?;
        state.buffers.get(&id).and_then(|buffer| buffer.label.clone())
    }

    /// The usage flags a buffer was created with.
    pub fn buffer_usage(&self, id: BufferId) -> Option<BufferUsage> {
        let state = self.state().ok()?;
        state.buffers.get(&id).map(|buffer| buffer.usage)
    }

    /// Whether a buffer is currently mapped.
    pub fn is_mapped(&self, id: BufferId) -> bool {
        self.state()
            .ok()
            .and_then(|state| state.buffers.get(&id).map(|buffer| buffer.mapped))
            .unwrap_or(false)
    }

    /// Number of buffers alive on the device.
    pub fn live_buffer_count(&self) -> usize {
        self.state().map(|state| state.buffers.len()).unwrap_or(0)
    }

    /// Number of buffers ever created on the device.
    pub fn created_buffer_count(&self) -> usize {
        self.state().map(|state| state.created_buffers).unwrap_or(0)
    }

    /// Number of resource groups alive on the device.
    pub fn live_resource_group_count(&self) -> usize {
        self.state()
            .map(|state| state.resource_groups.len())
            .unwrap_or(0)
    }

    /// The resources aggregated by a resource group.
    pub fn resource_group_resources(&self, id: ResourceGroupId) -> Option<Vec<ResourceGroupResource>> {
        let state = self.state().ok()?;
        state.resource_groups.get(&id).cloned()
    }
}

impl GraphicsDevice for HeadlessGraphicsDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let size = usize::try_from(descriptor.size).map_err(|_| ResourceError::OutOfBounds)?;
        let mut state = self.state()?;
        let id = BufferId(state.allocate_id());
        log::trace!(
            "HeadlessGraphicsDevice: creating buffer {:?} (size: {})",
            descriptor.label,
            descriptor.size
        );
        state.buffers.insert(
            id,
            HeadlessBuffer {
                label: descriptor.label.as_ref().map(|label| label.to_string()),
                usage: descriptor.usage,
                data: vec![0; size],
                mapped: false,
            },
        );
        state.created_buffers += 1;
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        if state.buffer_mut(id)?.mapped {
            return Err(ResourceError::BackendError(format!(
                "buffer {id:?} destroyed while mapped"
            )));
        }
        state.buffers.remove(&id);
        Ok(())
    }

    fn map_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        let buffer = state.buffer_mut(id)?;
        if !buffer.usage.contains(BufferUsage::MAP_WRITE) {
            return Err(ResourceError::BackendError(format!(
                "buffer {id:?} was not created with MAP_WRITE"
            )));
        }
        if buffer.mapped {
            return Err(ResourceError::AlreadyMapped(id));
        }
        buffer.mapped = true;
        Ok(())
    }

    fn write_mapped_buffer(
        &self,
        id: BufferId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        let buffer = state.buffer_mut(id)?;
        if !buffer.mapped {
            return Err(ResourceError::NotMapped(id));
        }
        let start = usize::try_from(offset).map_err(|_| ResourceError::OutOfBounds)?;
        let end = start
            .checked_add(data.len())
            .filter(|end| *end <= buffer.data.len())
            .ok_or(ResourceError::OutOfBounds)?;
        buffer.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn unmap_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        let buffer = state.buffer_mut(id)?;
        if !buffer.mapped {
            return Err(ResourceError::NotMapped(id));
        }
        buffer.mapped = false;
        Ok(())
    }

    fn create_resource_group(
        &self,
        descriptor: &ResourceGroupDescriptor,
    ) -> Result<ResourceGroupId, ResourceError> {
        let mut state = self.state()?;
        for resource in descriptor.resources {
            let (ResourceGroupResource::UniformBuffer(buffer)
            | ResourceGroupResource::TextureBuffer(buffer)) = resource;
            if !state.buffers.contains_key(buffer) {
                return Err(ResourceError::InvalidHandle);
            }
        }
        let id = ResourceGroupId(state.allocate_id());
        state
            .resource_groups
            .insert(id, descriptor.resources.to_vec());
        Ok(id)
    }

    fn destroy_resource_group(&self, id: ResourceGroupId) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        state
            .resource_groups
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::UnknownResourceGroup(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn scratch_descriptor(size: u64) -> BufferDescriptor<'static> {
        BufferDescriptor {
            label: Some(Cow::Borrowed("scratch")),
            size,
            usage: BufferUsage::MAP_WRITE | BufferUsage::UNIFORM,
        }
    }

    #[test]
    fn test_write_requires_mapping() {
        let device = HeadlessGraphicsDevice::new();
        let buffer = device.create_buffer(&scratch_descriptor(16)).unwrap();

        assert!(matches!(
            device.write_mapped_buffer(buffer, 0, &[1, 2, 3, 4]),
            Err(ResourceError::NotMapped(_))
        ));

        device.map_buffer(buffer).unwrap();
        assert!(matches!(
            device.map_buffer(buffer),
            Err(ResourceError::AlreadyMapped(_))
        ));
        device.write_mapped_buffer(buffer, 4, &[1, 2, 3, 4]).unwrap();
        device.unmap_buffer(buffer).unwrap();

        let contents = device.buffer_contents(buffer).unwrap();
        assert_eq!(&contents[4..8], &[1, 2, 3, 4]);
        assert_eq!(device.buffer_label(buffer).as_deref(), Some("scratch"));
    }

    #[test]
    fn test_out_of_bounds_write_is_rejected() {
        let device = HeadlessGraphicsDevice::new();
        let buffer = device.create_buffer(&scratch_descriptor(8)).unwrap();
        device.map_buffer(buffer).unwrap();

        assert!(matches!(
            device.write_mapped_buffer(buffer, 6, &[0; 4]),
            Err(ResourceError::OutOfBounds)
        ));
    }

    #[test]
    fn test_mapped_buffer_cannot_be_destroyed() {
        let device = HeadlessGraphicsDevice::new();
        let buffer = device.create_buffer(&scratch_descriptor(8)).unwrap();
        device.map_buffer(buffer).unwrap();

        assert!(device.destroy_buffer(buffer).is_err());
        device.unmap_buffer(buffer).unwrap();
        device.destroy_buffer(buffer).unwrap();
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.created_buffer_count(), 1);
    }

    #[test]
    fn test_resource_groups_track_resources() {
        let device = HeadlessGraphicsDevice::new();
        let buffer = device.create_buffer(&scratch_descriptor(8)).unwrap();
        let resources = [ResourceGroupResource::UniformBuffer(buffer)];
        let group = device
            .create_resource_group(&ResourceGroupDescriptor {
                label: None,
                root_parameter_index: 0,
                resources: &resources,
            })
            .unwrap();

        assert_eq!(
            device.resource_group_resources(group),
            Some(resources.to_vec())
        );
        device.destroy_resource_group(group).unwrap();
        assert_eq!(device.live_resource_group_count(), 0);
    }
}
