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

use crate::buffer::{
    IndirectBufferManager, InstanceFill, TextureInstanceBufferManager, UniformInstanceBufferManager,
};
use crate::config::ScratchBufferBudgets;
use strata_core::renderer::{CommandBuffer, CompositorContextData, GraphicsDevice, ResourceError};
use strata_data::InstanceBufferKind;

/// The scratch buffer managers shared by every render queue of a renderer.
///
/// Queues filling within one frame append to the same buffers;
/// [`on_pre_command_buffer_execution`](Self::on_pre_command_buffer_execution)
/// recycles all of them once the frame's command buffer is submitted.
#[derive(Debug)]
pub struct RenderQueueResources {
    indirect_buffer_manager: IndirectBufferManager,
    uniform_instance_buffer_manager: UniformInstanceBufferManager,
    texture_instance_buffer_manager: TextureInstanceBufferManager,
}

impl RenderQueueResources {
    pub fn new(device: &dyn GraphicsDevice, budgets: &ScratchBufferBudgets) -> Self {
        log::debug!("RenderQueueResources: creating scratch buffer managers with {:?}", budgets);
        Self {
            indirect_buffer_manager: IndirectBufferManager::new(device, budgets.indirect_buffer_size),
            uniform_instance_buffer_manager: UniformInstanceBufferManager::new(
                device,
                budgets.uniform_instance_buffer_size,
            ),
            texture_instance_buffer_manager: TextureInstanceBufferManager::new(
                device,
                budgets.texture_instance_uniform_buffer_size,
                budgets.texture_instance_texture_buffer_size,
            ),
        }
    }

    pub fn indirect_buffer_manager(&self) -> &IndirectBufferManager {
        &self.indirect_buffer_manager
    }

    pub fn indirect_buffer_manager_mut(&mut self) -> &mut IndirectBufferManager {
        &mut self.indirect_buffer_manager
    }

    pub fn uniform_instance_buffer_manager(&self) -> &UniformInstanceBufferManager {
        &self.uniform_instance_buffer_manager
    }

    pub fn texture_instance_buffer_manager(&self) -> &TextureInstanceBufferManager {
        &self.texture_instance_buffer_manager
    }

    pub(crate) fn startup_instance_buffer_filling(
        &mut self,
        device: &dyn GraphicsDevice,
        fill: &InstanceFill<'_>,
        context: &mut CompositorContextData,
        command_buffer: &mut CommandBuffer,
    ) -> Result<(), ResourceError> {
        match instance_buffer_kind(fill) {
            Some(InstanceBufferKind::Uniform) => self
                .uniform_instance_buffer_manager
                .startup_buffer_filling(device, fill, context, command_buffer),
            Some(InstanceBufferKind::Texture) => self
                .texture_instance_buffer_manager
                .startup_buffer_filling(device, fill, context, command_buffer),
            None => Ok(()),
        }
    }

    pub(crate) fn fill_instance_buffer(
        &mut self,
        device: &dyn GraphicsDevice,
        fill: &InstanceFill<'_>,
        context: &mut CompositorContextData,
        command_buffer: &mut CommandBuffer,
    ) -> Result<u32, ResourceError> {
        match instance_buffer_kind(fill) {
            Some(InstanceBufferKind::Uniform) => self
                .uniform_instance_buffer_manager
                .fill_buffer(device, fill, context, command_buffer),
            Some(InstanceBufferKind::Texture) => self
                .texture_instance_buffer_manager
                .fill_buffer(device, fill, context, command_buffer),
            None => Ok(0),
        }
    }

    /// Unmaps every scratch buffer and makes all of them reusable.
    pub fn on_pre_command_buffer_execution(
        &mut self,
        device: &dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        self.indirect_buffer_manager
            .on_pre_command_buffer_execution(device)?;
        self.uniform_instance_buffer_manager
            .on_pre_command_buffer_execution(device)?;
        self.texture_instance_buffer_manager
            .on_pre_command_buffer_execution(device)
    }

    /// Releases every buffer and resource group to the device.
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        self.indirect_buffer_manager.destroy(device);
        self.uniform_instance_buffer_manager.destroy(device);
        self.texture_instance_buffer_manager.destroy(device);
    }
}

fn instance_buffer_kind(fill: &InstanceFill<'_>) -> Option<InstanceBufferKind> {
    fill.blueprint.instance_buffer().map(|descriptor| descriptor.kind)
}
