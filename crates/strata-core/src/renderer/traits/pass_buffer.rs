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

use crate::renderer::api::CommandBuffer;
use crate::renderer::compositor::CompositorContextData;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsDevice;
use std::fmt::Debug;

/// Per-pass uniform data owned by a material blueprint (view matrices, viewport, ...).
pub trait PassBufferManager: Debug {
    /// Uploads the pass data for the given compositor context.
    fn fill_buffer(
        &mut self,
        device: &dyn GraphicsDevice,
        context: &CompositorContextData,
    ) -> Result<(), ResourceError>;

    /// Records the commands binding the pass data for graphics work.
    fn fill_graphics_command_buffer(&self, command_buffer: &mut CommandBuffer);

    /// Records the commands binding the pass data for compute work.
    fn fill_compute_command_buffer(&self, command_buffer: &mut CommandBuffer);
}
