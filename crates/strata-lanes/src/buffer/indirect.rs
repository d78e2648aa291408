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

use super::{ScratchBufferKind, ScratchBufferManager, ScratchRegion};
use strata_core::renderer::{GraphicsDevice, ResourceError};

/// Scratch space for the indirect draw arguments of multi-draw batches.
#[derive(Debug)]
pub struct IndirectBufferManager {
    scratch: ScratchBufferManager,
}

impl IndirectBufferManager {
    pub fn new(device: &dyn GraphicsDevice, default_buffer_size: u32) -> Self {
        Self {
            scratch: ScratchBufferManager::new(device, ScratchBufferKind::Indirect, default_buffer_size),
        }
    }

    /// Size of every indirect buffer, and thus the largest reservation.
    pub fn maximum_indirect_buffer_size(&self) -> u32 {
        self.scratch.maximum_buffer_size()
    }

    /// Reserves room for `number_of_bytes` of argument records.
    ///
    /// See [`ScratchBufferManager::acquire`] for the reservation protocol.
    pub fn acquire(
        &mut self,
        device: &dyn GraphicsDevice,
        number_of_bytes: u32,
    ) -> Result<ScratchRegion, ResourceError> {
        self.scratch.acquire(device, number_of_bytes)
    }

    pub fn on_pre_command_buffer_execution(
        &mut self,
        device: &dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        self.scratch.on_pre_command_buffer_execution(device)
    }

    pub fn destroy(self, device: &dyn GraphicsDevice) {
        self.scratch.destroy(device);
    }

    pub fn scratch(&self) -> &ScratchBufferManager {
        &self.scratch
    }
}
