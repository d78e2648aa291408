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

//! Device limits relevant to scratch buffer sizing.

/// Limits reported by a [`GraphicsDevice`](crate::renderer::GraphicsDevice).
///
/// Scratch buffer managers cap their buffer size to the smaller of their
/// configured budget and the matching limit reported here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Largest uniform buffer the device accepts, in bytes.
    pub maximum_uniform_buffer_size: u32,
    /// Largest texture buffer the device accepts, in bytes.
    pub maximum_texture_buffer_size: u32,
    /// Largest indirect argument buffer the device accepts, in bytes.
    pub maximum_indirect_buffer_size: u32,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            maximum_uniform_buffer_size: 64 * 1024,
            maximum_texture_buffer_size: 128 * 1024 * 1024,
            maximum_indirect_buffer_size: 128 * 1024 * 1024,
        }
    }
}
