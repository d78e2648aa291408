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

//! Serializable configuration of render queues and scratch buffer budgets.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default size of an indirect argument scratch buffer.
pub const DEFAULT_INDIRECT_BUFFER_SIZE: u32 = 128 * 1024;
/// Default size of a uniform instance scratch buffer.
pub const DEFAULT_UNIFORM_INSTANCE_BUFFER_SIZE: u32 = 64 * 1024;
/// Default size of the uniform companion buffer of the texture instance manager.
pub const DEFAULT_TEXTURE_INSTANCE_UNIFORM_BUFFER_SIZE: u32 = 64 * 1024;
/// Default size of a texture instance scratch buffer.
pub const DEFAULT_TEXTURE_INSTANCE_TEXTURE_BUFFER_SIZE: u32 = 512 * 1024;

/// Sizes of the scratch buffers, in bytes.
///
/// Each size is further capped by the matching device limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchBufferBudgets {
    pub indirect_buffer_size: u32,
    pub uniform_instance_buffer_size: u32,
    pub texture_instance_uniform_buffer_size: u32,
    pub texture_instance_texture_buffer_size: u32,
}

impl Default for ScratchBufferBudgets {
    fn default() -> Self {
        Self {
            indirect_buffer_size: DEFAULT_INDIRECT_BUFFER_SIZE,
            uniform_instance_buffer_size: DEFAULT_UNIFORM_INSTANCE_BUFFER_SIZE,
            texture_instance_uniform_buffer_size: DEFAULT_TEXTURE_INSTANCE_UNIFORM_BUFFER_SIZE,
            texture_instance_texture_buffer_size: DEFAULT_TEXTURE_INSTANCE_TEXTURE_BUFFER_SIZE,
        }
    }
}

impl ScratchBufferBudgets {
    /// Parses budgets from RON. Missing fields keep their defaults.
    pub fn from_ron_str(source: &str) -> anyhow::Result<Self> {
        ron::from_str(source).context("Failed to parse scratch buffer budgets")
    }

    /// Loads budgets from a RON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scratch buffer budgets from {}", path.display()))?;
        Self::from_ron_str(&source)
    }
}

/// Configuration of one [`RenderQueue`](crate::RenderQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderQueueDescriptor {
    /// Lowest render queue index accepted, inclusive.
    pub minimum_render_queue_index: u8,
    /// Highest render queue index accepted, inclusive.
    pub maximum_render_queue_index: u8,
    /// Bind position-only vertex arrays, for depth and shadow passes.
    pub position_only_pass: bool,
    /// Sort back to front instead of front to back.
    pub transparent_pass: bool,
    /// Sort each bucket by sorting key before emission.
    pub do_sort: bool,
}

impl Default for RenderQueueDescriptor {
    fn default() -> Self {
        Self {
            minimum_render_queue_index: 0,
            maximum_render_queue_index: u8::MAX,
            position_only_pass: false,
            transparent_pass: false,
            do_sort: true,
        }
    }
}

impl RenderQueueDescriptor {
    /// Parses a descriptor from RON. Missing fields keep their defaults.
    pub fn from_ron_str(source: &str) -> anyhow::Result<Self> {
        let descriptor: Self =
            ron::from_str(source).context("Failed to parse render queue descriptor")?;
        anyhow::ensure!(
            descriptor.minimum_render_queue_index <= descriptor.maximum_render_queue_index,
            "Render queue index range {}..={} is empty",
            descriptor.minimum_render_queue_index,
            descriptor.maximum_render_queue_index
        );
        Ok(descriptor)
    }

    /// Loads a descriptor from a RON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read render queue descriptor from {}", path.display()))?;
        Self::from_ron_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budgets_default_missing_fields() {
        let budgets = ScratchBufferBudgets::from_ron_str("(indirect_buffer_size: 4096)").unwrap();
        assert_eq!(budgets.indirect_buffer_size, 4096);
        assert_eq!(
            budgets.texture_instance_texture_buffer_size,
            DEFAULT_TEXTURE_INSTANCE_TEXTURE_BUFFER_SIZE
        );
    }

    #[test]
    fn test_descriptor_parses_transparent_pass() {
        let descriptor = RenderQueueDescriptor::from_ron_str(
            "(minimum_render_queue_index: 200, maximum_render_queue_index: 254, transparent_pass: true)",
        )
        .unwrap();
        assert_eq!(descriptor.minimum_render_queue_index, 200);
        assert!(descriptor.transparent_pass);
        assert!(descriptor.do_sort);
    }

    #[test]
    fn test_descriptor_rejects_empty_range() {
        let result = RenderQueueDescriptor::from_ron_str(
            "(minimum_render_queue_index: 10, maximum_render_queue_index: 9)",
        );
        assert!(result.is_err());
    }
}
