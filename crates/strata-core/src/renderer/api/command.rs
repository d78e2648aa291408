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

//! Ordered command records and the native indirect argument layouts.
//!
//! A [`CommandBuffer`] is a plain list of [`Command`] records. The render queue only
//! appends to it; a backend later translates the records into API calls.

use super::buffer::{BufferId, VertexArrayId};
use super::pipeline::{ComputePipelineStateId, GraphicsPipelineStateId};
use super::resource_group::ResourceGroupId;
use bytemuck::{Pod, Zeroable};

/// Arguments of a non-indexed instanced draw.
///
/// The layout matches the native "draw instanced arguments" structure, so values
/// can be copied byte for byte into a mapped indirect buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DrawArguments {
    /// Number of vertices per instance.
    pub vertex_count_per_instance: u32,
    /// Number of instances.
    pub instance_count: u32,
    /// First vertex to read.
    pub start_vertex_location: u32,
    /// Value added to the instance index before reading per-instance data.
    pub start_instance_location: u32,
}

/// Arguments of an indexed instanced draw.
///
/// The layout matches the native "draw indexed instanced arguments" structure.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    /// Number of indices per instance.
    pub index_count_per_instance: u32,
    /// Number of instances.
    pub instance_count: u32,
    /// First index to read.
    pub start_index_location: u32,
    /// Value added to each index before reading a vertex.
    pub base_vertex_location: i32,
    /// Value added to the instance index before reading per-instance data.
    pub start_instance_location: u32,
}

impl DrawArguments {
    /// Size of one argument record in bytes.
    pub const SIZE: u32 = std::mem::size_of::<Self>() as u32;
}

impl DrawIndexedArguments {
    /// Size of one argument record in bytes.
    pub const SIZE: u32 = std::mem::size_of::<Self>() as u32;
}

/// Where the arguments of a draw come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSource<A> {
    /// Arguments are embedded in the command record.
    Direct(A),
    /// Arguments are read by the GPU from an indirect buffer.
    Indirect {
        /// The indirect buffer.
        buffer: BufferId,
        /// Byte offset of the first argument record.
        offset: u32,
    },
}

/// One command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Binds a graphics pipeline state.
    SetGraphicsPipelineState(GraphicsPipelineStateId),
    /// Binds a compute pipeline state.
    SetComputePipelineState(ComputePipelineStateId),
    /// Binds a vertex array.
    SetGraphicsVertexArray(VertexArrayId),
    /// Binds a resource group for graphics work.
    SetGraphicsResourceGroup {
        /// The root parameter index.
        root_parameter_index: u32,
        /// The group to bind.
        resource_group: ResourceGroupId,
    },
    /// Binds a resource group for compute work.
    SetComputeResourceGroup {
        /// The root parameter index.
        root_parameter_index: u32,
        /// The group to bind.
        resource_group: ResourceGroupId,
    },
    /// Draws non-indexed geometry, one or more consecutive argument records.
    DrawGraphics {
        /// Argument source.
        source: DrawSource<DrawArguments>,
        /// Number of consecutive argument records to draw.
        number_of_draws: u32,
    },
    /// Draws indexed geometry, one or more consecutive argument records.
    DrawIndexedGraphics {
        /// Argument source.
        source: DrawSource<DrawIndexedArguments>,
        /// Number of consecutive argument records to draw.
        number_of_draws: u32,
    },
    /// Dispatches compute work groups.
    DispatchCompute {
        /// Work groups along x.
        group_count_x: u32,
        /// Work groups along y.
        group_count_y: u32,
        /// Work groups along z.
        group_count_z: u32,
    },
}

impl Command {
    /// Returns `true` for draw and dispatch records.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Command::DrawGraphics { .. }
                | Command::DrawIndexedGraphics { .. }
                | Command::DispatchCompute { .. }
        )
    }
}

/// An ordered list of command records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Creates an empty command buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Moves every record of `other` to the end of `self`, leaving `other` empty.
    pub fn append(&mut self, other: &mut CommandBuffer) {
        self.commands.append(&mut other.commands);
    }

    /// Removes all records, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Returns `true` if no record was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of recorded records.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// The recorded records, in submission order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Iterates over the recorded records.
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
