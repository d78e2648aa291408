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

//! Handles to compiled pipeline state objects.

/// An opaque handle to a compiled graphics pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphicsPipelineStateId(pub usize);

/// An opaque handle to a compiled compute pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComputePipelineStateId(pub usize);

/// Which kind of pipeline a material blueprint produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Rasterization pipeline, drawn through graphics command records.
    Graphics,
    /// Compute pipeline, dispatched through compute command records.
    Compute,
}

/// A resolved pipeline state, ready to be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// A graphics pipeline state.
    Graphics(GraphicsPipelineStateId),
    /// A compute pipeline state.
    Compute(ComputePipelineStateId),
}

impl PipelineState {
    /// The kind of pipeline this state belongs to.
    pub fn kind(&self) -> PipelineKind {
        match self {
            PipelineState::Graphics(_) => PipelineKind::Graphics,
            PipelineState::Compute(_) => PipelineKind::Compute,
        }
    }

    /// The raw handle value, used as the pipeline component of sorting keys.
    pub fn raw_id(&self) -> usize {
        match self {
            PipelineState::Graphics(id) => id.0,
            PipelineState::Compute(id) => id.0,
        }
    }
}
