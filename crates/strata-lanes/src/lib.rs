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

//! Hot-path render queue execution for Strata.
//!
//! This crate turns the renderables of a frame into an ordered command stream.
//! A [`RenderQueue`] collects renderables into per render queue index buckets,
//! resolves their pipeline states and sorting keys, and then emits bindings,
//! per-instance data uploads and direct or multi-draw-indirect draw calls.
//!
//! Per-instance and indirect argument data is written to growable scratch
//! buffers, see the [`buffer`] module. All of them are owned by
//! [`RenderQueueResources`], which must be notified with
//! [`on_pre_command_buffer_execution`](RenderQueueResources::on_pre_command_buffer_execution)
//! once the frame's command buffer is handed over for execution.

pub mod buffer;
pub mod config;
pub mod pipeline;
pub mod providers;
pub mod render_queue;
pub mod sorting;

pub use buffer::{
    IndirectBufferManager, ScratchBufferKind, ScratchBufferManager, ScratchRegion,
    TextureInstanceBufferManager, UniformInstanceBufferManager,
};
pub use config::{RenderQueueDescriptor, ScratchBufferBudgets};
pub use pipeline::PipelineStateResolver;
pub use providers::ExternalProviders;
pub use render_queue::{QueuedRenderable, RenderQueue, RenderQueueResources};
