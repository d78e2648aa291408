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

//! # Strata Data
//!
//! Scene-side data consumed by the render queue: renderables grouped in
//! renderable managers, material resources with their techniques, and material
//! blueprints with their pipeline state caches.
//!
//! Renderables and materials are linked both ways. A renderable stores the ID of
//! its material, and the material keeps a dense list of attached renderables so
//! that property changes can be broadcast to them.

pub mod material;
pub mod renderable;

pub use material::{
    InstanceBufferDescriptor, InstanceBufferKind, MaterialBlueprintResource,
    MaterialBlueprintResourceManager, MaterialResource, MaterialResourceManager,
    MaterialTechnique, ShaderCombinationPipelineCache,
};
pub use renderable::{
    AttachmentFixup, CachedPipelineState, IndirectDrawSource, Renderable, RenderableKey,
    RenderableManager, RenderableManagerId,
};
