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

//! Renderables: one drawable sub-mesh each, owned by a [`RenderableManager`].

mod manager;

pub use self::manager::RenderableManager;

use smallvec::SmallVec;
use strata_core::material::{MaterialResourceId, MaterialTechniqueId, SkeletonResourceId};
use strata_core::renderer::{BufferId, PipelineState, VertexArrayId};

/// Identifies a renderable manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableManagerId(pub u32);

/// Addresses one renderable across all renderable managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderableKey {
    /// The owning manager.
    pub manager: RenderableManagerId,
    /// The index of the renderable inside its manager.
    pub renderable_index: u32,
}

/// Tells the owner of a renderable that its attachment slot moved.
///
/// Detaching a renderable from a material swaps the last attached renderable into
/// the freed slot. The moved renderable must then store its new slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentFixup {
    /// The renderable that moved.
    pub key: RenderableKey,
    /// Its new slot in the material's attached-renderable list.
    pub slot: u32,
}

/// Draw arguments living in an externally filled indirect buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndirectDrawSource {
    /// The indirect buffer.
    pub buffer: BufferId,
    /// Byte offset of the first argument record.
    pub offset: u32,
    /// Number of argument records.
    pub number_of_draws: u32,
}

/// One entry of the inline pipeline state cache of a renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedPipelineState {
    /// The technique the state was resolved for.
    pub material_technique_id: MaterialTechniqueId,
    /// The generation counter at resolution time.
    pub generation_counter: u32,
    /// The resolved, fully compiled pipeline state.
    pub pipeline_state: PipelineState,
}

/// Most renderables are drawn with one or two techniques.
pub type PipelineStateCache = SmallVec<[CachedPipelineState; 2]>;

/// One drawable unit: geometry bindings, draw parameters and a material.
#[derive(Debug, Default)]
pub struct Renderable {
    vertex_array: Option<VertexArrayId>,
    position_only_vertex_array: Option<VertexArrayId>,
    draw_indexed: bool,
    start_index_location: u32,
    base_vertex_location: i32,
    number_of_indices: u32,
    indirect: Option<IndirectDrawSource>,
    instance_count: u32,
    skeleton_resource_id: Option<SkeletonResourceId>,
    material_resource_id: Option<MaterialResourceId>,
    material_attachment: Option<u32>,
    render_queue_index: u8,
    cast_shadows: bool,
    pipeline_cache: PipelineStateCache,
}

impl Renderable {
    /// An indexed renderable drawing `number_of_indices` indices.
    pub fn indexed(
        vertex_array: VertexArrayId,
        start_index_location: u32,
        number_of_indices: u32,
    ) -> Self {
        Self {
            vertex_array: Some(vertex_array),
            draw_indexed: true,
            start_index_location,
            number_of_indices,
            instance_count: 1,
            ..Default::default()
        }
    }

    /// A non-indexed renderable drawing `number_of_vertices` vertices.
    ///
    /// Without a vertex array the vertex shader generates positions itself.
    pub fn non_indexed(
        vertex_array: Option<VertexArrayId>,
        start_vertex_location: u32,
        number_of_vertices: u32,
    ) -> Self {
        Self {
            vertex_array,
            start_index_location: start_vertex_location,
            number_of_indices: number_of_vertices,
            instance_count: 1,
            ..Default::default()
        }
    }

    /// A renderable whose draw arguments live in an externally filled indirect buffer.
    pub fn indirect(
        vertex_array: Option<VertexArrayId>,
        draw_indexed: bool,
        source: IndirectDrawSource,
    ) -> Self {
        Self {
            vertex_array,
            draw_indexed,
            indirect: Some(source),
            instance_count: 1,
            ..Default::default()
        }
    }

    /// Sets the instance count.
    pub fn with_instance_count(mut self, instance_count: u32) -> Self {
        self.instance_count = instance_count;
        self
    }

    /// Sets the value added to each index.
    pub fn with_base_vertex_location(mut self, base_vertex_location: i32) -> Self {
        self.base_vertex_location = base_vertex_location;
        self
    }

    /// Sets the vertex array used by depth-only passes.
    pub fn with_position_only_vertex_array(mut self, vertex_array: VertexArrayId) -> Self {
        self.position_only_vertex_array = Some(vertex_array);
        self
    }

    /// Sets the skeleton skinning this renderable.
    pub fn with_skeleton_resource_id(mut self, skeleton: SkeletonResourceId) -> Self {
        self.skeleton_resource_id = Some(skeleton);
        self
    }

    pub fn vertex_array(&self) -> Option<VertexArrayId> {
        self.vertex_array
    }

    pub fn position_only_vertex_array(&self) -> Option<VertexArrayId> {
        self.position_only_vertex_array
    }

    pub fn draw_indexed(&self) -> bool {
        self.draw_indexed
    }

    /// First index, or first vertex for non-indexed renderables.
    pub fn start_index_location(&self) -> u32 {
        self.start_index_location
    }

    pub fn base_vertex_location(&self) -> i32 {
        self.base_vertex_location
    }

    /// Index count, or vertex count for non-indexed renderables.
    pub fn number_of_indices(&self) -> u32 {
        self.number_of_indices
    }

    pub fn indirect_draw_source(&self) -> Option<IndirectDrawSource> {
        self.indirect
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn skeleton_resource_id(&self) -> Option<SkeletonResourceId> {
        self.skeleton_resource_id
    }

    pub fn material_resource_id(&self) -> Option<MaterialResourceId> {
        self.material_resource_id
    }

    /// The slot of this renderable in its material's attached-renderable list.
    pub fn material_attachment(&self) -> Option<u32> {
        self.material_attachment
    }

    /// The render queue index copied from the material.
    pub fn render_queue_index(&self) -> u8 {
        self.render_queue_index
    }

    /// The cast-shadows flag copied from the material.
    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    /// A renderable with nothing to draw: no geometry and no indirect arguments.
    pub fn is_null_draw(&self) -> bool {
        self.indirect.is_none() && self.number_of_indices == 0
    }

    /// The inline pipeline state cache.
    pub fn pipeline_cache(&self) -> &[CachedPipelineState] {
        &self.pipeline_cache
    }

    /// Mutable access to the inline pipeline state cache.
    pub fn pipeline_cache_mut(&mut self) -> &mut PipelineStateCache {
        &mut self.pipeline_cache
    }

    /// Drops every cached pipeline state.
    pub fn clear_pipeline_cache(&mut self) {
        self.pipeline_cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let indexed = Renderable::indexed(VertexArrayId(1), 3, 6).with_instance_count(4);
        assert!(indexed.draw_indexed());
        assert_eq!(indexed.number_of_indices(), 6);
        assert_eq!(indexed.instance_count(), 4);
        assert!(!indexed.is_null_draw());

        let fullscreen = Renderable::non_indexed(None, 0, 3);
        assert!(!fullscreen.draw_indexed());
        assert_eq!(fullscreen.vertex_array(), None);

        assert!(Renderable::default().is_null_draw());
        let external = Renderable::indirect(
            Some(VertexArrayId(2)),
            true,
            IndirectDrawSource {
                buffer: BufferId(9),
                offset: 0,
                number_of_draws: 2,
            },
        );
        assert!(!external.is_null_draw());
    }
}
