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

use super::{AttachmentFixup, Renderable, RenderableKey, RenderableManagerId};
use crate::material::MaterialResourceManager;
use std::ops::Range;
use strata_core::material::MaterialResourceId;
use strata_core::scene::Transform;

/// Groups the renderables of one scene entity, all of its LODs included.
///
/// Renderables are stored LOD after LOD, each LOD holding the same number of
/// renderables. Aggregate data (render queue index range, shadow casting) is
/// cached so render queues can reject a whole manager at once; call
/// [`update_cached_renderables_data`](Self::update_cached_renderables_data)
/// after material properties of attached renderables changed.
#[derive(Debug)]
pub struct RenderableManager {
    id: RenderableManagerId,
    renderables: Vec<Renderable>,
    number_of_lods: u8,
    lod_index: u8,
    transform: Transform,
    visible: bool,
    minimum_render_queue_index: u8,
    maximum_render_queue_index: u8,
    cast_shadows: bool,
    cached_distance_to_camera: f32,
}

impl RenderableManager {
    /// Creates an empty, visible manager.
    pub fn new(id: RenderableManagerId, transform: Transform) -> Self {
        Self {
            id,
            renderables: Vec::new(),
            number_of_lods: 1,
            lod_index: 0,
            transform,
            visible: true,
            minimum_render_queue_index: 0,
            maximum_render_queue_index: 0,
            cast_shadows: false,
            cached_distance_to_camera: 0.0,
        }
    }

    pub fn id(&self) -> RenderableManagerId {
        self.id
    }

    /// Adds a renderable and returns its index.
    ///
    /// Pass a material afterwards with
    /// [`set_renderable_material_resource_id`](Self::set_renderable_material_resource_id).
    pub fn push_renderable(&mut self, renderable: Renderable) -> usize {
        assert!(
            renderable.material_resource_id.is_none(),
            "RenderableManager({:?}): renderables are attached to materials through the manager",
            self.id
        );
        self.renderables.push(renderable);
        self.update_cached_aggregates();
        self.renderables.len() - 1
    }

    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    pub fn renderable(&self, index: usize) -> Option<&Renderable> {
        self.renderables.get(index)
    }

    /// Sets how many LODs the renderables are split into.
    ///
    /// # Panics
    ///
    /// Panics if the renderables cannot be split evenly.
    pub fn set_number_of_lods(&mut self, number_of_lods: u8) {
        assert!(
            number_of_lods > 0 && self.renderables.len() % usize::from(number_of_lods) == 0,
            "RenderableManager({:?}): {} renderables cannot be split into {} LODs",
            self.id,
            self.renderables.len(),
            number_of_lods
        );
        self.number_of_lods = number_of_lods;
        self.lod_index = self.lod_index.min(number_of_lods - 1);
    }

    pub fn number_of_lods(&self) -> u8 {
        self.number_of_lods
    }

    pub fn lod_index(&self) -> u8 {
        self.lod_index
    }

    /// Selects the LOD drawn by render queues, usually during culling.
    pub fn set_lod_index(&mut self, lod_index: u8) {
        assert!(
            lod_index < self.number_of_lods,
            "RenderableManager({:?}): LOD index {} out of range",
            self.id,
            lod_index
        );
        self.lod_index = lod_index;
    }

    /// Range of the renderables of the selected LOD.
    pub fn lod_renderables_range(&self) -> Range<usize> {
        let per_lod = self.renderables.len() / usize::from(self.number_of_lods);
        let start = per_lod * usize::from(self.lod_index);
        start..start + per_lod
    }

    /// The renderables of the selected LOD.
    pub fn lod_renderables_mut(&mut self) -> &mut [Renderable] {
        let range = self.lod_renderables_range();
        &mut self.renderables[range]
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Smallest render queue index among the renderables.
    pub fn minimum_render_queue_index(&self) -> u8 {
        self.minimum_render_queue_index
    }

    /// Largest render queue index among the renderables.
    pub fn maximum_render_queue_index(&self) -> u8 {
        self.maximum_render_queue_index
    }

    /// Whether any renderable casts shadows.
    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    pub fn cached_distance_to_camera(&self) -> f32 {
        self.cached_distance_to_camera
    }

    /// Stores the camera distance computed during culling.
    pub fn set_cached_distance_to_camera(&mut self, distance: f32) {
        self.cached_distance_to_camera = distance;
    }

    /// Attaches a renderable to a material, detaching it from its previous one.
    ///
    /// The renderable's inline pipeline cache is dropped and its render queue index
    /// and shadow flag are copied from the new material. Detaching may move another
    /// renderable inside the old material's list. When that renderable belongs to
    /// this manager it is fixed up here; otherwise the fixup is returned and must be
    /// applied to its owner with [`apply_attachment_fixup`](Self::apply_attachment_fixup).
    pub fn set_renderable_material_resource_id(
        &mut self,
        renderable_index: usize,
        material_resource_id: Option<MaterialResourceId>,
        materials: &mut MaterialResourceManager,
    ) -> Option<AttachmentFixup> {
        let key = RenderableKey {
            manager: self.id,
            renderable_index: renderable_index as u32,
        };
        let renderable = &mut self.renderables[renderable_index];
        if renderable.material_resource_id == material_resource_id {
            return None;
        }

        let mut fixup = None;
        if let (Some(previous), Some(slot)) = (
            renderable.material_resource_id,
            renderable.material_attachment.take(),
        ) {
            if let Some(material) = materials.get_mut(previous) {
                fixup = material.detach_renderable(slot);
            }
        }

        renderable.material_resource_id = material_resource_id;
        renderable.render_queue_index = 0;
        renderable.cast_shadows = false;
        renderable.clear_pipeline_cache();
        if let Some(material) = material_resource_id.and_then(|id| materials.get_mut(id)) {
            renderable.material_attachment = Some(material.attach_renderable(key));
            renderable.render_queue_index = material.render_queue_index();
            renderable.cast_shadows = material.cast_shadows();
        }

        let external = match fixup {
            Some(fixup) if fixup.key.manager == self.id => {
                self.apply_attachment_fixup(fixup);
                None
            }
            other => other,
        };
        self.update_cached_aggregates();
        external
    }

    /// Stores the new attachment slot of a renderable moved by a detach.
    pub fn apply_attachment_fixup(&mut self, fixup: AttachmentFixup) {
        assert_eq!(
            fixup.key.manager, self.id,
            "RenderableManager({:?}): attachment fixup addressed to another manager",
            self.id
        );
        self.renderables[fixup.key.renderable_index as usize].material_attachment =
            Some(fixup.slot);
    }

    /// Detaches every renderable from its material.
    ///
    /// Returns the fixups addressed to other managers.
    pub fn release_materials(
        &mut self,
        materials: &mut MaterialResourceManager,
    ) -> Vec<AttachmentFixup> {
        (0..self.renderables.len())
            .filter_map(|index| self.set_renderable_material_resource_id(index, None, materials))
            .collect()
    }

    /// Refreshes per-renderable material data and the cached aggregates.
    pub fn update_cached_renderables_data(&mut self, materials: &MaterialResourceManager) {
        for renderable in &mut self.renderables {
            if let Some(material) = renderable
                .material_resource_id
                .and_then(|id| materials.get(id))
            {
                renderable.render_queue_index = material.render_queue_index();
                renderable.cast_shadows = material.cast_shadows();
            }
        }
        self.update_cached_aggregates();
    }

    fn update_cached_aggregates(&mut self) {
        let mut minimum = u8::MAX;
        let mut maximum = u8::MIN;
        let mut cast_shadows = false;
        for renderable in &self.renderables {
            minimum = minimum.min(renderable.render_queue_index);
            maximum = maximum.max(renderable.render_queue_index);
            cast_shadows |= renderable.cast_shadows;
        }
        if self.renderables.is_empty() {
            minimum = 0;
        }
        self.minimum_render_queue_index = minimum;
        self.maximum_render_queue_index = maximum;
        self.cast_shadows = cast_shadows;
    }
}
