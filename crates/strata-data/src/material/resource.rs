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

use super::MaterialTechnique;
use crate::renderable::{AttachmentFixup, RenderableKey};
use strata_core::material::{
    builtin, LoadingState, MaterialProperties, MaterialPropertyId, MaterialPropertyUsage,
    MaterialPropertyValue, MaterialResourceId, MaterialTechniqueId,
};

/// A material: a property table, the techniques it can be drawn with, and the
/// renderables currently using it.
#[derive(Debug)]
pub struct MaterialResource {
    id: MaterialResourceId,
    loading_state: LoadingState,
    properties: MaterialProperties,
    sorted_techniques: Vec<MaterialTechnique>,
    shader_combination_generation_counter: u32,
    attached_renderables: Vec<RenderableKey>,
}

impl MaterialResource {
    /// Creates a loaded material. The ID is assigned by the [`MaterialResourceManager`].
    ///
    /// [`MaterialResourceManager`]: super::MaterialResourceManager
    pub fn new(properties: MaterialProperties) -> Self {
        Self {
            id: MaterialResourceId(u32::MAX),
            loading_state: LoadingState::Loaded,
            properties,
            sorted_techniques: Vec::new(),
            shader_combination_generation_counter: 0,
            attached_renderables: Vec::new(),
        }
    }

    /// Adds or replaces a technique.
    pub fn with_technique(mut self, technique: MaterialTechnique) -> Self {
        self.add_technique(technique);
        self
    }

    pub(crate) fn set_id(&mut self, id: MaterialResourceId) {
        self.id = id;
    }

    pub fn id(&self) -> MaterialResourceId {
        self.id
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading_state
    }

    pub fn set_loading_state(&mut self, loading_state: LoadingState) {
        self.loading_state = loading_state;
    }

    pub fn properties(&self) -> &MaterialProperties {
        &self.properties
    }

    /// Adds or replaces a technique.
    pub fn add_technique(&mut self, technique: MaterialTechnique) {
        match self
            .sorted_techniques
            .binary_search_by_key(&technique.id(), MaterialTechnique::id)
        {
            Ok(index) => self.sorted_techniques[index] = technique,
            Err(index) => self.sorted_techniques.insert(index, technique),
        }
    }

    /// Looks up a technique by ID.
    pub fn technique_by_id(&self, id: MaterialTechniqueId) -> Option<&MaterialTechnique> {
        self.sorted_techniques
            .binary_search_by_key(&id, MaterialTechnique::id)
            .ok()
            .map(|index| &self.sorted_techniques[index])
    }

    pub fn techniques(&self) -> &[MaterialTechnique] {
        &self.sorted_techniques
    }

    /// Bumped every time a shader-combination property changes value.
    pub fn shader_combination_generation_counter(&self) -> u32 {
        self.shader_combination_generation_counter
    }

    /// Sets a property value.
    ///
    /// Returns `true` if the stored value changed. When the property is one that
    /// renderables cache (see [`affects_cached_renderable_data`](Self::affects_cached_renderable_data)),
    /// the owners of [`attached_renderables`](Self::attached_renderables) must refresh.
    pub fn set_property_value(
        &mut self,
        id: MaterialPropertyId,
        value: MaterialPropertyValue,
        usage: MaterialPropertyUsage,
    ) -> bool {
        if !self.properties.set_property_value(id, value, usage) {
            return false;
        }
        let usage = self.properties.property_by_id(id).map(|property| property.usage());
        if usage == Some(MaterialPropertyUsage::ShaderCombination) {
            self.shader_combination_generation_counter =
                self.shader_combination_generation_counter.wrapping_add(1);
        }
        true
    }

    /// Whether renderables keep a copy of this property.
    pub fn affects_cached_renderable_data(id: MaterialPropertyId) -> bool {
        id == builtin::RENDER_QUEUE_INDEX || id == builtin::CAST_SHADOWS
    }

    /// The render queue index, zero unless the material sets one.
    pub fn render_queue_index(&self) -> u8 {
        self.properties
            .property_by_id(builtin::RENDER_QUEUE_INDEX)
            .and_then(|property| property.value().as_integer())
            .map(|index| index.clamp(0, i32::from(u8::MAX)) as u8)
            .unwrap_or(0)
    }

    /// Whether renderables using this material cast shadows.
    pub fn cast_shadows(&self) -> bool {
        self.properties
            .property_by_id(builtin::CAST_SHADOWS)
            .and_then(|property| property.value().as_boolean())
            .unwrap_or(false)
    }

    /// The renderables currently using this material.
    pub fn attached_renderables(&self) -> &[RenderableKey] {
        &self.attached_renderables
    }

    /// Appends a renderable and returns its slot.
    pub(crate) fn attach_renderable(&mut self, key: RenderableKey) -> u32 {
        self.attached_renderables.push(key);
        (self.attached_renderables.len() - 1) as u32
    }

    /// Removes the renderable at `slot` by swapping the last one into its place.
    ///
    /// Returns the fixup for the moved renderable, if one moved.
    pub(crate) fn detach_renderable(&mut self, slot: u32) -> Option<AttachmentFixup> {
        let slot = slot as usize;
        assert!(
            slot < self.attached_renderables.len(),
            "MaterialResource({:?}): invalid attachment slot {}",
            self.id,
            slot
        );
        self.attached_renderables.swap_remove(slot);
        self.attached_renderables
            .get(slot)
            .map(|key| AttachmentFixup {
                key: *key,
                slot: slot as u32,
            })
    }
}
