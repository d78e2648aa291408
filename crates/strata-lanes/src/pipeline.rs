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

//! Resolves the pipeline state of a renderable for one material technique.
//!
//! Each renderable keeps a short inline list of resolved states keyed by
//! technique. An entry is trusted while its generation counter, the wrapping sum
//! of the material, global and blueprint shader-combination counters (plus the
//! technique's serialized pipeline state hash for graphics), is unchanged. This
//! sum can collide; a collision only delays an update.

use strata_core::material::{
    builtin, MaterialPropertyUsage, MaterialPropertyValue, ShaderProperties,
};
use strata_core::renderer::{
    CompositorContextData, PipelineKind, PipelineState, PipelineStateRequest,
};
use strata_data::{
    CachedPipelineState, MaterialBlueprintResource, MaterialBlueprintResourceManager,
    MaterialResource, MaterialTechnique, Renderable,
};

/// Resolves pipeline states, reusing one shader property set across calls.
#[derive(Debug, Default)]
pub struct PipelineStateResolver {
    shader_properties: ShaderProperties,
}

impl PipelineStateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation counter a cached state of `technique` must match.
    pub fn generation_counter(
        material: &MaterialResource,
        technique: &MaterialTechnique,
        blueprint: &MaterialBlueprintResource,
        blueprints: &MaterialBlueprintResourceManager,
    ) -> u32 {
        let counter = material
            .shader_combination_generation_counter()
            .wrapping_add(blueprints.global_shader_combination_generation_counter())
            .wrapping_add(blueprint.shader_combination_generation_counter());
        match blueprint.pipeline_kind() {
            PipelineKind::Graphics => {
                counter.wrapping_add(technique.serialized_pipeline_state_hash())
            }
            PipelineKind::Compute => counter,
        }
    }

    /// Returns the pipeline state to bind, or `None` when neither a compiled nor a
    /// fallback state is available yet.
    ///
    /// Only fully compiled states are stored in the renderable's cache; fallback
    /// states are used for the current frame only.
    ///
    /// # Panics
    ///
    /// Panics if a shader-combination property holding a global material property
    /// id resolves neither globally nor in the blueprint.
    pub fn resolve(
        &mut self,
        renderable: &mut Renderable,
        material: &MaterialResource,
        technique: &MaterialTechnique,
        blueprint: &MaterialBlueprintResource,
        blueprints: &MaterialBlueprintResourceManager,
        context: &CompositorContextData,
    ) -> Option<PipelineState> {
        let generation_counter =
            Self::generation_counter(material, technique, blueprint, blueprints);
        let cached = renderable
            .pipeline_cache()
            .iter()
            .position(|entry| entry.material_technique_id == technique.id());
        if let Some(index) = cached {
            let entry = renderable.pipeline_cache()[index];
            if entry.generation_counter == generation_counter {
                return Some(entry.pipeline_state);
            }
        }

        self.gather_shader_properties(renderable, material, blueprint, blueprints, context);
        let kind = blueprint.pipeline_kind();
        let request = PipelineStateRequest {
            kind,
            shader_properties: &self.shader_properties,
            serialized_pipeline_state_hash: match kind {
                PipelineKind::Graphics => technique.serialized_pipeline_state_hash(),
                PipelineKind::Compute => 0,
            },
        };
        let Some(lookup) = blueprint
            .pipeline_state_cache_manager()
            .request_pipeline_state(&request)
        else {
            log::trace!(
                "PipelineStateResolver: no pipeline state for technique {:?} of blueprint {:?}",
                technique.id(),
                blueprint.id()
            );
            return None;
        };
        if lookup.is_fallback {
            log::trace!(
                "PipelineStateResolver: using fallback {:?} for technique {:?}",
                lookup.pipeline_state,
                technique.id()
            );
            return Some(lookup.pipeline_state);
        }

        let entry = CachedPipelineState {
            material_technique_id: technique.id(),
            generation_counter,
            pipeline_state: lookup.pipeline_state,
        };
        let cache = renderable.pipeline_cache_mut();
        match cached {
            Some(index) => cache[index] = entry,
            None => cache.push(entry),
        }
        Some(lookup.pipeline_state)
    }

    fn gather_shader_properties(
        &mut self,
        renderable: &Renderable,
        material: &MaterialResource,
        blueprint: &MaterialBlueprintResource,
        blueprints: &MaterialBlueprintResourceManager,
        context: &CompositorContextData,
    ) {
        let shader_properties = &mut self.shader_properties;
        shader_properties.clear();

        for property in material.properties().iter() {
            if property.usage() != MaterialPropertyUsage::ShaderCombination {
                continue;
            }
            let value = match *property.value() {
                MaterialPropertyValue::GlobalMaterialPropertyId(reference) => *blueprints
                    .global_material_properties()
                    .property_by_id(reference)
                    .or_else(|| blueprint.properties().property_by_id(reference))
                    .unwrap_or_else(|| {
                        panic!(
                            "PipelineStateResolver: shader property {:?} references unknown global property {:?}",
                            property.id(),
                            reference
                        )
                    })
                    .value(),
                value => value,
            };
            if let Some(value) = value.as_shader_combination_value() {
                shader_properties.set_property_value(property.id(), value);
            }
        }

        if renderable.skeleton_resource_id().is_some()
            && blueprint
                .properties()
                .property_by_id(builtin::USE_GPU_SKINNING)
                .is_some()
        {
            shader_properties.set_property_value(builtin::USE_GPU_SKINNING, 1);
        }
        if context.single_pass_stereo_instancing() {
            shader_properties.set_property_value(builtin::SINGLE_PASS_STEREO_INSTANCING, 1);
        }

        blueprint.optimize_shader_properties(shader_properties);
    }
}
