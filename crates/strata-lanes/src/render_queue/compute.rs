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

//! Compute dispatch from a render queue holding a single compute renderable.

use super::RenderQueue;
use crate::providers::ExternalProviders;
use strata_core::material::{builtin, MaterialProperties, MaterialPropertyId, MaterialPropertyValue};
use strata_core::renderer::{
    Command, CommandBuffer, CompositorContextData, GraphicsDevice, PipelineState, ResourceError,
};
use strata_data::{MaterialBlueprintResourceManager, MaterialResourceManager};

impl RenderQueue {
    /// Emits the bind and dispatch commands of the queued compute renderable.
    ///
    /// The work group count along each axis is `ceil(global / local)`, where the
    /// local size is the `LocalComputeSize` property and the global size is either
    /// the `GlobalComputeSize` integer triple or the extent of the texture it names.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one renderable with a compute pipeline state is
    /// queued, or if the compute sizes are missing or invalid.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_compute_command_buffer(
        &mut self,
        device: &dyn GraphicsDevice,
        materials: &MaterialResourceManager,
        blueprints: &mut MaterialBlueprintResourceManager,
        providers: &ExternalProviders<'_>,
        context: &CompositorContextData,
        command_buffer: &mut CommandBuffer,
    ) -> Result<(), ResourceError> {
        assert_eq!(
            self.number_of_draw_calls(),
            1,
            "RenderQueue: compute dispatch needs exactly one queued renderable"
        );
        let Some(queued) = self
            .queues
            .iter()
            .find_map(|queue| queue.queued_renderables.first())
            .copied()
        else {
            panic!("RenderQueue: draw counter and buckets disagree");
        };
        let PipelineState::Compute(pipeline_state) = queued.pipeline_state else {
            panic!(
                "RenderQueue: {:?} queued for compute work",
                queued.pipeline_state
            );
        };

        command_buffer.push(Command::SetComputePipelineState(pipeline_state));
        let (material, technique) = queued.material_and_technique(materials);
        let blueprint = blueprints
            .get_mut(queued.material_blueprint_id)
            .unwrap_or_else(|| {
                panic!(
                    "RenderQueue: unknown material blueprint {:?}",
                    queued.material_blueprint_id
                )
            });
        blueprint.fill_compute_command_buffer(command_buffer);
        if let Some(pass_buffer_manager) = blueprint.pass_buffer_manager_mut() {
            pass_buffer_manager.fill_buffer(device, context)?;
            pass_buffer_manager.fill_compute_command_buffer(command_buffer);
        }
        technique.fill_compute_command_buffer(command_buffer);

        let blueprint_properties = blueprint.properties();
        let local_size = resolve_compute_size(
            builtin::LOCAL_COMPUTE_SIZE,
            material.properties(),
            blueprint_properties,
        );
        let Some(local_size) = local_size.and_then(|value| value.as_integer3()) else {
            panic!(
                "RenderQueue: material {:?} has no integer3 local compute size",
                material.id()
            );
        };
        assert!(
            local_size.iter().all(|&size| size > 0),
            "RenderQueue: local compute size {:?} of material {:?} must be positive",
            local_size,
            material.id()
        );

        let global_size = match resolve_compute_size(
            builtin::GLOBAL_COMPUTE_SIZE,
            material.properties(),
            blueprint_properties,
        ) {
            Some(MaterialPropertyValue::Integer3(size)) => size.map(|axis| axis.max(0) as u32),
            Some(MaterialPropertyValue::TextureAssetId(texture)) => {
                let dimensions = providers
                    .textures
                    .and_then(|textures| textures.texture_dimensions(texture));
                let Some(dimensions) = dimensions else {
                    panic!(
                        "RenderQueue: global compute size texture {:?} is unknown",
                        texture
                    );
                };
                dimensions.extent()
            }
            other => panic!(
                "RenderQueue: material {:?} has an invalid global compute size {:?}",
                material.id(),
                other
            ),
        };

        command_buffer.push(Command::DispatchCompute {
            group_count_x: global_size[0].div_ceil(local_size[0] as u32),
            group_count_y: global_size[1].div_ceil(local_size[1] as u32),
            group_count_z: global_size[2].div_ceil(local_size[2] as u32),
        });
        Ok(())
    }
}

/// Material value first, blueprint value otherwise.
fn resolve_compute_size(
    id: MaterialPropertyId,
    material_properties: &MaterialProperties,
    blueprint_properties: &MaterialProperties,
) -> Option<MaterialPropertyValue> {
    material_properties
        .property_by_id(id)
        .or_else(|| blueprint_properties.property_by_id(id))
        .map(|property| *property.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderQueueDescriptor;
    use glam::DVec3;
    use strata_core::material::{
        MaterialProperty, MaterialPropertyUsage, MaterialTechniqueId, ShaderProperties,
        TextureAssetId,
    };
    use strata_core::renderer::{
        ComputePipelineStateId, HeadlessGraphicsDevice, PipelineKind, TextureDimensions,
        TextureProvider,
    };
    use strata_core::scene::Transform;
    use strata_data::{
        MaterialBlueprintResource, MaterialResource, MaterialTechnique, Renderable,
        RenderableManager, RenderableManagerId, ShaderCombinationPipelineCache,
    };

    struct CubeTextures;

    impl TextureProvider for CubeTextures {
        fn texture_dimensions(&self, texture: TextureAssetId) -> Option<TextureDimensions> {
            (texture == TextureAssetId(3)).then_some(TextureDimensions::Cube {
                width: 64,
                height: 64,
            })
        }
    }

    fn dispatch(global_size: MaterialPropertyValue) -> CommandBuffer {
        let device = HeadlessGraphicsDevice::new();
        let cache = ShaderCombinationPipelineCache::new();
        let pipeline_state = PipelineState::Compute(ComputePipelineStateId(5));
        cache.insert_compiled(0, ShaderProperties::new(), pipeline_state);

        let mut blueprints = MaterialBlueprintResourceManager::new();
        let blueprint_id = blueprints.add(MaterialBlueprintResource::new(
            PipelineKind::Compute,
            MaterialProperties::from_properties([MaterialProperty::new(
                builtin::LOCAL_COMPUTE_SIZE,
                MaterialPropertyUsage::Static,
                MaterialPropertyValue::Integer3([8, 8, 1]),
            )]),
            Box::new(cache),
        ));
        let technique_id = MaterialTechniqueId::new("Compute");
        let mut materials = MaterialResourceManager::new();
        let material = materials.add(
            MaterialResource::new(MaterialProperties::from_properties([MaterialProperty::new(
                builtin::GLOBAL_COMPUTE_SIZE,
                MaterialPropertyUsage::Static,
                global_size,
            )]))
            .with_technique(MaterialTechnique::new(technique_id, blueprint_id)),
        );
        let mut manager = RenderableManager::new(RenderableManagerId(0), Transform::IDENTITY);
        manager.push_renderable(Renderable::default());
        manager.set_renderable_material_resource_id(0, Some(material), &mut materials);

        let context = CompositorContextData::new(DVec3::ZERO, false);
        let mut queue = RenderQueue::new(RenderQueueDescriptor::default());
        queue.add_renderables_from_renderable_manager(
            &mut manager,
            technique_id,
            &materials,
            &blueprints,
            &context,
            false,
        );
        assert_eq!(queue.number_of_null_draw_calls(), 1);

        let textures = CubeTextures;
        let providers = ExternalProviders {
            textures: Some(&textures),
            ..Default::default()
        };
        let mut command_buffer = CommandBuffer::new();
        queue
            .fill_compute_command_buffer(
                &device,
                &materials,
                &mut blueprints,
                &providers,
                &context,
                &mut command_buffer,
            )
            .unwrap();
        command_buffer
    }

    #[test]
    fn test_dispatch_rounds_group_counts_up() {
        let command_buffer = dispatch(MaterialPropertyValue::Integer3([100, 64, 1]));

        assert_eq!(
            command_buffer.commands(),
            &[
                Command::SetComputePipelineState(ComputePipelineStateId(5)),
                Command::DispatchCompute {
                    group_count_x: 13,
                    group_count_y: 8,
                    group_count_z: 1,
                },
            ]
        );
    }

    #[test]
    fn test_cube_texture_global_size_covers_six_faces() {
        let command_buffer = dispatch(MaterialPropertyValue::TextureAssetId(TextureAssetId(3)));

        assert_eq!(
            command_buffer.commands().last(),
            Some(&Command::DispatchCompute {
                group_count_x: 8,
                group_count_y: 8,
                group_count_z: 6,
            })
        );
    }

    #[test]
    #[should_panic(expected = "is unknown")]
    fn test_unknown_global_size_texture_panics() {
        dispatch(MaterialPropertyValue::TextureAssetId(TextureAssetId(4)));
    }
}
