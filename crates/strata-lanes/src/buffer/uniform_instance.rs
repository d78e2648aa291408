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

//! Per-instance data packed into uniform scratch buffers.

use super::packing::{pack_element_properties, ElementLayout};
use super::{InstanceFill, ScratchBufferKind, ScratchBufferManager};
use ahash::AHashMap;
use std::borrow::Cow;
use strata_core::material::{builtin, MaterialProperty, MaterialPropertyId};
use strata_core::renderer::{
    BufferId, CommandBuffer, CompositorContextData, GraphicsDevice, InstanceReferenceContext,
    ResourceError, ResourceGroupDescriptor, ResourceGroupId, ResourceGroupResource,
};

/// Packs one uniform block per drawn renderable.
///
/// The built-in `WorldPositionMaterialIndexArray` instance reference is written as
/// the camera-relative position in xyz and the technique's material slot in w.
#[derive(Debug)]
pub struct UniformInstanceBufferManager {
    scratch: ScratchBufferManager,
    resource_groups: AHashMap<(BufferId, u32), ResourceGroupId>,
    tracked_buffer_generation: u64,
    staging: Vec<u8>,
}

impl UniformInstanceBufferManager {
    pub fn new(device: &dyn GraphicsDevice, default_buffer_size: u32) -> Self {
        Self {
            scratch: ScratchBufferManager::new(device, ScratchBufferKind::Uniform, default_buffer_size),
            resource_groups: AHashMap::new(),
            tracked_buffer_generation: 0,
            staging: Vec::new(),
        }
    }

    pub fn scratch(&self) -> &ScratchBufferManager {
        &self.scratch
    }

    /// Makes sure a buffer is current and binds it at the blueprint's instance root parameter.
    pub fn startup_buffer_filling(
        &mut self,
        device: &dyn GraphicsDevice,
        fill: &InstanceFill<'_>,
        context: &mut CompositorContextData,
        command_buffer: &mut CommandBuffer,
    ) -> Result<(), ResourceError> {
        let Some(descriptor) = fill.blueprint.instance_buffer() else {
            return Ok(());
        };
        let region = self.scratch.acquire(device, 0)?;
        self.track_generation();
        let group = self.resource_group(device, region.buffer, descriptor.root_parameter_index)?;
        context.set_graphics_resource_group(descriptor.root_parameter_index, group, command_buffer);
        Ok(())
    }

    /// Packs the instance block of one renderable and returns its start instance location.
    ///
    /// Blocks are placed at multiples of their own size, so the location indexes
    /// the block from the start of the bound buffer even when blueprints with
    /// different layouts share it. When the block does not fit, a new buffer
    /// starts and is bound into `command_buffer`.
    pub fn fill_buffer(
        &mut self,
        device: &dyn GraphicsDevice,
        fill: &InstanceFill<'_>,
        context: &mut CompositorContextData,
        command_buffer: &mut CommandBuffer,
    ) -> Result<u32, ResourceError> {
        let Some(descriptor) = fill.blueprint.instance_buffer() else {
            return Ok(0);
        };
        let layout = ElementLayout::new(&descriptor.element_properties);
        let block_size = layout.block_size();
        if block_size == 0 {
            return Ok(0);
        }

        let region = self.scratch.acquire_aligned(device, block_size, block_size)?;
        if self.track_generation() {
            let group = self.resource_group(device, region.buffer, descriptor.root_parameter_index)?;
            context.set_graphics_resource_group(descriptor.root_parameter_index, group, command_buffer);
        }

        let camera_world_position = context.camera_world_position();
        let reference_context = InstanceReferenceContext {
            transform: fill.transform,
            camera_world_position,
            skeleton: fill.skeleton,
            assigned_material_slot: fill.technique.assigned_material_slot(),
            pass_buffer_manager: fill.blueprint.pass_buffer_manager(),
        };
        self.staging.resize(block_size as usize, 0);
        pack_element_properties(
            &layout,
            &descriptor.element_properties,
            fill.global_material_properties,
            fill.blueprint.properties(),
            &mut self.staging,
            |property, reference, out| {
                resolve_uniform_instance_reference(fill, &reference_context, property, reference, out)
            },
        );
        region.write(device, 0, &self.staging)?;

        Ok(region.offset / block_size)
    }

    pub fn on_pre_command_buffer_execution(
        &mut self,
        device: &dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        self.scratch.on_pre_command_buffer_execution(device)
    }

    /// Destroys the cached resource groups, then the buffers.
    pub fn destroy(self, device: &dyn GraphicsDevice) {
        for group in self.resource_groups.into_values() {
            if let Err(error) = device.destroy_resource_group(group) {
                log::warn!(
                    "UniformInstanceBufferManager: failed to destroy resource group {:?}: {}",
                    group,
                    error
                );
            }
        }
        self.scratch.destroy(device);
    }

    /// Whether a new buffer became current since the last call.
    fn track_generation(&mut self) -> bool {
        let generation = self.scratch.buffer_generation();
        if generation == self.tracked_buffer_generation {
            return false;
        }
        self.tracked_buffer_generation = generation;
        true
    }

    fn resource_group(
        &mut self,
        device: &dyn GraphicsDevice,
        buffer: BufferId,
        root_parameter_index: u32,
    ) -> Result<ResourceGroupId, ResourceError> {
        if let Some(&group) = self.resource_groups.get(&(buffer, root_parameter_index)) {
            return Ok(group);
        }
        let group = device.create_resource_group(&ResourceGroupDescriptor {
            label: Some(Cow::Borrowed("uniform instance buffer")),
            root_parameter_index,
            resources: &[ResourceGroupResource::UniformBuffer(buffer)],
        })?;
        log::debug!(
            "UniformInstanceBufferManager: created resource group {:?} for buffer {:?}",
            group,
            buffer
        );
        self.resource_groups.insert((buffer, root_parameter_index), group);
        Ok(group)
    }
}

fn resolve_uniform_instance_reference(
    fill: &InstanceFill<'_>,
    reference_context: &InstanceReferenceContext<'_>,
    property: &MaterialProperty,
    reference: MaterialPropertyId,
    out: &mut [u8],
) {
    if reference == builtin::WORLD_POSITION_MATERIAL_INDEX_ARRAY {
        let position = fill
            .transform
            .camera_relative_position(reference_context.camera_world_position);
        let value = [
            position.x,
            position.y,
            position.z,
            reference_context.assigned_material_slot as f32,
        ];
        out[..16].copy_from_slice(bytemuck::bytes_of(&value));
        return;
    }
    let resolved = fill.providers.instance_references.is_some_and(|resolver| {
        resolver.resolve_instance_reference(property, reference, reference_context, out)
    });
    assert!(
        resolved,
        "UniformInstanceBufferManager: unresolved instance reference {:?} of property {:?}",
        reference,
        property.id()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ExternalProviders;
    use glam::DVec3;
    use strata_core::material::{
        MaterialBlueprintId, MaterialProperties, MaterialPropertyUsage, MaterialPropertyValue,
        MaterialTechniqueId,
    };
    use strata_core::renderer::{Command, HeadlessGraphicsDevice, PipelineKind};
    use strata_core::scene::Transform;
    use strata_data::{
        InstanceBufferDescriptor, InstanceBufferKind, MaterialBlueprintResource, MaterialTechnique,
        ShaderCombinationPipelineCache,
    };

    fn blueprint() -> MaterialBlueprintResource {
        MaterialBlueprintResource::new(
            PipelineKind::Graphics,
            MaterialProperties::new(),
            Box::new(ShaderCombinationPipelineCache::new()),
        )
        .with_instance_buffer(InstanceBufferDescriptor {
            kind: InstanceBufferKind::Uniform,
            root_parameter_index: 2,
            element_properties: vec![MaterialProperty::new_reference(
                builtin::WORLD_POSITION_MATERIAL_INDEX_ARRAY,
                MaterialPropertyUsage::InstanceReference,
                MaterialPropertyValue::Float4([0.0; 4]),
                builtin::WORLD_POSITION_MATERIAL_INDEX_ARRAY,
            )],
        })
    }

    #[test]
    fn test_world_position_is_camera_relative() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = UniformInstanceBufferManager::new(&device, 1024);
        let blueprint = blueprint();
        let technique = MaterialTechnique::new(MaterialTechniqueId::new("Default"), MaterialBlueprintId(0))
            .with_assigned_material_slot(3);
        let transform = Transform::from_position(DVec3::new(1_000_010.0, 2.0, -3.0));
        let providers = ExternalProviders::default();
        let globals = MaterialProperties::new();
        let fill = InstanceFill {
            blueprint: &blueprint,
            global_material_properties: &globals,
            technique: &technique,
            transform: &transform,
            skeleton: None,
            providers: &providers,
        };
        let mut context = CompositorContextData::new(DVec3::new(1_000_000.0, 0.0, 0.0), false);
        let mut command_buffer = CommandBuffer::new();

        manager
            .startup_buffer_filling(&device, &fill, &mut context, &mut command_buffer)
            .unwrap();
        let first = manager
            .fill_buffer(&device, &fill, &mut context, &mut command_buffer)
            .unwrap();
        let second = manager
            .fill_buffer(&device, &fill, &mut context, &mut command_buffer)
            .unwrap();

        assert_eq!((first, second), (0, 1));
        assert_eq!(command_buffer.len(), 1);
        assert!(matches!(
            command_buffer.commands()[0],
            Command::SetGraphicsResourceGroup { root_parameter_index: 2, .. }
        ));
        let buffer = manager.scratch().current_buffer().unwrap();
        let contents = device.buffer_contents(buffer).unwrap();
        let values: &[f32] = bytemuck::cast_slice(&contents[..32]);
        assert_eq!(values, &[10.0, 2.0, -3.0, 3.0, 10.0, 2.0, -3.0, 3.0]);

        manager.on_pre_command_buffer_execution(&device).unwrap();
        manager.destroy(&device);
        assert_eq!(device.live_buffer_count(), 0);
        assert_eq!(device.live_resource_group_count(), 0);
    }

    #[test]
    fn test_locations_index_blocks_of_mixed_layouts() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = UniformInstanceBufferManager::new(&device, 1024);
        let narrow = blueprint();
        let wide = MaterialBlueprintResource::new(
            PipelineKind::Graphics,
            MaterialProperties::new(),
            Box::new(ShaderCombinationPipelineCache::new()),
        )
        .with_instance_buffer(InstanceBufferDescriptor {
            kind: InstanceBufferKind::Uniform,
            root_parameter_index: 2,
            element_properties: vec![
                MaterialProperty::new_reference(
                    builtin::WORLD_POSITION_MATERIAL_INDEX_ARRAY,
                    MaterialPropertyUsage::InstanceReference,
                    MaterialPropertyValue::Float4([0.0; 4]),
                    builtin::WORLD_POSITION_MATERIAL_INDEX_ARRAY,
                ),
                MaterialProperty::new(
                    MaterialPropertyId::new("Tint"),
                    MaterialPropertyUsage::Static,
                    MaterialPropertyValue::Float4([9.0; 4]),
                ),
            ],
        });
        let technique = MaterialTechnique::new(MaterialTechniqueId::new("Default"), MaterialBlueprintId(0))
            .with_assigned_material_slot(7);
        let transform = Transform::from_position(DVec3::splat(7.0));
        let providers = ExternalProviders::default();
        let globals = MaterialProperties::new();
        let narrow_fill = InstanceFill {
            blueprint: &narrow,
            global_material_properties: &globals,
            technique: &technique,
            transform: &transform,
            skeleton: None,
            providers: &providers,
        };
        let wide_fill = InstanceFill {
            blueprint: &wide,
            ..narrow_fill
        };
        let mut context = CompositorContextData::new(DVec3::ZERO, false);
        let mut command_buffer = CommandBuffer::new();

        manager
            .startup_buffer_filling(&device, &narrow_fill, &mut context, &mut command_buffer)
            .unwrap();
        let locations: Vec<(u32, u32)> = [&narrow_fill, &wide_fill, &narrow_fill]
            .into_iter()
            .map(|fill| {
                let block_size = ElementLayout::new(
                    &fill.blueprint.instance_buffer().unwrap().element_properties,
                )
                .block_size();
                let location = manager
                    .fill_buffer(&device, fill, &mut context, &mut command_buffer)
                    .unwrap();
                (location, block_size)
            })
            .collect();

        assert_eq!(locations, vec![(0, 16), (1, 32), (4, 16)]);
        let buffer = manager.scratch().current_buffer().unwrap();
        let contents = device.buffer_contents(buffer).unwrap();
        for (location, block_size) in locations {
            let start = (location * block_size) as usize;
            let position: &[f32] = bytemuck::cast_slice(&contents[start..start + 16]);
            assert_eq!(position, &[7.0, 7.0, 7.0, 7.0]);
        }
        let tint: &[f32] = bytemuck::cast_slice(&contents[48..64]);
        assert_eq!(tint, &[9.0; 4]);

        manager.on_pre_command_buffer_execution(&device).unwrap();
        manager.destroy(&device);
    }

    #[test]
    fn test_rotation_restarts_location_and_rebinds() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = UniformInstanceBufferManager::new(&device, 32);
        let blueprint = blueprint();
        let technique = MaterialTechnique::new(MaterialTechniqueId::new("Default"), MaterialBlueprintId(0));
        let providers = ExternalProviders::default();
        let globals = MaterialProperties::new();
        let fill = InstanceFill {
            blueprint: &blueprint,
            global_material_properties: &globals,
            technique: &technique,
            transform: &Transform::IDENTITY,
            skeleton: None,
            providers: &providers,
        };
        let mut context = CompositorContextData::new(DVec3::ZERO, false);
        let mut command_buffer = CommandBuffer::new();

        manager
            .startup_buffer_filling(&device, &fill, &mut context, &mut command_buffer)
            .unwrap();
        let locations: Vec<u32> = (0..3)
            .map(|_| {
                manager
                    .fill_buffer(&device, &fill, &mut context, &mut command_buffer)
                    .unwrap()
            })
            .collect();

        assert_eq!(locations, vec![0, 1, 0]);
        assert_eq!(command_buffer.len(), 2);
        manager.on_pre_command_buffer_execution(&device).unwrap();
        manager.destroy(&device);
    }
}
