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

//! Per-instance data split between a uniform buffer and a texture buffer.
//!
//! The uniform block holds small per-instance values, including the built-in
//! `InstanceIndicesArray` reference: x = start of the instance's texture data in
//! float4 units, y = the technique's material slot, z = custom parameter (0).
//! The texture buffer receives a 3 x float4 transform per instance, followed by
//! the bone-space matrices of skinned renderables.

use super::packing::{align_up, pack_element_properties, ElementLayout, PACKAGE_SIZE};
use super::{InstanceFill, ScratchBufferKind, ScratchBufferManager};
use ahash::AHashMap;
use std::borrow::Cow;
use strata_core::material::builtin;
use strata_core::renderer::{
    BufferId, CommandBuffer, CompositorContextData, GraphicsDevice, InstanceReferenceContext,
    ResourceError, ResourceGroupDescriptor, ResourceGroupId, ResourceGroupResource,
};

/// Bytes of the transform written per instance: position, rotation, scale.
pub const TRANSFORM_BLOCK_SIZE: u32 = 3 * 16;

type ResourceGroupKey = (BufferId, BufferId, u32);

#[derive(Debug)]
pub struct TextureInstanceBufferManager {
    uniform_scratch: ScratchBufferManager,
    texture_scratch: ScratchBufferManager,
    resource_groups: AHashMap<ResourceGroupKey, ResourceGroupId>,
    tracked_buffer_generations: (u64, u64),
    uniform_staging: Vec<u8>,
    texture_staging: Vec<u8>,
}

impl TextureInstanceBufferManager {
    pub fn new(
        device: &dyn GraphicsDevice,
        default_uniform_buffer_size: u32,
        default_texture_buffer_size: u32,
    ) -> Self {
        Self {
            uniform_scratch: ScratchBufferManager::new(
                device,
                ScratchBufferKind::Uniform,
                default_uniform_buffer_size,
            ),
            texture_scratch: ScratchBufferManager::new(
                device,
                ScratchBufferKind::Texture,
                default_texture_buffer_size,
            ),
            resource_groups: AHashMap::new(),
            tracked_buffer_generations: (0, 0),
            uniform_staging: Vec::new(),
            texture_staging: Vec::new(),
        }
    }

    pub fn uniform_scratch(&self) -> &ScratchBufferManager {
        &self.uniform_scratch
    }

    pub fn texture_scratch(&self) -> &ScratchBufferManager {
        &self.texture_scratch
    }

    /// Makes sure both buffers are current and binds them as one resource group.
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
        let uniform_buffer = self.uniform_scratch.acquire(device, 0)?.buffer;
        let texture_buffer = self.texture_scratch.acquire(device, 0)?.buffer;
        self.track_generations();
        let group = self.resource_group(
            device,
            uniform_buffer,
            texture_buffer,
            descriptor.root_parameter_index,
        )?;
        context.set_graphics_resource_group(descriptor.root_parameter_index, group, command_buffer);
        Ok(())
    }

    /// Packs one renderable and returns its start instance location.
    ///
    /// If either buffer would overflow, both rotate together so the uniform
    /// indices always point into the texture buffer bound next to them. Uniform
    /// blocks are placed at multiples of their own size, as in
    /// [`UniformInstanceBufferManager`](super::UniformInstanceBufferManager).
    ///
    /// # Panics
    ///
    /// Panics if the renderable references a skeleton without bone data, if the
    /// transform and bone data of one renderable exceed the texture buffer size,
    /// or if an instance reference stays unresolved.
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
        let block_alignment = block_size.max(1);

        // A skeleton reference already selected the skinning shader combination.
        let bone_data: &[u8] = match fill.skeleton {
            Some(skeleton) => fill
                .providers
                .skeletons
                .and_then(|skeletons| skeletons.bone_space_data(skeleton))
                .unwrap_or_else(|| {
                    panic!("TextureInstanceBufferManager: unknown skeleton {:?}", skeleton)
                }),
            None => &[],
        };
        let texture_bytes = align_up(TRANSFORM_BLOCK_SIZE + bone_data.len() as u32, PACKAGE_SIZE);
        assert!(
            texture_bytes <= self.texture_scratch.maximum_buffer_size(),
            "TextureInstanceBufferManager: skeleton {:?} needs {} bytes, texture buffers hold {}",
            fill.skeleton,
            texture_bytes,
            self.texture_scratch.maximum_buffer_size()
        );

        if self.uniform_scratch.would_overflow_aligned(block_size, block_alignment)
            || self.texture_scratch.would_overflow(texture_bytes)
        {
            self.uniform_scratch.start_new_buffer(device)?;
            self.texture_scratch.start_new_buffer(device)?;
        }
        let uniform_region = self
            .uniform_scratch
            .acquire_aligned(device, block_size, block_alignment)?;
        let texture_region = self.texture_scratch.acquire(device, texture_bytes)?;
        if self.track_generations() {
            let group = self.resource_group(
                device,
                uniform_region.buffer,
                texture_region.buffer,
                descriptor.root_parameter_index,
            )?;
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
        let instance_indices = [
            texture_region.offset / PACKAGE_SIZE,
            fill.technique.assigned_material_slot(),
            0,
            0,
        ];

        if block_size > 0 {
            self.uniform_staging.resize(block_size as usize, 0);
            pack_element_properties(
                &layout,
                &descriptor.element_properties,
                fill.global_material_properties,
                fill.blueprint.properties(),
                &mut self.uniform_staging,
                |property, reference, out| {
                    if reference == builtin::INSTANCE_INDICES_ARRAY {
                        out[..16].copy_from_slice(bytemuck::bytes_of(&instance_indices));
                        return;
                    }
                    let resolved = fill.providers.instance_references.is_some_and(|resolver| {
                        resolver.resolve_instance_reference(property, reference, &reference_context, out)
                    });
                    assert!(
                        resolved,
                        "TextureInstanceBufferManager: unresolved instance reference {:?} of property {:?}",
                        reference,
                        property.id()
                    );
                },
            );
            uniform_region.write(device, 0, &self.uniform_staging)?;
        }

        let position = fill.transform.camera_relative_position(camera_world_position);
        let rotation = fill.transform.rotation;
        let scale = fill.transform.scale;
        #[rustfmt::skip]
        let transform: [f32; 12] = [
            position.x, position.y, position.z, 0.0,
            rotation.x, rotation.y, rotation.z, rotation.w,
            scale.x, scale.y, scale.z, 0.0,
        ];
        self.texture_staging.clear();
        self.texture_staging.extend_from_slice(bytemuck::bytes_of(&transform));
        self.texture_staging.extend_from_slice(bone_data);
        self.texture_staging.resize(texture_bytes as usize, 0);
        texture_region.write(device, 0, &self.texture_staging)?;

        Ok(uniform_region.offset.checked_div(block_size).unwrap_or(0))
    }

    pub fn on_pre_command_buffer_execution(
        &mut self,
        device: &dyn GraphicsDevice,
    ) -> Result<(), ResourceError> {
        self.uniform_scratch.on_pre_command_buffer_execution(device)?;
        self.texture_scratch.on_pre_command_buffer_execution(device)
    }

    pub fn destroy(self, device: &dyn GraphicsDevice) {
        for group in self.resource_groups.into_values() {
            if let Err(error) = device.destroy_resource_group(group) {
                log::warn!(
                    "TextureInstanceBufferManager: failed to destroy resource group {:?}: {}",
                    group,
                    error
                );
            }
        }
        self.uniform_scratch.destroy(device);
        self.texture_scratch.destroy(device);
    }

    fn track_generations(&mut self) -> bool {
        let generations = (
            self.uniform_scratch.buffer_generation(),
            self.texture_scratch.buffer_generation(),
        );
        if generations == self.tracked_buffer_generations {
            return false;
        }
        self.tracked_buffer_generations = generations;
        true
    }

    fn resource_group(
        &mut self,
        device: &dyn GraphicsDevice,
        uniform_buffer: BufferId,
        texture_buffer: BufferId,
        root_parameter_index: u32,
    ) -> Result<ResourceGroupId, ResourceError> {
        let key = (uniform_buffer, texture_buffer, root_parameter_index);
        if let Some(&group) = self.resource_groups.get(&key) {
            return Ok(group);
        }
        let group = device.create_resource_group(&ResourceGroupDescriptor {
            label: Some(Cow::Borrowed("texture instance buffer")),
            root_parameter_index,
            resources: &[
                ResourceGroupResource::UniformBuffer(uniform_buffer),
                ResourceGroupResource::TextureBuffer(texture_buffer),
            ],
        })?;
        log::debug!(
            "TextureInstanceBufferManager: created resource group {:?} for buffers {:?}/{:?}",
            group,
            uniform_buffer,
            texture_buffer
        );
        self.resource_groups.insert(key, group);
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ExternalProviders;
    use glam::{DVec3, Quat, Vec3};
    use strata_core::material::{
        MaterialBlueprintId, MaterialProperties, MaterialProperty, MaterialPropertyId,
        MaterialPropertyUsage, MaterialPropertyValue, MaterialTechniqueId, SkeletonResourceId,
    };
    use strata_core::renderer::{HeadlessGraphicsDevice, PipelineKind, SkeletonProvider};
    use strata_core::scene::Transform;
    use strata_data::{
        InstanceBufferDescriptor, InstanceBufferKind, MaterialBlueprintResource, MaterialTechnique,
        ShaderCombinationPipelineCache,
    };

    struct OneSkeleton(Vec<u8>);

    impl SkeletonProvider for OneSkeleton {
        fn bone_space_data(&self, skeleton: SkeletonResourceId) -> Option<&[u8]> {
            (skeleton == SkeletonResourceId(1)).then_some(self.0.as_slice())
        }
    }

    fn blueprint() -> MaterialBlueprintResource {
        blueprint_with(Vec::new())
    }

    /// Instance indices first, followed by `extra` element properties.
    fn blueprint_with(extra: Vec<MaterialProperty>) -> MaterialBlueprintResource {
        let mut element_properties = vec![MaterialProperty::new_reference(
            builtin::INSTANCE_INDICES_ARRAY,
            MaterialPropertyUsage::InstanceReference,
            MaterialPropertyValue::Integer4([0; 4]),
            builtin::INSTANCE_INDICES_ARRAY,
        )];
        element_properties.extend(extra);
        MaterialBlueprintResource::new(
            PipelineKind::Graphics,
            MaterialProperties::new(),
            Box::new(ShaderCombinationPipelineCache::new()),
        )
        .with_instance_buffer(InstanceBufferDescriptor {
            kind: InstanceBufferKind::Texture,
            root_parameter_index: 1,
            element_properties,
        })
    }

    fn fill_with_skeleton<'a>(
        blueprint: &'a MaterialBlueprintResource,
        globals: &'a MaterialProperties,
        technique: &'a MaterialTechnique,
        providers: &'a ExternalProviders<'a>,
        skeleton: SkeletonResourceId,
    ) -> InstanceFill<'a> {
        InstanceFill {
            blueprint,
            global_material_properties: globals,
            technique,
            transform: &Transform::IDENTITY,
            skeleton: Some(skeleton),
            providers,
        }
    }

    #[test]
    fn test_indices_point_at_transform_and_bones() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = TextureInstanceBufferManager::new(&device, 1024, 4096);
        let blueprint = blueprint();
        let technique = MaterialTechnique::new(MaterialTechniqueId::new("Default"), MaterialBlueprintId(0))
            .with_assigned_material_slot(5);
        let skeleton = OneSkeleton(vec![1u8; 64]);
        let providers = ExternalProviders {
            skeletons: Some(&skeleton),
            ..ExternalProviders::default()
        };
        let globals = MaterialProperties::new();
        let transform = Transform::new(DVec3::new(4.0, 5.0, 6.0), Quat::IDENTITY, Vec3::splat(2.0));
        let skinned = InstanceFill {
            blueprint: &blueprint,
            global_material_properties: &globals,
            technique: &technique,
            transform: &transform,
            skeleton: Some(SkeletonResourceId(1)),
            providers: &providers,
        };
        let rigid = InstanceFill {
            skeleton: None,
            ..skinned
        };
        let mut context = CompositorContextData::new(DVec3::new(1.0, 1.0, 1.0), false);
        let mut command_buffer = CommandBuffer::new();

        manager
            .startup_buffer_filling(&device, &skinned, &mut context, &mut command_buffer)
            .unwrap();
        assert_eq!(manager.fill_buffer(&device, &skinned, &mut context, &mut command_buffer).unwrap(), 0);
        assert_eq!(manager.fill_buffer(&device, &rigid, &mut context, &mut command_buffer).unwrap(), 1);

        let uniform = device
            .buffer_contents(manager.uniform_scratch().current_buffer().unwrap())
            .unwrap();
        let indices: &[u32] = bytemuck::cast_slice(&uniform[..32]);
        // The skinned instance uses 48 + 64 bytes, i.e. seven float4.
        assert_eq!(indices, &[0, 5, 0, 0, 7, 5, 0, 0]);

        let texture = device
            .buffer_contents(manager.texture_scratch().current_buffer().unwrap())
            .unwrap();
        let values: &[f32] = bytemuck::cast_slice(&texture[..48]);
        assert_eq!(
            values,
            &[3.0, 4.0, 5.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 0.0]
        );
        assert!(texture[48..112].iter().all(|&byte| byte == 1));

        manager.on_pre_command_buffer_execution(&device).unwrap();
        manager.destroy(&device);
        assert_eq!(device.live_buffer_count(), 0);
    }

    #[test]
    fn test_both_buffers_rotate_together() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = TextureInstanceBufferManager::new(&device, 1024, 96);
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
        let first_uniform = manager.uniform_scratch().current_buffer();
        let locations: Vec<u32> = (0..3)
            .map(|_| {
                manager
                    .fill_buffer(&device, &fill, &mut context, &mut command_buffer)
                    .unwrap()
            })
            .collect();

        assert_eq!(locations, vec![0, 1, 0]);
        assert_ne!(manager.uniform_scratch().current_buffer(), first_uniform);
        assert_eq!(manager.uniform_scratch().buffer_generation(), 2);
        assert_eq!(manager.texture_scratch().buffer_generation(), 2);
        assert_eq!(command_buffer.len(), 2);
        manager.on_pre_command_buffer_execution(&device).unwrap();
        manager.destroy(&device);
    }

    #[test]
    #[should_panic(expected = "texture buffers hold")]
    fn test_oversized_skeleton_panics() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = TextureInstanceBufferManager::new(&device, 1024, 64);
        let blueprint = blueprint();
        let technique = MaterialTechnique::new(MaterialTechniqueId::new("Default"), MaterialBlueprintId(0));
        let skeleton = OneSkeleton(vec![0u8; 64]);
        let providers = ExternalProviders {
            skeletons: Some(&skeleton),
            ..ExternalProviders::default()
        };
        let globals = MaterialProperties::new();
        let fill = InstanceFill {
            blueprint: &blueprint,
            global_material_properties: &globals,
            technique: &technique,
            transform: &Transform::IDENTITY,
            skeleton: Some(SkeletonResourceId(1)),
            providers: &providers,
        };
        let mut context = CompositorContextData::new(DVec3::ZERO, false);
        let _ = manager.fill_buffer(&device, &fill, &mut context, &mut CommandBuffer::new());
    }

    #[test]
    #[should_panic(expected = "unknown skeleton")]
    fn test_skeleton_without_provider_panics() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = TextureInstanceBufferManager::new(&device, 1024, 4096);
        let blueprint = blueprint();
        let technique = MaterialTechnique::new(MaterialTechniqueId::new("Default"), MaterialBlueprintId(0));
        let providers = ExternalProviders::default();
        let globals = MaterialProperties::new();
        let fill = fill_with_skeleton(&blueprint, &globals, &technique, &providers, SkeletonResourceId(2));
        let mut context = CompositorContextData::new(DVec3::ZERO, false);
        let _ = manager.fill_buffer(&device, &fill, &mut context, &mut CommandBuffer::new());
    }

    #[test]
    #[should_panic(expected = "unknown skeleton")]
    fn test_skeleton_unknown_to_provider_panics() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = TextureInstanceBufferManager::new(&device, 1024, 4096);
        let blueprint = blueprint();
        let technique = MaterialTechnique::new(MaterialTechniqueId::new("Default"), MaterialBlueprintId(0));
        let skeleton = OneSkeleton(vec![0u8; 64]);
        let providers = ExternalProviders {
            skeletons: Some(&skeleton),
            ..ExternalProviders::default()
        };
        let globals = MaterialProperties::new();
        let fill = fill_with_skeleton(&blueprint, &globals, &technique, &providers, SkeletonResourceId(2));
        let mut context = CompositorContextData::new(DVec3::ZERO, false);
        let _ = manager.fill_buffer(&device, &fill, &mut context, &mut CommandBuffer::new());
    }

    #[test]
    fn test_locations_index_uniform_blocks_of_mixed_layouts() {
        let device = HeadlessGraphicsDevice::new();
        let mut manager = TextureInstanceBufferManager::new(&device, 1024, 4096);
        let narrow = blueprint();
        let wide = blueprint_with(vec![MaterialProperty::new(
            MaterialPropertyId::new("Tint"),
            MaterialPropertyUsage::Static,
            MaterialPropertyValue::Float4([9.0; 4]),
        )]);
        let technique = MaterialTechnique::new(MaterialTechniqueId::new("Default"), MaterialBlueprintId(0));
        let providers = ExternalProviders::default();
        let globals = MaterialProperties::new();
        let narrow_fill = InstanceFill {
            blueprint: &narrow,
            global_material_properties: &globals,
            technique: &technique,
            transform: &Transform::IDENTITY,
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
        let locations: Vec<u32> = [&narrow_fill, &wide_fill, &narrow_fill]
            .into_iter()
            .map(|fill| {
                manager
                    .fill_buffer(&device, fill, &mut context, &mut command_buffer)
                    .unwrap()
            })
            .collect();

        assert_eq!(locations, vec![0, 1, 4]);
        let uniform = device
            .buffer_contents(manager.uniform_scratch().current_buffer().unwrap())
            .unwrap();
        // Each instance starts three float4 further into the texture buffer.
        for (location, block_size, texture_start) in [(0, 16, 0), (1, 32, 3), (4, 16, 6)] {
            let start = location * block_size;
            let indices: &[u32] = bytemuck::cast_slice(&uniform[start..start + 16]);
            assert_eq!(indices[0], texture_start);
        }

        manager.on_pre_command_buffer_execution(&device).unwrap();
        manager.destroy(&device);
    }
}
