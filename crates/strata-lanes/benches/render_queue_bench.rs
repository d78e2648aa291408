use criterion::{criterion_group, criterion_main, Criterion};
use glam::DVec3;
use std::hint::black_box;
use strata_core::material::{
    builtin, MaterialProperties, MaterialProperty, MaterialPropertyUsage, MaterialPropertyValue,
    MaterialTechniqueId, ShaderProperties,
};
use strata_core::renderer::{
    CommandBuffer, CompositorContextData, GraphicsPipelineStateId, HeadlessGraphicsDevice,
    PipelineKind, PipelineState, VertexArrayId,
};
use strata_core::scene::Transform;
use strata_data::{
    MaterialBlueprintResource, MaterialBlueprintResourceManager, MaterialResource,
    MaterialResourceManager, MaterialTechnique, Renderable, RenderableManager,
    RenderableManagerId, ShaderCombinationPipelineCache,
};
use strata_lanes::sorting::{opaque_sorting_key, transparent_sorting_key};
use strata_lanes::{
    ExternalProviders, RenderQueue, RenderQueueDescriptor, RenderQueueResources,
    ScratchBufferBudgets,
};

fn bench_sorting_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sorting Keys");

    group.bench_function("Opaque (10k)", |b| {
        b.iter(|| {
            let mut accumulated = 0u64;
            for i in 0..10_000u64 {
                accumulated ^= opaque_sorting_key(i % 64, i % 256, 0, i as f32 * 0.25);
            }
            black_box(accumulated)
        });
    });

    group.bench_function("Transparent (10k)", |b| {
        b.iter(|| {
            let mut accumulated = 0u64;
            for i in 0..10_000u64 {
                accumulated ^= transparent_sorting_key(i % 64, i % 256, 0, i as f32 * 0.25);
            }
            black_box(accumulated)
        });
    });

    group.finish();
}

fn bench_render_queue(c: &mut Criterion) {
    let device = HeadlessGraphicsDevice::new();
    let cache = ShaderCombinationPipelineCache::new();
    let technique_id = MaterialTechniqueId::new("Forward");
    let mut blueprints = MaterialBlueprintResourceManager::new();
    let mut materials = MaterialResourceManager::new();

    // 16 materials on 16 pipeline states, spread over 4 render queue indices.
    let mut material_ids = Vec::new();
    for i in 0..16u32 {
        cache.insert_compiled(
            i,
            ShaderProperties::new(),
            PipelineState::Graphics(GraphicsPipelineStateId(i as usize)),
        );
        material_ids.push(i);
    }
    let blueprint_id = blueprints.add(MaterialBlueprintResource::new(
        PipelineKind::Graphics,
        MaterialProperties::new(),
        Box::new(cache),
    ));
    let material_ids: Vec<_> = material_ids
        .into_iter()
        .map(|hash| {
            materials.add(
                MaterialResource::new(MaterialProperties::from_properties([MaterialProperty::new(
                    builtin::RENDER_QUEUE_INDEX,
                    MaterialPropertyUsage::Static,
                    MaterialPropertyValue::Integer((hash % 4) as i32),
                )]))
                .with_technique(
                    MaterialTechnique::new(technique_id, blueprint_id)
                        .with_serialized_pipeline_state_hash(hash),
                ),
            )
        })
        .collect();

    // Setup 1,000 managers with 4 renderables each
    let mut managers: Vec<_> = (0..1_000u32)
        .map(|i| {
            let mut manager = RenderableManager::new(
                RenderableManagerId(i),
                Transform::from_position(DVec3::new(f64::from(i), 0.0, 0.0)),
            );
            for j in 0..4u32 {
                let index = manager.push_renderable(Renderable::indexed(
                    VertexArrayId(((i + j) % 32) as usize),
                    0,
                    36,
                ));
                let material = material_ids[((i * 4 + j) % 16) as usize];
                manager.set_renderable_material_resource_id(index, Some(material), &mut materials);
            }
            manager.set_cached_distance_to_camera(i as f32);
            manager
        })
        .collect();

    let mut resources = RenderQueueResources::new(&device, &ScratchBufferBudgets::default());
    let mut queue = RenderQueue::new(RenderQueueDescriptor::default());
    let providers = ExternalProviders::default();
    let mut command_buffer = CommandBuffer::new();

    let mut group = c.benchmark_group("Render Queue");

    group.bench_function("Add + Fill (4k renderables)", |b| {
        b.iter(|| {
            let mut context = CompositorContextData::new(DVec3::ZERO, false);
            queue.clear();
            for manager in &mut managers {
                queue.add_renderables_from_renderable_manager(
                    manager,
                    technique_id,
                    &materials,
                    &blueprints,
                    &context,
                    false,
                );
            }
            command_buffer.clear();
            queue
                .fill_graphics_command_buffer(
                    &device,
                    &mut resources,
                    &materials,
                    &mut blueprints,
                    &providers,
                    &mut context,
                    &mut command_buffer,
                )
                .unwrap();
            resources.on_pre_command_buffer_execution(&device).unwrap();
            black_box(command_buffer.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_sorting_keys, bench_render_queue);
criterion_main!(benches);
