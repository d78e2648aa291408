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

use strata_core::material::builtin;
use strata_core::material::{
    MaterialProperties, MaterialProperty, MaterialPropertyUsage, MaterialPropertyValue,
};
use strata_core::renderer::VertexArrayId;
use strata_core::scene::Transform;
use strata_data::{
    MaterialResource, MaterialResourceManager, Renderable, RenderableManager, RenderableManagerId,
};

// --- Test Setup ---
fn material_with_queue_index(render_queue_index: i32, cast_shadows: bool) -> MaterialResource {
    MaterialResource::new(MaterialProperties::from_properties([
        MaterialProperty::new(
            builtin::RENDER_QUEUE_INDEX,
            MaterialPropertyUsage::Static,
            MaterialPropertyValue::Integer(render_queue_index),
        ),
        MaterialProperty::new(
            builtin::CAST_SHADOWS,
            MaterialPropertyUsage::Static,
            MaterialPropertyValue::Boolean(cast_shadows),
        ),
    ]))
}

fn manager_with_renderables(id: u32, count: u32) -> RenderableManager {
    let mut manager = RenderableManager::new(RenderableManagerId(id), Transform::IDENTITY);
    for index in 0..count {
        manager.push_renderable(Renderable::indexed(VertexArrayId(index as usize), 0, 36));
    }
    manager
}
// ---

#[test]
fn test_attachment_copies_material_data() {
    // --- 1. ARRANGE ---
    let mut materials = MaterialResourceManager::new();
    let opaque = materials.add(material_with_queue_index(2, true));
    let mut manager = manager_with_renderables(0, 1);

    // --- 2. ACT ---
    let fixup = manager.set_renderable_material_resource_id(0, Some(opaque), &mut materials);

    // --- 3. ASSERT ---
    assert!(fixup.is_none());
    let renderable = manager.renderable(0).unwrap();
    assert_eq!(renderable.material_resource_id(), Some(opaque));
    assert_eq!(renderable.material_attachment(), Some(0));
    assert_eq!(renderable.render_queue_index(), 2);
    assert!(renderable.cast_shadows());
    assert_eq!(manager.minimum_render_queue_index(), 2);
    assert_eq!(manager.maximum_render_queue_index(), 2);
    assert!(manager.cast_shadows());
}

#[test]
fn test_detach_fixes_up_moved_renderable_in_same_manager() {
    // --- 1. ARRANGE ---
    let mut materials = MaterialResourceManager::new();
    let material = materials.add(material_with_queue_index(0, false));
    let mut manager = manager_with_renderables(0, 3);
    for index in 0..3 {
        manager.set_renderable_material_resource_id(index, Some(material), &mut materials);
    }

    // --- 2. ACT ---
    let fixup = manager.set_renderable_material_resource_id(0, None, &mut materials);

    // --- 3. ASSERT ---
    assert!(fixup.is_none(), "fixups addressed to self are applied locally");
    let attached = materials.get(material).unwrap().attached_renderables();
    assert_eq!(attached.len(), 2);
    assert_eq!(attached[0].renderable_index, 2);
    assert_eq!(manager.renderable(2).unwrap().material_attachment(), Some(0));
    assert_eq!(manager.renderable(1).unwrap().material_attachment(), Some(1));
    assert_eq!(manager.renderable(0).unwrap().material_attachment(), None);
}

#[test]
fn test_detach_returns_fixup_for_other_manager() {
    // --- 1. ARRANGE ---
    let mut materials = MaterialResourceManager::new();
    let material = materials.add(material_with_queue_index(0, false));
    let mut first = manager_with_renderables(0, 1);
    let mut second = manager_with_renderables(1, 1);
    first.set_renderable_material_resource_id(0, Some(material), &mut materials);
    second.set_renderable_material_resource_id(0, Some(material), &mut materials);

    // --- 2. ACT ---
    let fixup = first
        .set_renderable_material_resource_id(0, None, &mut materials)
        .expect("the renderable of the second manager moved");
    second.apply_attachment_fixup(fixup);

    // --- 3. ASSERT ---
    assert_eq!(fixup.key.manager, RenderableManagerId(1));
    assert_eq!(fixup.slot, 0);
    assert_eq!(second.renderable(0).unwrap().material_attachment(), Some(0));
}

#[test]
fn test_release_materials_empties_attachments() {
    let mut materials = MaterialResourceManager::new();
    let material = materials.add(material_with_queue_index(1, false));
    let mut manager = manager_with_renderables(3, 4);
    for index in 0..4 {
        manager.set_renderable_material_resource_id(index, Some(material), &mut materials);
    }

    let external = manager.release_materials(&mut materials);

    assert!(external.is_empty());
    assert!(materials.get(material).unwrap().attached_renderables().is_empty());
}

#[test]
fn test_lod_selection_exposes_one_range() {
    let mut manager = manager_with_renderables(0, 6);
    manager.set_number_of_lods(3);

    manager.set_lod_index(1);
    assert_eq!(manager.lod_renderables_range(), 2..4);
    assert_eq!(manager.lod_renderables_mut().len(), 2);

    manager.set_lod_index(2);
    assert_eq!(manager.lod_renderables_range(), 4..6);
}

#[test]
fn test_material_property_change_refreshes_aggregates() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut materials = MaterialResourceManager::new();
    let material = materials.add(material_with_queue_index(1, false));
    let mut manager = manager_with_renderables(0, 1);
    manager.set_renderable_material_resource_id(0, Some(material), &mut materials);

    let changed = materials.get_mut(material).unwrap().set_property_value(
        builtin::RENDER_QUEUE_INDEX,
        MaterialPropertyValue::Integer(5),
        MaterialPropertyUsage::Static,
    );
    assert!(changed);
    assert!(MaterialResource::affects_cached_renderable_data(
        builtin::RENDER_QUEUE_INDEX
    ));
    manager.update_cached_renderables_data(&materials);

    assert_eq!(manager.renderable(0).unwrap().render_queue_index(), 5);
    assert_eq!(manager.maximum_render_queue_index(), 5);
}
