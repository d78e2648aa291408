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

//! The 16-byte packing rule of per-instance data and the element property writer.
//!
//! A value never straddles a 16-byte package: when it would, it starts at the next
//! package boundary instead. Values larger than a package start on a boundary.

use smallvec::SmallVec;
use strata_core::material::{
    MaterialProperties, MaterialProperty, MaterialPropertyId, MaterialPropertyUsage,
};

/// Size of one shader constant package.
pub const PACKAGE_SIZE: u32 = 16;

/// Rounds `value` up to a multiple of `alignment`, which must be a power of two.
pub const fn align_up(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}

/// Offset at which a value of `number_of_bytes` is placed when the cursor is at `cursor`.
pub const fn packed_offset(cursor: u32, number_of_bytes: u32) -> u32 {
    let in_package = cursor % PACKAGE_SIZE;
    if in_package != 0 && in_package + number_of_bytes > PACKAGE_SIZE {
        align_up(cursor, PACKAGE_SIZE)
    } else {
        cursor
    }
}

/// Where each element property of an instance block lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLayout {
    offsets: SmallVec<[u32; 8]>,
    block_size: u32,
}

impl ElementLayout {
    /// Lays out `properties` in order. The block is padded to whole packages.
    pub fn new(properties: &[MaterialProperty]) -> Self {
        let mut offsets = SmallVec::with_capacity(properties.len());
        let mut cursor = 0;
        for property in properties {
            let number_of_bytes = property.value().number_of_bytes();
            let offset = packed_offset(cursor, number_of_bytes);
            offsets.push(offset);
            cursor = offset + number_of_bytes;
        }
        Self {
            offsets,
            block_size: align_up(cursor, PACKAGE_SIZE),
        }
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Bytes of one instance block.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }
}

/// Writes one instance block into `out`.
///
/// `resolve_instance_reference` receives each instance reference property, the
/// referenced id and the exact slice to fill.
///
/// # Panics
///
/// Panics if a global reference resolves neither against `global_material_properties`
/// nor against `blueprint_properties`.
pub(crate) fn pack_element_properties(
    layout: &ElementLayout,
    properties: &[MaterialProperty],
    global_material_properties: &MaterialProperties,
    blueprint_properties: &MaterialProperties,
    out: &mut [u8],
    mut resolve_instance_reference: impl FnMut(&MaterialProperty, MaterialPropertyId, &mut [u8]),
) {
    out.fill(0);
    for (property, &offset) in properties.iter().zip(layout.offsets()) {
        let start = offset as usize;
        let slot = &mut out[start..start + property.value().number_of_bytes() as usize];
        match (property.usage(), property.reference_value()) {
            (MaterialPropertyUsage::InstanceReference, Some(reference)) => {
                resolve_instance_reference(property, reference, slot);
            }
            (MaterialPropertyUsage::GlobalReference, Some(reference)) => {
                let resolved = global_material_properties
                    .property_by_id(reference)
                    .or_else(|| blueprint_properties.property_by_id(reference))
                    .unwrap_or_else(|| {
                        panic!(
                            "Instance property {:?}: global reference {:?} resolves neither globally nor in the blueprint",
                            property.id(),
                            reference
                        )
                    });
                assert_eq!(
                    resolved.value().value_type(),
                    property.value().value_type(),
                    "Instance property {:?}: global reference {:?} has a different type",
                    property.id(),
                    reference
                );
                resolved.value().write_bytes(slot);
            }
            _ => property.value().write_bytes(slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::material::MaterialPropertyValue;

    fn property(name: &str, value: MaterialPropertyValue) -> MaterialProperty {
        MaterialProperty::new(MaterialPropertyId::new(name), MaterialPropertyUsage::Static, value)
    }

    #[test]
    fn test_values_do_not_straddle_packages() {
        assert_eq!(packed_offset(0, 12), 0);
        assert_eq!(packed_offset(12, 4), 12);
        assert_eq!(packed_offset(12, 8), 16);
        assert_eq!(packed_offset(4, 64), 16);
        assert_eq!(packed_offset(16, 64), 16);
    }

    #[test]
    fn test_layout_pads_block_to_package() {
        let layout = ElementLayout::new(&[
            property("a", MaterialPropertyValue::Float3([0.0; 3])),
            property("b", MaterialPropertyValue::Float2([0.0; 2])),
            property("c", MaterialPropertyValue::Float(0.0)),
        ]);
        assert_eq!(layout.offsets(), &[0, 16, 24]);
        assert_eq!(layout.block_size(), 32);
    }

    #[test]
    fn test_global_reference_falls_back_to_blueprint() {
        let reference = MaterialPropertyId::new("Tint");
        let properties = [MaterialProperty::new_reference(
            MaterialPropertyId::new("InstanceTint"),
            MaterialPropertyUsage::GlobalReference,
            MaterialPropertyValue::Float(0.0),
            reference,
        )];
        let blueprint = MaterialProperties::from_properties([MaterialProperty::new(
            reference,
            MaterialPropertyUsage::Static,
            MaterialPropertyValue::Float(2.5),
        )]);
        let layout = ElementLayout::new(&properties);
        let mut out = vec![0xff; layout.block_size() as usize];

        pack_element_properties(
            &layout,
            &properties,
            &MaterialProperties::new(),
            &blueprint,
            &mut out,
            |_, _, _| unreachable!(),
        );

        assert_eq!(&out[..4], &2.5f32.to_ne_bytes());
        assert!(out[4..].iter().all(|&byte| byte == 0));
    }

    #[test]
    #[should_panic(expected = "resolves neither")]
    fn test_unresolved_global_reference_panics() {
        let properties = [MaterialProperty::new_reference(
            MaterialPropertyId::new("InstanceTint"),
            MaterialPropertyUsage::GlobalReference,
            MaterialPropertyValue::Float(0.0),
            MaterialPropertyId::new("Missing"),
        )];
        let layout = ElementLayout::new(&properties);
        let mut out = vec![0; layout.block_size() as usize];
        pack_element_properties(
            &layout,
            &properties,
            &MaterialProperties::new(),
            &MaterialProperties::new(),
            &mut out,
            |_, _, _| {},
        );
    }
}
