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

//! Shader properties: the integer switches selecting one shader combination.

use super::ShaderPropertyId;

/// A sorted set of `(shader property, value)` pairs.
///
/// Two equal sets select the same shader combination, so the type is hashable
/// and can key pipeline state caches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderProperties {
    sorted_properties: Vec<(ShaderPropertyId, i32)>,
}

impl ShaderProperties {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property value, inserting it if missing.
    pub fn set_property_value(&mut self, id: ShaderPropertyId, value: i32) {
        match self.sorted_properties.binary_search_by_key(&id, |(id, _)| *id) {
            Ok(index) => self.sorted_properties[index].1 = value,
            Err(index) => self.sorted_properties.insert(index, (id, value)),
        }
    }

    /// The value of a property.
    pub fn property_value(&self, id: ShaderPropertyId) -> Option<i32> {
        self.sorted_properties
            .binary_search_by_key(&id, |(id, _)| *id)
            .ok()
            .map(|index| self.sorted_properties[index].1)
    }

    /// Returns `true` if the property is present.
    pub fn has_property(&self, id: ShaderPropertyId) -> bool {
        self.property_value(id).is_some()
    }

    /// Keeps only the properties for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(ShaderPropertyId, i32) -> bool) {
        self.sorted_properties.retain(|(id, value)| keep(*id, *value));
    }

    /// Removes every property.
    pub fn clear(&mut self) {
        self.sorted_properties.clear();
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.sorted_properties.len()
    }

    /// Returns `true` if no property is set.
    pub fn is_empty(&self) -> bool {
        self.sorted_properties.is_empty()
    }

    /// Iterates over the pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderPropertyId, i32)> + '_ {
        self.sorted_properties.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = ShaderPropertyId::new("UseGpuSkinning");
        let b = ShaderPropertyId::new("UseAlphaMap");

        let mut first = ShaderProperties::new();
        first.set_property_value(a, 1);
        first.set_property_value(b, 0);
        let mut second = ShaderProperties::new();
        second.set_property_value(b, 0);
        second.set_property_value(a, 1);

        assert_eq!(first, second);
        assert_eq!(first.property_value(a), Some(1));
    }

    #[test]
    fn test_retain() {
        let mut properties = ShaderProperties::new();
        properties.set_property_value(ShaderPropertyId::new("A"), 0);
        properties.set_property_value(ShaderPropertyId::new("B"), 2);
        properties.retain(|_, value| value != 0);

        assert_eq!(properties.len(), 1);
        assert!(properties.has_property(ShaderPropertyId::new("B")));
    }
}
