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

//! An ID-keyed table of material properties.

use super::{MaterialProperty, MaterialPropertyId, MaterialPropertyUsage, MaterialPropertyValue};

/// Material properties sorted by identifier.
///
/// Lookups are binary searches; tables are small and read far more often than written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialProperties {
    sorted_properties: Vec<MaterialProperty>,
}

impl MaterialProperties {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from properties in any order. Later duplicates win.
    pub fn from_properties(properties: impl IntoIterator<Item = MaterialProperty>) -> Self {
        let mut table = Self::new();
        for property in properties {
            table.set_property(property);
        }
        table
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.sorted_properties.len()
    }

    /// Returns `true` if the table holds no property.
    pub fn is_empty(&self) -> bool {
        self.sorted_properties.is_empty()
    }

    /// The properties, sorted by identifier.
    pub fn sorted_properties(&self) -> &[MaterialProperty] {
        &self.sorted_properties
    }

    /// Looks up a property.
    pub fn property_by_id(&self, id: MaterialPropertyId) -> Option<&MaterialProperty> {
        self.sorted_properties
            .binary_search_by_key(&id, MaterialProperty::id)
            .ok()
            .map(|index| &self.sorted_properties[index])
    }

    /// Inserts or replaces a property.
    ///
    /// Returns the previous property with the same identifier, if any.
    pub fn set_property(&mut self, property: MaterialProperty) -> Option<MaterialProperty> {
        match self
            .sorted_properties
            .binary_search_by_key(&property.id(), MaterialProperty::id)
        {
            Ok(index) => Some(std::mem::replace(
                &mut self.sorted_properties[index],
                property,
            )),
            Err(index) => {
                self.sorted_properties.insert(index, property);
                None
            }
        }
    }

    /// Sets the value of a property, inserting it with `usage` if missing.
    ///
    /// Returns `true` if the stored value changed.
    pub fn set_property_value(
        &mut self,
        id: MaterialPropertyId,
        value: MaterialPropertyValue,
        usage: MaterialPropertyUsage,
    ) -> bool {
        match self
            .sorted_properties
            .binary_search_by_key(&id, MaterialProperty::id)
        {
            Ok(index) => {
                let property = &mut self.sorted_properties[index];
                if *property.value() == value {
                    false
                } else {
                    property.set_value(value);
                    true
                }
            }
            Err(index) => {
                self.sorted_properties
                    .insert(index, MaterialProperty::new(id, usage, value));
                true
            }
        }
    }

    /// Iterates over the properties in identifier order.
    pub fn iter(&self) -> std::slice::Iter<'_, MaterialProperty> {
        self.sorted_properties.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float(name: &str, value: f32) -> MaterialProperty {
        MaterialProperty::new(
            MaterialPropertyId::new(name),
            MaterialPropertyUsage::ShaderUniform,
            MaterialPropertyValue::Float(value),
        )
    }

    #[test]
    fn test_properties_stay_sorted() {
        let table =
            MaterialProperties::from_properties([float("c", 3.0), float("a", 1.0), float("b", 2.0)]);
        let ids: Vec<_> = table.iter().map(MaterialProperty::id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(
            table
                .property_by_id(MaterialPropertyId::new("b"))
                .map(|property| *property.value()),
            Some(MaterialPropertyValue::Float(2.0))
        );
    }

    #[test]
    fn test_set_property_value_reports_changes() {
        let mut table = MaterialProperties::from_properties([float("a", 1.0)]);
        let id = MaterialPropertyId::new("a");

        assert!(!table.set_property_value(
            id,
            MaterialPropertyValue::Float(1.0),
            MaterialPropertyUsage::ShaderUniform
        ));
        assert!(table.set_property_value(
            id,
            MaterialPropertyValue::Float(5.0),
            MaterialPropertyUsage::ShaderUniform
        ));
        assert_eq!(table.len(), 1);
    }
}
