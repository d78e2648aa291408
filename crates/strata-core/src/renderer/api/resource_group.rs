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

//! Resource groups: opaque bindable aggregates of buffer resources.

use super::buffer::BufferId;
use std::borrow::Cow;

/// An opaque handle to a resource group created by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceGroupId(pub usize);

/// One resource inside a resource group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceGroupResource {
    /// A buffer bound as uniform data.
    UniformBuffer(BufferId),
    /// A buffer bound as a typed texture buffer (float4 elements).
    TextureBuffer(BufferId),
}

/// A descriptor used to create a [`ResourceGroupId`].
#[derive(Debug, Clone)]
pub struct ResourceGroupDescriptor<'a> {
    /// An optional debug label for the group.
    pub label: Option<Cow<'a, str>>,
    /// The root parameter index the group will be bound at.
    pub root_parameter_index: u32,
    /// The resources aggregated by the group, in binding order.
    pub resources: &'a [ResourceGroupResource],
}

/// A resource group together with the root parameter it binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceGroupBinding {
    /// The root parameter index.
    pub root_parameter_index: u32,
    /// The resource group to bind.
    pub resource_group: ResourceGroupId,
}
