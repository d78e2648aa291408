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

//! Material resources, techniques and blueprints.

mod blueprint;
mod managers;
mod pipeline_cache;
mod resource;
mod technique;

pub use self::blueprint::{InstanceBufferDescriptor, InstanceBufferKind, MaterialBlueprintResource};
pub use self::managers::{MaterialBlueprintResourceManager, MaterialResourceManager};
pub use self::pipeline_cache::ShaderCombinationPipelineCache;
pub use self::resource::MaterialResource;
pub use self::technique::MaterialTechnique;
