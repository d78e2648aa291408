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

use crate::material::ShaderProperties;
use crate::renderer::api::{PipelineKind, PipelineState};
use std::fmt::Debug;

/// A request for the pipeline state matching one shader combination.
#[derive(Debug, Clone, Copy)]
pub struct PipelineStateRequest<'a> {
    /// Which kind of pipeline is requested.
    pub kind: PipelineKind,
    /// The optimized shader properties selecting the combination.
    pub shader_properties: &'a ShaderProperties,
    /// Hash of the serialized fixed-function state. Always zero for compute.
    pub serialized_pipeline_state_hash: u32,
}

/// The answer of a [`PipelineStateCacheManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStateLookup {
    /// The pipeline state to bind.
    pub pipeline_state: PipelineState,
    /// `true` while the requested combination is still being compiled and
    /// `pipeline_state` is a placeholder.
    pub is_fallback: bool,
}

/// The blueprint-level cache of compiled shader combinations.
///
/// Compilation is asynchronous: until a combination is ready a manager may
/// answer with a fallback state, or with nothing at all.
pub trait PipelineStateCacheManager: Debug {
    /// Looks up, or starts compiling, the pipeline state for `request`.
    fn request_pipeline_state(&self, request: &PipelineStateRequest<'_>)
        -> Option<PipelineStateLookup>;
}

impl<T: PipelineStateCacheManager + ?Sized> PipelineStateCacheManager for std::sync::Arc<T> {
    fn request_pipeline_state(
        &self,
        request: &PipelineStateRequest<'_>,
    ) -> Option<PipelineStateLookup> {
        (**self).request_pipeline_state(request)
    }
}
