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

//! A pipeline state cache keyed by serialized pipeline state and shader combination.

use ahash::AHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use strata_core::material::ShaderProperties;
use strata_core::renderer::{
    PipelineState, PipelineStateCacheManager, PipelineStateLookup, PipelineStateRequest,
};

/// Serves pipeline states compiled ahead of time, and a fallback while a
/// combination is not compiled yet.
#[derive(Debug, Default)]
pub struct ShaderCombinationPipelineCache {
    compiled: RwLock<AHashMap<u32, AHashMap<ShaderProperties, PipelineState>>>,
    fallback: RwLock<Option<PipelineState>>,
    number_of_requests: AtomicUsize,
}

impl ShaderCombinationPipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compiled pipeline state for a combination.
    pub fn insert_compiled(
        &self,
        serialized_pipeline_state_hash: u32,
        shader_properties: ShaderProperties,
        pipeline_state: PipelineState,
    ) {
        match self.compiled.write() {
            Ok(mut compiled) => {
                compiled
                    .entry(serialized_pipeline_state_hash)
                    .or_default()
                    .insert(shader_properties, pipeline_state);
            }
            Err(_) => log::error!("ShaderCombinationPipelineCache: compiled table lock poisoned"),
        }
    }

    /// Sets the pipeline state returned for combinations not compiled yet.
    pub fn set_fallback(&self, pipeline_state: Option<PipelineState>) {
        match self.fallback.write() {
            Ok(mut fallback) => *fallback = pipeline_state,
            Err(_) => log::error!("ShaderCombinationPipelineCache: fallback lock poisoned"),
        }
    }

    /// How many requests were served, hits and misses alike.
    pub fn number_of_requests(&self) -> usize {
        self.number_of_requests.load(Ordering::Relaxed)
    }
}

impl PipelineStateCacheManager for ShaderCombinationPipelineCache {
    fn request_pipeline_state(
        &self,
        request: &PipelineStateRequest<'_>,
    ) -> Option<PipelineStateLookup> {
        self.number_of_requests.fetch_add(1, Ordering::Relaxed);

        let compiled = match self.compiled.read() {
            Ok(compiled) => compiled
                .get(&request.serialized_pipeline_state_hash)
                .and_then(|combinations| combinations.get(request.shader_properties))
                .copied(),
            Err(_) => {
                log::error!("ShaderCombinationPipelineCache: compiled table lock poisoned");
                None
            }
        };
        if let Some(pipeline_state) = compiled {
            if pipeline_state.kind() == request.kind {
                return Some(PipelineStateLookup {
                    pipeline_state,
                    is_fallback: false,
                });
            }
            log::warn!(
                "ShaderCombinationPipelineCache: cached {:?} does not match requested {:?}",
                pipeline_state,
                request.kind
            );
            return None;
        }

        let fallback = self.fallback.read().ok().and_then(|fallback| *fallback);
        fallback
            .filter(|pipeline_state| pipeline_state.kind() == request.kind)
            .map(|pipeline_state| PipelineStateLookup {
                pipeline_state,
                is_fallback: true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::material::ShaderPropertyId;
    use strata_core::renderer::{GraphicsPipelineStateId, PipelineKind};

    fn request(shader_properties: &ShaderProperties, hash: u32) -> PipelineStateRequest<'_> {
        PipelineStateRequest {
            kind: PipelineKind::Graphics,
            shader_properties,
            serialized_pipeline_state_hash: hash,
        }
    }

    #[test]
    fn test_compiled_combination_is_returned() {
        let cache = ShaderCombinationPipelineCache::new();
        let mut properties = ShaderProperties::new();
        properties.set_property_value(ShaderPropertyId::new("UseGpuSkinning"), 1);
        let state = PipelineState::Graphics(GraphicsPipelineStateId(7));
        cache.insert_compiled(42, properties.clone(), state);

        let lookup = cache.request_pipeline_state(&request(&properties, 42));
        assert_eq!(
            lookup,
            Some(PipelineStateLookup {
                pipeline_state: state,
                is_fallback: false
            })
        );
        assert!(cache
            .request_pipeline_state(&request(&properties, 43))
            .is_none());
        assert_eq!(cache.number_of_requests(), 2);
    }

    #[test]
    fn test_missing_combination_uses_fallback() {
        let cache = ShaderCombinationPipelineCache::new();
        let fallback = PipelineState::Graphics(GraphicsPipelineStateId(1));
        cache.set_fallback(Some(fallback));

        let lookup = cache.request_pipeline_state(&request(&ShaderProperties::new(), 0));
        assert_eq!(lookup.map(|lookup| lookup.is_fallback), Some(true));
    }
}
