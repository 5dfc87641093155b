//! Derives the transient resource graph from an ordered render-pass list:
//! which names are render targets, which sources are external textures, and
//! which `(pass, slot)` bindings sample each of them. Pure transformation,
//! no network or filesystem access.

use std::collections::HashMap;

use tracing::warn;

use crate::document::{RenderPass, Sampler};
use crate::ImportError;

/// Reserved dedup key for keyboard inputs; the consuming project format
/// expects a single shared keyboard texture under this name.
pub const KEYBOARD_TEXTURE_NAME: &str = "KeyboardTexture";

/// One consumer of a resource: the sampling pass and the texture slot it
/// binds the resource to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub pass: String,
    pub slot: u8,
}

/// An off-screen render target contributed by a `buffer` pass. `id` is the
/// pass's first output identifier, which buffer inputs reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub name: String,
    pub id: i64,
}

/// A distinct externally-sourced texture (or the synthetic keyboard
/// texture), carrying the sampler settings of its first sighting.
#[derive(Debug, Clone)]
pub struct TextureResource {
    pub source: String,
    pub keyboard: bool,
    pub sampler: Sampler,
}

#[derive(Debug, Default)]
pub struct ResourceGraph {
    pub render_targets: Vec<RenderTarget>,
    pub textures: Vec<TextureResource>,
    target_bindings: HashMap<i64, Vec<Binding>>,
    texture_bindings: HashMap<String, Vec<Binding>>,
}

impl ResourceGraph {
    /// Single linear pass over the pipeline in document order; all lists are
    /// distinct-by-first-occurrence.
    pub fn build(passes: &[RenderPass]) -> Result<Self, ImportError> {
        let mut graph = Self::default();
        for pass in passes {
            if pass.pass_type.eq_ignore_ascii_case("buffer") {
                let output = pass
                    .outputs
                    .first()
                    .ok_or_else(|| ImportError::BufferWithoutOutput(pass.name.clone()))?;
                graph.render_targets.push(RenderTarget {
                    name: pass.name.clone(),
                    id: output.id,
                });
            }
            for input in &pass.inputs {
                let binding = Binding {
                    pass: pass.name.clone(),
                    slot: input.channel,
                };
                match input.input_type.to_ascii_lowercase().as_str() {
                    "texture" => {
                        graph.bind_texture(input.source.clone(), false, &input.sampler, binding);
                    }
                    "keyboard" => {
                        graph.bind_texture(
                            KEYBOARD_TEXTURE_NAME.to_string(),
                            true,
                            &input.sampler,
                            binding,
                        );
                    }
                    "buffer" => match input.id {
                        Some(id) => graph.target_bindings.entry(id).or_default().push(binding),
                        None => warn!(
                            pass = %pass.name,
                            channel = input.channel,
                            "buffer input without an id; skipping binding"
                        ),
                    },
                    other => warn!(
                        pass = %pass.name,
                        channel = input.channel,
                        input_type = %other,
                        "ignoring unsupported input type"
                    ),
                }
            }
        }
        for id in graph.dangling_buffer_ids() {
            warn!(id, "buffer input references no render-target output");
        }
        Ok(graph)
    }

    fn bind_texture(&mut self, key: String, keyboard: bool, sampler: &Sampler, binding: Binding) {
        if !self.textures.iter().any(|texture| texture.source == key) {
            self.textures.push(TextureResource {
                source: key.clone(),
                keyboard,
                sampler: sampler.clone(),
            });
        }
        self.texture_bindings.entry(key).or_default().push(binding);
    }

    pub fn target_bindings(&self, id: i64) -> &[Binding] {
        self.target_bindings.get(&id).map_or(&[], Vec::as_slice)
    }

    pub fn texture_bindings(&self, source: &str) -> &[Binding] {
        self.texture_bindings.get(source).map_or(&[], Vec::as_slice)
    }

    /// Buffer-input identifiers that match no render target. The generator
    /// tolerates these (no binding is emitted), but they usually indicate a
    /// broken document.
    pub fn dangling_buffer_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .target_bindings
            .keys()
            .filter(|id| !self.render_targets.iter().any(|target| target.id == **id))
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}
