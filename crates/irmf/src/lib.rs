//! Fetches an IRMF shader document, parses its JSON preamble and render-pass
//! structure, and materializes a self-consistent project bundle on disk:
//! a README manifest, a vertex/fragment shader pair per pass, a hierarchical
//! `project.toml` wiring pipeline stages, render targets, and textures
//! together, and any referenced binary texture assets.
//!
//! The whole pipeline is exposed as a pure `(reference, destination)` call;
//! UI concerns (dialogs, retry flows, opening the generated project) belong
//! to thin adapters such as the `irmf-import` CLI.

mod document;
mod generate;
mod graph;
mod locator;
mod project;
mod remote;
mod writer;

pub use document::{
    PassOutput, RenderPass, Sampler, ShaderDocument, ShaderInput, ShaderMetadata, SINGLE_PASS_NAME,
};
pub use generate::{
    build_artifacts, fragment_shader, readme, AssetArtifact, ProjectArtifacts, VERTEX_SHADER,
    VERTEX_SHADER_PATH,
};
pub use graph::{Binding, RenderTarget, ResourceGraph, TextureResource, KEYBOARD_TEXTURE_NAME};
pub use locator::resolve_raw_url;
pub use project::{
    BindEntry, CameraSettings, Geometry, Objects, PipelineStage, ProjectDocument,
    RenderTextureObject, Settings, TextureObject, Variable,
};
pub use remote::{RawHostClient, RAW_HOST};
pub use writer::{write_project, PROJECT_FILE, README_FILE, SHADERS_DIR};

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Terminal failures of the import pipeline. Each stage surfaces the first
/// error it hits and aborts the invocation; only texture-asset export is
/// best-effort (see [`write_project`]).
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported shader reference '{0}'; expected a github.com or raw.githubusercontent.com link")]
    UnsupportedSource(String),

    #[error("failed to initialise HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("no response from {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned status {status} for {url}")]
    NotFound { url: String, status: u16 },

    #[error("IRMF shader must start with '/*{{'")]
    MalformedHeader,

    #[error("IRMF shader preamble is missing the closing '}}*/'")]
    UnterminatedHeader,

    #[error("invalid JSON preamble: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("shader source reported an error: {0}")]
    Upstream(String),

    #[error("buffer pass '{0}' declares no output")]
    BufferWithoutOutput(String),

    #[error("failed to serialize project document")]
    ProjectSerialize(#[from] toml::ser::Error),

    #[error("failed to write project files")]
    Write(#[from] std::io::Error),
}

/// Imports the IRMF shader behind `reference` into `destination` and returns
/// the path of the generated project document. The reference may be an
/// irmf-editor deep link, a github.com blob URL, or a raw-content URL.
pub fn import(reference: &str, destination: &Path) -> Result<PathBuf, ImportError> {
    let url = locator::resolve_raw_url(reference)?;
    let client = remote::RawHostClient::new()?;
    let body = client.fetch_document(&url)?;
    let text = String::from_utf8_lossy(&body);
    import_document(&text, reference, destination, |src, dest| {
        client.fetch_asset(src, dest)
    })
}

/// Runs the parse/generate/write stages on an already-fetched document.
/// `fetch_asset` supplies the bytes for referenced texture assets; tests
/// inject a stub here instead of touching the network.
pub fn import_document<F>(
    document: &str,
    reference: &str,
    destination: &Path,
    fetch_asset: F,
) -> Result<PathBuf, ImportError>
where
    F: FnMut(&str, &Path) -> anyhow::Result<()>,
{
    let (json, body) = document::split_preamble(document)?;
    let parsed = ShaderDocument::parse(json, body)?;
    let artifacts = generate::build_artifacts(&parsed, reference)?;
    writer::write_project(destination, &artifacts, fetch_asset)
}
