//! Pure artifact synthesis: the README manifest, the fixed vertex shader,
//! per-pass fragment shaders, and the project document. Everything here is
//! deterministic text generation with no external effects; generating twice
//! from the same parsed document yields byte-identical output.

use std::path::PathBuf;

use reqwest::Url;

use crate::document::{RenderPass, ShaderDocument, ShaderMetadata};
use crate::graph::ResourceGraph;
use crate::project::{
    map_filter, map_wrap, system_variables, BindEntry, Geometry, Objects, PipelineStage,
    ProjectDocument, RenderTextureObject, Settings, TextureObject,
};
use crate::ImportError;

/// Path of the shared vertex shader, referenced by every pipeline stage.
pub const VERTEX_SHADER_PATH: &str = "shaders/irmfVS.glsl";

const MATERIAL_COLOR_SLOTS: usize = 16;

pub const VERTEX_SHADER: &str = "\
#version 300 es
out vec4 v_xyz;
void main() {
  gl_Position = projectionMatrix * modelViewMatrix * vec4( position, 1.0 );
  v_xyz = modelMatrix * vec4( position, 1.0 );
}
";

const FRAGMENT_HEADER: &str = "\
#version 300 es
precision highp float;
precision highp int;
uniform vec3 u_ll;
uniform vec3 u_ur;
uniform float u_d;
uniform int u_numMaterials;
";

const FRAGMENT_IO: &str = "\
in vec4 v_xyz;
out vec4 out_FragColor;
";

// Fragments outside the evaluation box are discarded; inside it the model
// entry point runs and its per-material weights blend the material colors.
const FRAGMENT_MAIN: &str = "\
void main() {
	if (any(lessThan(v_xyz.xyz,u_ll))) {
		out_FragColor = vec4(0);
		return;
	}
	if (any(greaterThan(v_xyz.xyz,u_ur))) {
		out_FragColor = vec4(0);
		return;
	}
	vec4 m;
	mainModel4(m, v_xyz.xyz);
	out_FragColor = m.x * u_color1 + m.y * u_color2 + m.z * u_color3 + m.w * u_color4;
}
";

/// Manifest fields, fixed labels in fixed order, one line each, plus the
/// `Link:` line carrying the caller's original (pre-normalization) reference.
pub fn readme(metadata: &ShaderMetadata, reference: &str) -> String {
    let fields: [(&str, &str); 13] = [
        ("Author", &metadata.author),
        ("Copyright", &metadata.copyright),
        ("Date", &metadata.date),
        ("IRMF", &metadata.irmf),
        ("Materials", &metadata.materials),
        ("Max", &metadata.max),
        ("Min", &metadata.min),
        ("Notes", &metadata.notes),
        ("Options", &metadata.options),
        ("Title", &metadata.title),
        ("Units", &metadata.units),
        ("Version", &metadata.version),
        ("Link", reference),
    ];
    let mut out = String::new();
    for (label, value) in fields {
        out.push_str(label);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Wraps a shader body in the fixed fragment template: evaluation-box and
/// material uniforms, the body verbatim, then the fixed `main`.
pub fn fragment_shader(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 1024);
    out.push_str(FRAGMENT_HEADER);
    for slot in 1..=MATERIAL_COLOR_SLOTS {
        out.push_str(&format!("uniform vec4 u_color{slot};\n"));
    }
    out.push_str(FRAGMENT_IO);
    out.push('\n');
    out.push_str(body);
    out.push('\n');
    out.push_str(FRAGMENT_MAIN);
    out
}

pub fn fragment_shader_path(pass_name: &str) -> String {
    format!("shaders/{pass_name}.glsl")
}

/// Destination-relative path an asset source string maps to: the URL path
/// for absolute sources, the source itself otherwise, with query/fragment
/// stripped. Empty, `.`, and `..` segments are dropped so a hostile source
/// cannot climb out of the destination root. Used for both the on-disk
/// destination and the `source` attribute in the project document, keeping
/// the two in sync.
pub fn asset_relative_path(source: &str) -> String {
    let trimmed = source.split(&['?', '#'][..]).next().unwrap_or(source);
    let path = if let Ok(url) = Url::parse(trimmed) {
        url.path().to_string()
    } else {
        trimmed.to_string()
    };
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();
    segments.join("/")
}

/// Assembles the hierarchical project document from the pass list and the
/// derived resource graph.
pub fn project_document(passes: &[RenderPass], graph: &ResourceGraph) -> ProjectDocument {
    let mut pipeline = Vec::new();
    for pass in passes.iter().rev() {
        if pass.pass_type.eq_ignore_ascii_case("common") {
            continue;
        }
        pipeline.push(PipelineStage {
            name: pass.name.clone(),
            active: true,
            vertex_shader: VERTEX_SHADER_PATH.to_string(),
            fragment_shader: fragment_shader_path(&pass.name),
            render_target: pass
                .pass_type
                .eq_ignore_ascii_case("buffer")
                .then(|| pass.name.clone()),
            geometry: Geometry::screen_quad(pipeline.len()),
            variables: system_variables(),
        });
    }

    let render_textures = graph
        .render_targets
        .iter()
        .map(|target| {
            let bind = graph
                .target_bindings(target.id)
                .iter()
                .map(|binding| BindEntry {
                    slot: binding.slot,
                    name: binding.pass.clone(),
                })
                .collect();
            RenderTextureObject::new(target.name.clone(), bind)
        })
        .collect();

    let textures = graph
        .textures
        .iter()
        .map(|texture| {
            let (min_filter, mag_filter) = map_filter(&texture.sampler.filter);
            let wrap = map_wrap(&texture.sampler.wrap);
            let source = if texture.keyboard {
                texture.source.clone()
            } else {
                asset_relative_path(&texture.source)
            };
            let bind = graph
                .texture_bindings(&texture.source)
                .iter()
                .map(|binding| BindEntry {
                    slot: binding.slot,
                    name: binding.pass.clone(),
                })
                .collect();
            TextureObject {
                source,
                flip_vertical: texture.sampler.vflip,
                srgb: texture.sampler.srgb,
                min_filter: min_filter.to_string(),
                mag_filter: mag_filter.to_string(),
                wrap_s: wrap.to_string(),
                wrap_t: wrap.to_string(),
                bind,
            }
        })
        .collect();

    ProjectDocument {
        version: 2,
        pipeline,
        objects: Objects {
            render_textures,
            textures,
        },
        settings: Settings::default(),
    }
}

/// The full artifact set for one import, ready for [`crate::write_project`].
#[derive(Debug)]
pub struct ProjectArtifacts {
    pub readme: String,
    pub project: ProjectDocument,
    /// `(destination-relative path, source text)` per non-common pass.
    pub fragment_shaders: Vec<(String, String)>,
    pub assets: Vec<AssetArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetArtifact {
    pub url: String,
    pub destination_rel: PathBuf,
}

/// Builds every artifact for a parsed document. `reference` is the caller's
/// original link, surfaced in the README.
pub fn build_artifacts(
    document: &ShaderDocument,
    reference: &str,
) -> Result<ProjectArtifacts, ImportError> {
    let graph = ResourceGraph::build(&document.passes)?;
    let project = project_document(&document.passes, &graph);

    // Code from 'common' passes is shared; prepend it to every stage body
    // instead of emitting a stage of its own.
    let mut common_code = String::new();
    for pass in &document.passes {
        if pass.pass_type.eq_ignore_ascii_case("common") {
            common_code.push_str(&pass.code);
            if !common_code.ends_with('\n') {
                common_code.push('\n');
            }
        }
    }

    let fragment_shaders = document
        .passes
        .iter()
        .filter(|pass| !pass.pass_type.eq_ignore_ascii_case("common"))
        .map(|pass| {
            let body = if common_code.is_empty() {
                pass.code.clone()
            } else {
                format!("{common_code}{}", pass.code)
            };
            (fragment_shader_path(&pass.name), fragment_shader(&body))
        })
        .collect();

    let assets = graph
        .textures
        .iter()
        .filter(|texture| !texture.keyboard)
        .filter_map(|texture| {
            let rel = asset_relative_path(&texture.source);
            (!rel.is_empty()).then(|| AssetArtifact {
                url: texture.source.clone(),
                destination_rel: PathBuf::from(rel),
            })
        })
        .collect();

    Ok(ProjectArtifacts {
        readme: readme(&document.metadata, reference),
        project,
        fragment_shaders,
        assets,
    })
}
