//! Serializable model of the generated project document: pipeline stages,
//! object declarations with bind lists, and global settings. Serialized with
//! `toml::to_string_pretty` into `project.toml`.
//!
//! Attribute values here are a compatibility contract with the consuming
//! renderer. In particular the filter-name lookup is intentionally inverted
//! (`linear` maps to `Nearest` and vice versa); emit it exactly as given.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDocument {
    pub version: u32,
    pub pipeline: Vec<PipelineStage>,
    pub objects: Objects,
    pub settings: Settings,
}

/// One shader stage; stages are emitted in reverse document order, `common`
/// passes excluded.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStage {
    pub name: String,
    pub active: bool,
    pub vertex_shader: String,
    pub fragment_shader: String,
    /// Named render-target attachment for `buffer` passes; absent means the
    /// stage draws to the screen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_target: Option<String>,
    pub geometry: Geometry,
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Geometry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub topology: String,
}

impl Geometry {
    pub fn screen_quad(index: usize) -> Self {
        Self {
            name: format!("ScreenQuad{index}"),
            kind: "ScreenQuadNDC".to_string(),
            width: 1,
            height: 1,
            depth: 1,
            topology: "TriangleList".to_string(),
        }
    }
}

/// A uniform variable the host resolves from a system value each frame.
#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub system: &'static str,
}

/// The fixed uniform-variable block every stage declares.
pub fn system_variables() -> Vec<Variable> {
    vec![
        Variable {
            name: "iResolution",
            kind: "float2",
            system: "ViewportSize",
        },
        Variable {
            name: "iTime",
            kind: "float",
            system: "Time",
        },
        Variable {
            name: "iTimeDelta",
            kind: "float",
            system: "TimeDelta",
        },
        Variable {
            name: "iFrame",
            kind: "int",
            system: "FrameIndex",
        },
        Variable {
            name: "iMouse",
            kind: "float4",
            system: "MouseButton",
        },
    ]
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Objects {
    pub render_textures: Vec<RenderTextureObject>,
    pub textures: Vec<TextureObject>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderTextureObject {
    pub name: String,
    pub relative_size: [f32; 2],
    pub clear: bool,
    pub clear_color: [f32; 4],
    pub bind: Vec<BindEntry>,
}

impl RenderTextureObject {
    pub fn new(name: String, bind: Vec<BindEntry>) -> Self {
        Self {
            name,
            relative_size: [1.0, 1.0],
            clear: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            bind,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextureObject {
    pub source: String,
    pub flip_vertical: bool,
    pub srgb: bool,
    pub min_filter: String,
    pub mag_filter: String,
    pub wrap_s: String,
    pub wrap_t: String,
    pub bind: Vec<BindEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindEntry {
    pub slot: u8,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub clear_color: [f32; 4],
    pub use_alpha: bool,
    pub camera: CameraSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraSettings {
    pub first_person: bool,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            use_alpha: false,
            camera: CameraSettings {
                first_person: false,
                distance: 10.0,
                pitch: 0.0,
                yaw: 0.0,
                roll: 0.0,
            },
        }
    }
}

/// Maps a sampler filter mode to `(min_filter, mag_filter)` attribute names.
/// The inversion is intentional; see the module docs.
pub fn map_filter(filter: &str) -> (&'static str, &'static str) {
    match filter {
        "linear" => ("Nearest", "Nearest"),
        "nearest" => ("Linear", "Linear"),
        "mipmap" => ("Linear_MipmapLinear", "Linear"),
        _ => ("Linear", "Linear"),
    }
}

pub fn map_wrap(wrap: &str) -> &'static str {
    match wrap {
        "clamp" => "ClampToEdge",
        "repeat" => "Repeat",
        _ => "Repeat",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_lookup_is_the_inverted_compatibility_table() {
        assert_eq!(map_filter("linear"), ("Nearest", "Nearest"));
        assert_eq!(map_filter("nearest"), ("Linear", "Linear"));
        assert_eq!(map_filter("mipmap"), ("Linear_MipmapLinear", "Linear"));
        assert_eq!(map_filter(""), ("Linear", "Linear"));
    }

    #[test]
    fn wrap_lookup() {
        assert_eq!(map_wrap("clamp"), "ClampToEdge");
        assert_eq!(map_wrap("repeat"), "Repeat");
        assert_eq!(map_wrap("mirror"), "Repeat");
    }

    #[test]
    fn serializes_to_toml() {
        let document = ProjectDocument {
            version: 2,
            pipeline: vec![PipelineStage {
                name: "irmfFS".to_string(),
                active: true,
                vertex_shader: "shaders/irmfVS.glsl".to_string(),
                fragment_shader: "shaders/irmfFS.glsl".to_string(),
                render_target: None,
                geometry: Geometry::screen_quad(0),
                variables: system_variables(),
            }],
            objects: Objects::default(),
            settings: Settings::default(),
        };
        let toml = toml::to_string_pretty(&document).unwrap();
        assert!(toml.contains("version = 2"));
        assert!(toml.contains("[[pipeline]]"));
        assert!(toml.contains("vertex_shader = \"shaders/irmfVS.glsl\""));
        assert!(toml.contains("name = \"iResolution\""));
        assert!(toml.contains("[settings.camera]"));
        assert!(!toml.contains("render_target"));
    }
}
