//! Splits a fetched IRMF document into its JSON preamble and GLSL body and
//! parses the preamble into structured metadata.
//!
//! Parsing is deliberately lenient: no field is required anywhere, and every
//! absence degrades to an empty or default value, so the generator can still
//! emit syntactically valid artifacts from sparse documents. The only hard
//! failures are malformed delimiters, JSON syntax errors, and a document
//! that self-reports an upstream `Error`.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::ImportError;

const HEADER_OPEN: &str = "/*{";
const HEADER_CLOSE: &str = "}*/";

/// Name given to the synthetic pass that wraps a document without a
/// `renderpass` array. Doubles as the fragment shader filename stem, so
/// single-pass imports write `shaders/irmfFS.glsl`.
pub const SINGLE_PASS_NAME: &str = "irmfFS";

/// Splits a raw document into `(json_preamble, full_text)`. The preamble
/// slice runs from the `{` at offset 2 through the closing `}` of the
/// terminator; the body handed onward is the entire original text, since the
/// generator templates around the header rather than stripping it.
pub fn split_preamble(document: &str) -> Result<(&str, &str), ImportError> {
    if !document.starts_with(HEADER_OPEN) {
        return Err(ImportError::MalformedHeader);
    }
    let end = document
        .find(HEADER_CLOSE)
        .ok_or(ImportError::UnterminatedHeader)?;
    Ok((&document[2..=end], document))
}

/// Flat manifest metadata used for README generation. Fields read through
/// `Value::as_str`, so non-string values (arrays, numbers) degrade to empty
/// strings rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderMetadata {
    pub author: String,
    pub copyright: String,
    pub date: String,
    pub irmf: String,
    pub materials: String,
    pub max: String,
    pub min: String,
    pub notes: String,
    pub options: String,
    pub title: String,
    pub units: String,
    pub version: String,
}

impl ShaderMetadata {
    fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            author: field("author"),
            copyright: field("copyright"),
            date: field("date"),
            irmf: field("irmf"),
            materials: field("materials"),
            max: field("max"),
            min: field("min"),
            notes: field("notes"),
            options: field("options"),
            title: field("title"),
            units: field("units"),
            version: field("version"),
        }
    }
}

/// One stage of a multi-pass pipeline. `pass_type` is an open string tag
/// (`image`, `buffer`, `common`, `cubemap`, ...), not an exhaustive enum.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderPass {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub pass_type: String,
    #[serde(default)]
    pub code: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub inputs: Vec<ShaderInput>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub outputs: Vec<PassOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShaderInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub channel: u8,
    #[serde(default, rename = "ctype")]
    pub input_type: String,
    #[serde(default, rename = "src")]
    pub source: String,
    #[serde(default)]
    pub sampler: Sampler,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassOutput {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub channel: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sampler {
    pub filter: String,
    pub wrap: String,
    pub vflip: bool,
    pub srgb: bool,
}

/// A non-array (or absent) value degrades to an empty list, and malformed
/// entries are dropped individually instead of poisoning the whole parse.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> Deserialize<'a>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "skipping malformed channel entry");
                    None
                }
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Parsed IRMF document: manifest metadata plus the ordered render-pass list
/// driving project generation.
#[derive(Debug, Clone)]
pub struct ShaderDocument {
    pub metadata: ShaderMetadata,
    pub passes: Vec<RenderPass>,
}

impl ShaderDocument {
    /// Parses the preamble JSON. `body` is the full document text; it becomes
    /// the code of the synthetic single pass when no `renderpass` array is
    /// present.
    pub fn parse(json: &str, body: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(json)?;
        if let Some(message) = value.get("Error").and_then(Value::as_str) {
            return Err(ImportError::Upstream(message.to_string()));
        }
        let metadata = ShaderMetadata::from_value(&value);
        let passes = match value.get("renderpass") {
            Some(Value::Array(items)) => {
                let mut passes: Vec<RenderPass> = items
                    .iter()
                    .filter_map(|item| match RenderPass::deserialize(item) {
                        Ok(pass) => Some(pass),
                        Err(err) => {
                            warn!(error = %err, "skipping malformed render pass entry");
                            None
                        }
                    })
                    .collect();
                let mut used = HashSet::new();
                for (index, pass) in passes.iter_mut().enumerate() {
                    let base = sanitize_pass_name(&pass.name)
                        .unwrap_or_else(|| format!("pass{index}"));
                    let unique = make_unique_name(base, &mut used);
                    if unique != pass.name {
                        warn!(original = %pass.name, renamed = %unique, "sanitized pass name");
                    }
                    pass.name = unique;
                }
                passes
            }
            _ => vec![RenderPass {
                name: SINGLE_PASS_NAME.to_string(),
                pass_type: "image".to_string(),
                code: body.to_string(),
                ..RenderPass::default()
            }],
        };
        Ok(Self { metadata, passes })
    }
}

/// Reduces a pass name to a safe filename stem: alphanumerics kept,
/// separator runs collapsed to `_`, everything else (including `/` and `.`)
/// dropped, a leading digit prefixed with `p`. Pass names double as shader
/// filenames and render-target identifiers, so nothing path-like may
/// survive. Returns `None` when nothing usable remains.
fn sanitize_pass_name(input: &str) -> Option<String> {
    let mut result = String::new();
    let mut prev_underscore = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch);
            prev_underscore = false;
        } else if (ch.is_ascii_whitespace() || ch == '-' || ch == '_')
            && !result.is_empty()
            && !prev_underscore
        {
            result.push('_');
            prev_underscore = true;
        }
    }
    while result.ends_with('_') {
        result.pop();
    }
    if result.is_empty() {
        return None;
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'p');
    }
    Some(result)
}

fn make_unique_name(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}_{counter}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_preamble_and_keeps_full_body() {
        let doc = "/*{\"title\":\"T\"}*/\nvoid main(){}";
        let (json, body) = split_preamble(doc).unwrap();
        assert_eq!(json, "{\"title\":\"T\"}");
        assert_eq!(body, doc);
    }

    #[test]
    fn rejects_missing_opening_token() {
        let err = split_preamble("// not irmf").unwrap_err();
        assert!(matches!(err, ImportError::MalformedHeader));
    }

    #[test]
    fn rejects_unterminated_preamble() {
        let err = split_preamble("/*{\"title\":\"T\"").unwrap_err();
        assert!(matches!(err, ImportError::UnterminatedHeader));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let parsed = ShaderDocument::parse("{}", "body").unwrap();
        assert_eq!(parsed.metadata, ShaderMetadata::default());
        assert_eq!(parsed.passes.len(), 1);
        assert_eq!(parsed.passes[0].name, SINGLE_PASS_NAME);
        assert_eq!(parsed.passes[0].code, "body");
    }

    #[test]
    fn non_string_fields_degrade_to_empty() {
        let parsed =
            ShaderDocument::parse(r#"{"materials":["PLA"],"title":"Sphere"}"#, "").unwrap();
        assert_eq!(parsed.metadata.materials, "");
        assert_eq!(parsed.metadata.title, "Sphere");
    }

    #[test]
    fn upstream_error_short_circuits() {
        let err = ShaderDocument::parse(r#"{"Error":"rate limited"}"#, "").unwrap_err();
        assert!(matches!(err, ImportError::Upstream(msg) if msg == "rate limited"));
    }

    #[test]
    fn invalid_json_carries_diagnostic() {
        let err = ShaderDocument::parse("{not json", "").unwrap_err();
        assert!(matches!(err, ImportError::InvalidJson(_)));
    }

    #[test]
    fn parses_render_pass_array() {
        let json = r#"{
            "renderpass": [
                {
                    "name": "Buffer A",
                    "type": "buffer",
                    "code": "void mainModel4(out vec4 m, in vec3 xyz) {}",
                    "inputs": [
                        {"channel": 1, "ctype": "texture", "src": "/media/wood.png",
                         "sampler": {"filter": "linear", "wrap": "repeat", "vflip": true}}
                    ],
                    "outputs": [{"id": 7, "channel": 0}]
                },
                {"name": "Image", "type": "image", "inputs": "not-an-array"}
            ]
        }"#;
        let parsed = ShaderDocument::parse(json, "").unwrap();
        assert_eq!(parsed.passes.len(), 2);
        let buffer = &parsed.passes[0];
        assert_eq!(buffer.pass_type, "buffer");
        assert_eq!(buffer.outputs[0].id, 7);
        assert_eq!(buffer.inputs[0].channel, 1);
        assert_eq!(buffer.inputs[0].sampler.filter, "linear");
        assert!(buffer.inputs[0].sampler.vflip);
        assert!(parsed.passes[1].inputs.is_empty());
    }

    #[test]
    fn sanitizes_and_uniquifies_pass_names() {
        let json = r#"{
            "renderpass": [
                {"name": "../../evil", "type": "image"},
                {"name": "Buffer A", "type": "image"},
                {"name": "Buffer A", "type": "image"},
                {"name": "", "type": "image"},
                {"name": "2pass", "type": "image"}
            ]
        }"#;
        let parsed = ShaderDocument::parse(json, "").unwrap();
        let names: Vec<&str> = parsed.passes.iter().map(|pass| pass.name.as_str()).collect();
        assert_eq!(names, vec!["evil", "Buffer_A", "Buffer_A_2", "pass3", "p2pass"]);
    }

    #[test]
    fn malformed_channel_entries_are_dropped_individually() {
        let json = r#"{
            "renderpass": [
                {"name": "image", "type": "image",
                 "inputs": [
                    {"channel": "zero", "ctype": "texture", "src": "/media/a.png"},
                    {"channel": 1, "ctype": "texture", "src": "/media/b.png"}
                 ]}
            ]
        }"#;
        let parsed = ShaderDocument::parse(json, "").unwrap();
        assert_eq!(parsed.passes[0].inputs.len(), 1);
        assert_eq!(parsed.passes[0].inputs[0].source, "/media/b.png");
    }
}
