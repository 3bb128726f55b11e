//! YAML front-matter extraction for markdown documents.
//!
//! A front-matter block is a leading `---` line, a YAML mapping, and a
//! closing `---` (or `...`) line. A file that does not start with the
//! delimiter simply has no metadata; that is a valid document, not an
//! error, and the whole content is the body.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

pub type Mapping = BTreeMap<String, Value>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrontMatterError {
    #[error("front-matter block opened but no closing delimiter found")]
    Unterminated,
    #[error("front-matter is not valid YAML: {0}")]
    InvalidYaml(String),
    #[error("front-matter is not a key-value mapping")]
    NotAMapping,
}

/// Split raw file content into `(front_matter, body)`.
///
/// The mapping is parsed with serde_yaml and converted to
/// `serde_json::Value` for uniform downstream handling. Tolerates a UTF-8
/// BOM before the opening delimiter.
pub fn extract(raw: &str) -> Result<(Mapping, &str), FrontMatterError> {
    let content = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut lines = content.split_inclusive('\n');
    let opening = match lines.next() {
        Some(line) if line.trim_end() == "---" => line,
        _ => return Ok((Mapping::new(), raw)),
    };

    let mut consumed = opening.len();
    let mut yaml_end = consumed;
    let mut closed = false;
    for line in lines {
        consumed += line.len();
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            closed = true;
            break;
        }
        yaml_end = consumed;
    }

    if !closed {
        return Err(FrontMatterError::Unterminated);
    }

    let yaml = &content[opening.len()..yaml_end];
    let body = &content[consumed..];

    if yaml.trim().is_empty() {
        return Ok((Mapping::new(), body));
    }

    let fields = parse_yaml_mapping(yaml)?;
    Ok((fields, body))
}

fn parse_yaml_mapping(yaml: &str) -> Result<Mapping, FrontMatterError> {
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontMatterError::InvalidYaml(e.to_string()))?;
    let json_value: Value = serde_json::to_value(yaml_value)
        .map_err(|e| FrontMatterError::InvalidYaml(e.to_string()))?;

    match json_value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(FrontMatterError::NotAMapping),
    }
}
