// src/post/parse.rs
use crate::error::CurateError;

const OPEN: &str = "<post>";
const CLOSE: &str = "</post>";

/// Extracts the final post from a generation that also contains reasoning.
///
/// Returns the trimmed body of the LAST `<post>...</post>` section. A
/// response without a complete section, or whose last section is blank, is a
/// [`CurateError::MalformedGeneration`].
pub fn parse_generation(raw: &str) -> Result<String, CurateError> {
    let close = raw
        .rfind(CLOSE)
        .ok_or_else(|| CurateError::MalformedGeneration("no </post> section found".into()))?;
    let open = raw[..close]
        .rfind(OPEN)
        .ok_or_else(|| CurateError::MalformedGeneration("unmatched </post>".into()))?;

    let body = raw[open + OPEN.len()..close].trim();
    if body.is_empty() {
        return Err(CurateError::MalformedGeneration("empty <post> section".into()));
    }
    Ok(body.to_string())
}
