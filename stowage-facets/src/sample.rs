//! Sample-data shape checks and free-text decoding.

use crate::error::{RepositoryError, RepositoryResult};
use stowage_model::{Container, TableData};
use tracing::warn;

/// Decodes a stored unstructured sample.
///
/// One leading and one trailing `"` are dropped, then the text is
/// form-URL-decoded (`+` is a space, `%XX` an escaped byte). When the escapes
/// do not decode to UTF-8 the quote-stripped text is returned as-is.
pub fn decode_unstructured(raw: &str) -> String {
    let stripped = raw.strip_prefix('"').unwrap_or(raw);
    let stripped = stripped.strip_suffix('"').unwrap_or(stripped);
    let spaced = stripped.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            warn!(error = %e, "unstructured sample is not valid url encoding, returning raw text");
            stripped.to_string()
        }
    }
}

/// Checks every sample column against the container's columns and every row
/// against the column count.
pub(crate) fn validate_table_data(container: &Container, data: &TableData) -> RepositoryResult<()> {
    for name in &data.columns {
        resolve_column(container, name)?;
    }
    for row in &data.rows {
        if row.len() != data.columns.len() {
            return Err(RepositoryError::Validation(format!(
                "Number of columns is {} but row has {} sample values",
                data.columns.len(),
                row.len()
            )));
        }
    }
    Ok(())
}

/// Fails unless `path` names a column of `container`.
pub(crate) fn resolve_column(container: &Container, path: &str) -> RepositoryResult<()> {
    container
        .columns()
        .and_then(|tree| tree.resolve(path))
        .map(|_| ())
        .ok_or_else(|| RepositoryError::invalid_column(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes_and_decodes() {
        assert_eq!(decode_unstructured("\"hello+world%21\""), "hello world!");
    }

    #[test]
    fn only_one_quote_each_side() {
        assert_eq!(decode_unstructured("\"\"quoted\"\""), "\"quoted\"");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(decode_unstructured("plain"), "plain");
    }

    #[test]
    fn invalid_utf8_escape_keeps_text() {
        assert_eq!(decode_unstructured("\"bad%FFbyte\""), "bad%FFbyte");
    }
}
