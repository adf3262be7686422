use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes left untouched in path placeholder values (RFC 3986 unreserved set).
const PATH_PLACEHOLDER: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Resolves a path template by replacing `{key}` placeholders with
/// percent-encoded values.
///
/// Placeholders without a value are left unchanged.
///
/// # Examples
/// ```rust
/// use indexmap::IndexMap;
/// use yamlrest_util::build_path;
///
/// let mut parts = IndexMap::new();
/// parts.insert("index".to_string(), "logs-2024".to_string());
/// parts.insert("id".to_string(), "a/b".to_string());
///
/// assert_eq!(build_path("/{index}/_doc/{id}", &parts), "/logs-2024/_doc/a%2Fb");
/// ```
pub fn build_path(template: &str, variables: &IndexMap<String, String>) -> String {
    let mut path = template.to_string();
    for (key, value) in variables {
        let encoded = utf8_percent_encode(value, PATH_PLACEHOLDER).to_string();
        path = path.replace(&format!("{{{key}}}"), &encoded);
    }
    path
}
