//! Dotted-path navigation over JSON values.
//!
//! Segments are separated by `.`; `\.` keeps a literal dot inside a key.
//! Numeric segments index arrays; empty segments are skipped.

use serde_json::Value;

/// Splits a dotted path into its segments.
pub fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'.') => {
                current.push('.');
                chars.next();
            }
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            other => current.push(other),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Walks `root` along `segments`. Returns `None` as soon as a segment does
/// not exist.
pub fn evaluate<'a, S: AsRef<str>>(root: &'a Value, segments: &[S]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |current, segment| {
        let segment = segment.as_ref();
        match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_with_escapes_and_empty_segments() {
        assert_eq!(split_path("a.b.c"), vec!["a", "b", "c"]);
        assert_eq!(split_path("settings.index\\.number_of_shards"), vec!["settings", "index.number_of_shards"]);
        assert_eq!(split_path("..a..b."), vec!["a", "b"]);
        assert!(split_path("").is_empty());
    }

    #[test]
    fn evaluates_objects_and_arrays() {
        let body = json!({"hits": {"hits": [{"_id": "1"}, {"_id": "2"}]}});
        assert_eq!(evaluate(&body, &split_path("hits.hits.1._id")), Some(&json!("2")));
        assert_eq!(evaluate(&body, &split_path("")), Some(&body));
        assert_eq!(evaluate(&body, &split_path("hits.hits.9")), None);
        assert_eq!(evaluate(&body, &split_path("hits.hits.first")), None);
        assert_eq!(evaluate(&body, &split_path("hits.hits.0._id.deeper")), None);
    }
}
