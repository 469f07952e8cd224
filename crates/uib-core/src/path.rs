//! JSON data paths: `user.name`, `items[0].title`, `items.0.title`.
//!
//! Parsed with `winnow`. A bracketed number and an all-digit dotted part are
//! both indices; an index also matches an object key of the same digits.

use serde_json::{Map, Value};
use winnow::ascii::digit1;
use winnow::combinator::delimited;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_till;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn from_part(part: String) -> Self {
        if part.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = part.parse()
        {
            return Segment::Index(index);
        }
        Segment::Key(part)
    }

    fn lookup<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        match (self, value) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(i), Value::Array(items)) => items.get(*i),
            (Segment::Index(i), Value::Object(map)) => map.get(&i.to_string()),
            _ => None,
        }
    }
}

fn parse_bracket_index(input: &mut &str) -> ModalResult<usize> {
    delimited('[', digit1, ']')
        .try_map(str::parse::<usize>)
        .parse_next(input)
}

/// A key runs to the next `.` or bracketed index. A `[` that does not open
/// an index stays part of the key.
fn parse_key(input: &mut &str) -> String {
    let mut key = String::new();
    loop {
        if let Ok(chunk) = take_till::<_, _, ContextError>(0.., ['.', '[']).parse_next(input) {
            key.push_str(chunk);
        }
        if input.starts_with('[') && parse_bracket_index.parse_peek(*input).is_err() {
            key.push('[');
            *input = &input[1..];
            continue;
        }
        return key;
    }
}

/// Split a path into segments. Empty parts are skipped.
pub fn parse_path(path: &str) -> Vec<Segment> {
    let mut rest = path;
    let mut segments = Vec::new();
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('.') {
            rest = tail;
            continue;
        }
        let checkpoint = rest;
        if let Ok(index) = parse_bracket_index.parse_next(&mut rest) {
            segments.push(Segment::Index(index));
            continue;
        }
        rest = checkpoint;
        let key = parse_key(&mut rest);
        if key.is_empty() {
            break;
        }
        segments.push(Segment::from_part(key));
    }
    segments
}

/// Value at `path`, or `None` when any step is missing. An empty path
/// resolves to nothing.
pub fn get_value_at_path<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse_path(path);
    if segments.is_empty() {
        return None;
    }
    segments
        .iter()
        .try_fold(json, |current, segment| segment.lookup(current))
}

/// Largest array index a write may pad an array out to.
pub const MAX_ARRAY_INDEX: usize = 10_000;

/// Copy of `json` with `value` written at `path`, creating intermediate
/// objects (or arrays, when the next step is an index) as needed.
/// A path indexing past [`MAX_ARRAY_INDEX`] leaves `json` unchanged.
#[must_use]
pub fn set_value_at_path(json: &Value, path: &str, value: Value) -> Value {
    let segments = parse_path(path);
    if segments.is_empty() {
        return json.clone();
    }
    if segments
        .iter()
        .any(|s| matches!(s, Segment::Index(i) if *i > MAX_ARRAY_INDEX))
    {
        log::debug!("refusing write to `{path}`: index above {MAX_ARRAY_INDEX}");
        return json.clone();
    }
    let mut root = match json {
        Value::Object(_) | Value::Array(_) => json.clone(),
        _ => Value::Object(Map::new()),
    };
    write(&mut root, &segments, value);
    root
}

fn write(target: &mut Value, segments: &[Segment], value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        *target = value;
        return;
    };
    let slot = match (segment, &mut *target) {
        (Segment::Index(i), Value::Array(items)) => {
            if items.len() <= *i {
                items.resize(*i + 1, Value::Null);
            }
            &mut items[*i]
        }
        (Segment::Index(i), Value::Object(map)) => map.entry(i.to_string()).or_insert(Value::Null),
        (Segment::Key(key), Value::Object(map)) => map.entry(key.clone()).or_insert(Value::Null),
        (_, other) => {
            *other = empty_container_for(segment);
            return write(other, segments, value);
        }
    };
    if !rest.is_empty() && !matches!(slot, Value::Object(_) | Value::Array(_)) {
        *slot = empty_container_for(&rest[0]);
    }
    write(slot, rest, value);
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Key(_) => Value::Object(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn bracket_and_dot_indices_are_equivalent() {
        assert_eq!(parse_path("items[0].title"), parse_path("items.0.title"));
        assert_eq!(
            parse_path("items[0].title"),
            vec![
                Segment::Key("items".into()),
                Segment::Index(0),
                Segment::Key("title".into()),
            ]
        );
    }

    #[test]
    fn non_numeric_brackets_stay_in_the_key() {
        assert_eq!(parse_path("a[b].c"), vec![Segment::Key("a[b]".into()), Segment::Key("c".into())]);
        assert_eq!(parse_path("..a..b."), vec![Segment::Key("a".into()), Segment::Key("b".into())]);
        assert!(parse_path("").is_empty());
    }

    #[test]
    fn get_resolves_nested_values() {
        let data = json!({"user": {"name": "Ada"}, "items": [{"title": "first"}, {"title": "second"}]});
        assert_eq!(get_value_at_path(&data, "user.name"), Some(&json!("Ada")));
        assert_eq!(get_value_at_path(&data, "items[1].title"), Some(&json!("second")));
        assert_eq!(get_value_at_path(&data, "items.0.title"), Some(&json!("first")));
        assert_eq!(get_value_at_path(&data, "items[5].title"), None);
        assert_eq!(get_value_at_path(&data, "user.name.first"), None);
        assert_eq!(get_value_at_path(&data, ""), None);
    }

    #[test]
    fn index_matches_digit_object_keys() {
        let data = json!({"rows": {"0": "zero"}});
        assert_eq!(get_value_at_path(&data, "rows[0]"), Some(&json!("zero")));
    }

    #[test]
    fn null_is_a_resolved_value() {
        let data = json!({"a": null});
        assert_eq!(get_value_at_path(&data, "a"), Some(&Value::Null));
        assert_eq!(get_value_at_path(&data, "a.b"), None);
    }

    #[test]
    fn oversized_index_leaves_input_unchanged() {
        let data = json!({"a": [1]});
        let huge = format!("a[{}]", usize::MAX);
        assert_eq!(set_value_at_path(&data, &huge, json!(2)), data);
        assert_eq!(set_value_at_path(&data, "a[4000000000].b", json!(2)), data);

        let edge = set_value_at_path(&json!({}), &format!("a[{MAX_ARRAY_INDEX}]"), json!(1));
        let items = edge["a"].as_array().unwrap();
        assert_eq!(items.len(), MAX_ARRAY_INDEX + 1);
        assert_eq!(items[MAX_ARRAY_INDEX], json!(1));
    }

    #[test]
    fn set_creates_intermediate_containers() {
        let out = set_value_at_path(&json!({}), "user.tags[1]", json!("b"));
        assert_eq!(out, json!({"user": {"tags": [null, "b"]}}));

        let original = json!({"user": {"name": "Ada", "age": 36}});
        let out = set_value_at_path(&original, "user.name", json!("Grace"));
        assert_eq!(out, json!({"user": {"name": "Grace", "age": 36}}));
        assert_eq!(original["user"]["name"], json!("Ada"));
    }

    #[test]
    fn set_replaces_scalars_on_the_way() {
        let out = set_value_at_path(&json!({"a": 5}), "a.b", json!(true));
        assert_eq!(out, json!({"a": {"b": true}}));
        assert_eq!(set_value_at_path(&json!(null), "x", json!(1)), json!({"x": 1}));
    }
}
