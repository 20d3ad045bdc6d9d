//! Request value extraction.
//!
//! A dynamic field names one of three parameter sources and a dotted address
//! inside it. Resolution never fails: a missing key, an out-of-range index or
//! a scalar in the middle of the walk all yield `None`, which callers treat
//! as "leave the template value alone".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::routing::matcher::PathParams;

/// Parameter source selected by a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Body,
    Query,
    Params,
}

/// The three per-request parameter sources.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBag {
    /// Parsed request body: any JSON value, or an empty object.
    pub body: Value,
    /// Query string parameters, string values.
    pub query: Value,
    /// Path captures, string values.
    pub params: Value,
}

impl Default for ParameterBag {
    fn default() -> Self {
        Self {
            body: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            params: Value::Object(Map::new()),
        }
    }
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Query pairs in order; a repeated key keeps its last value.
    pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query = string_map(pairs);
        self
    }

    pub fn with_params(mut self, params: PathParams) -> Self {
        self.params = string_map(params);
        self
    }

    pub fn source(&self, source: Source) -> &Value {
        match source {
            Source::Body => &self.body,
            Source::Query => &self.query,
            Source::Params => &self.params,
        }
    }
}

fn string_map<I, K, V>(pairs: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let map: Map<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect();
    Value::Object(map)
}

/// Look up `path` in the bag's `source`.
pub fn extract<'a>(bag: &'a ParameterBag, source: Source, path: &str) -> Option<&'a Value> {
    lookup(bag.source(source), path)
}

/// Walk a JSON value by dotted address. `a[0].b` is accepted as `a.0.b`.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let keys = address_keys(path);
    if keys.is_empty() {
        return None;
    }

    keys.iter().try_fold(root, |current, key| match current {
        Value::Object(map) => map.get(key.as_str()),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn address_keys(path: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for part in path.split('.') {
        let mut rest = part;
        // leading key before any `[n]`
        if let Some(open) = rest.find('[') {
            if open > 0 {
                keys.push(rest[..open].to_string());
            }
            rest = &rest[open..];
            while let Some(stripped) = rest.strip_prefix('[') {
                match stripped.find(']') {
                    Some(close) => {
                        keys.push(stripped[..close].to_string());
                        rest = &stripped[close + 1..];
                    }
                    None => {
                        keys.push(rest.to_string());
                        rest = "";
                    }
                }
            }
            if !rest.is_empty() {
                keys.push(rest.to_string());
            }
        } else if !part.is_empty() {
            keys.push(part.to_string());
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_source() {
        let bag = ParameterBag::new().with_query([("filter", "active")]);
        assert_eq!(extract(&bag, Source::Query, "filter"), Some(&json!("active")));
    }

    #[test]
    fn test_repeated_query_key_keeps_last() {
        let bag = ParameterBag::new().with_query([("tag", "a"), ("tag", "b")]);
        assert_eq!(extract(&bag, Source::Query, "tag"), Some(&json!("b")));
    }

    #[test]
    fn test_nested_body() {
        let bag = ParameterBag::new().with_body(json!({
            "data": {"user": {"id": 7, "tags": ["x", "y"]}}
        }));

        assert_eq!(extract(&bag, Source::Body, "data.user.id"), Some(&json!(7)));
        assert_eq!(extract(&bag, Source::Body, "data.user.tags.1"), Some(&json!("y")));
        assert_eq!(extract(&bag, Source::Body, "data.user.tags[0]"), Some(&json!("x")));
    }

    #[test]
    fn test_top_level_array_body() {
        let bag = ParameterBag::new().with_body(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(extract(&bag, Source::Body, "1.id"), Some(&json!(2)));
        assert_eq!(extract(&bag, Source::Body, "[0].id"), Some(&json!(1)));
    }

    #[test]
    fn test_missing_paths_are_none() {
        let bag = ParameterBag::new().with_body(json!({"a": {"b": 1}, "s": "text"}));

        assert_eq!(extract(&bag, Source::Body, "a.c"), None);
        assert_eq!(extract(&bag, Source::Body, "x.y.z"), None);
        assert_eq!(extract(&bag, Source::Body, "s.len"), None);
        assert_eq!(extract(&bag, Source::Body, "a.b.c"), None);
        assert_eq!(extract(&bag, Source::Body, ""), None);
        assert_eq!(extract(&bag, Source::Params, "id"), None);
    }

    #[test]
    fn test_null_is_a_value() {
        let bag = ParameterBag::new().with_body(json!({"gone": null}));
        assert_eq!(extract(&bag, Source::Body, "gone"), Some(&Value::Null));
    }

    #[test]
    fn test_params_source() {
        let params = PathParams::from([("id".to_string(), "42".to_string())]);
        let bag = ParameterBag::new().with_params(params);
        assert_eq!(extract(&bag, Source::Params, "id"), Some(&json!("42")));
    }

    #[test]
    fn test_address_keys() {
        assert_eq!(address_keys("a.b"), vec!["a", "b"]);
        assert_eq!(address_keys("a[0][1].b"), vec!["a", "0", "1", "b"]);
        assert_eq!(address_keys("[2]"), vec!["2"]);
    }
}
