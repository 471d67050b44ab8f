//! Compact wire form for configs handed to pop-out windows.
//!
//! Well-known keys and values are replaced by their base-36 index in a fixed
//! table. Anything not in a table passes through unchanged; literal
//! single-character strings are escaped with a `___` prefix so they cannot be
//! mistaken for a code. The tables are append-only: removing or reordering an
//! entry breaks configs minified by older builds.

use serde_json::{Map, Value};

use crate::error::ConfigError;

const ESCAPE: &str = "___";

/// At most 36 entries so every code stays a single base-36 digit.
const KEYS: [&str; 36] = [
    "settings",
    "hasHeaders",
    "constrainDragToContainer",
    "selectionEnabled",
    "dimensions",
    "borderWidth",
    "minItemHeight",
    "minItemWidth",
    "headerHeight",
    "dragProxyWidth",
    "dragProxyHeight",
    "labels",
    "close",
    "maximise",
    "minimise",
    "popout",
    "content",
    "componentType",
    "componentState",
    "id",
    "width",
    "type",
    "height",
    "isClosable",
    "title",
    "popoutWholeStack",
    "openPopouts",
    "parentId",
    "activeItemIndex",
    "reorderEnabled",
    "borderGrabWidth",
    "header",
    "maximised",
    "show",
    "root",
    "resolved",
];

fn values() -> [Value; 16] {
    [
        Value::Bool(true),
        Value::Bool(false),
        Value::from("row"),
        Value::from("column"),
        Value::from("stack"),
        Value::from("component"),
        Value::from("close"),
        Value::from("maximise"),
        Value::from("minimise"),
        Value::from("open in new window"),
        Value::from("top"),
        Value::from("left"),
        Value::from("right"),
        Value::from("bottom"),
        Value::from("dock"),
        Value::from("additional tabs"),
    ]
}

fn code(index: usize) -> String {
    char::from_digit(index as u32, 36)
        .map(String::from)
        .unwrap_or_default()
}

fn decode(code: &str) -> Option<usize> {
    let mut chars = code.chars();
    let digit = chars.next()?.to_digit(36)?;
    chars.next().is_none().then_some(digit as usize)
}

fn is_single_char(text: &str) -> bool {
    text.chars().count() == 1
}

fn minify_key(key: &str) -> String {
    if is_single_char(key) {
        return format!("{ESCAPE}{key}");
    }
    match KEYS.iter().position(|k| *k == key) {
        Some(index) => code(index),
        None => key.to_string(),
    }
}

fn maxify_key(key: &str) -> Result<String, ConfigError> {
    if is_single_char(key) {
        return decode(key)
            .and_then(|index| KEYS.get(index))
            .map(|k| k.to_string())
            .ok_or(ConfigError::Minified("unknown key code"));
    }
    if let Some(rest) = key.strip_prefix(ESCAPE)
        && let Some(ch) = rest.chars().next()
    {
        return Ok(ch.to_string());
    }
    Ok(key.to_string())
}

fn minify_value(value: &Value, table: &[Value]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (minify_key(k), minify_value(v, table)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| minify_value(v, table)).collect()),
        Value::String(text) if is_single_char(text) => Value::String(format!("{ESCAPE}{text}")),
        other => match table.iter().position(|v| v == other) {
            Some(index) => Value::String(code(index)),
            None => other.clone(),
        },
    }
}

fn maxify_value(value: &Value, table: &[Value]) -> Result<Value, ConfigError> {
    Ok(match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(maxify_key(k)?, maxify_value(v, table)?);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| maxify_value(v, table))
                .collect::<Result<_, _>>()?,
        ),
        Value::String(text) if is_single_char(text) => decode(text)
            .and_then(|index| table.get(index))
            .cloned()
            .ok_or(ConfigError::Minified("unknown value code"))?,
        Value::String(text) => match text.strip_prefix(ESCAPE).and_then(|r| r.chars().next()) {
            Some(ch) => Value::String(ch.to_string()),
            None => value.clone(),
        },
        other => other.clone(),
    })
}

/// Replace well-known keys and values with their table codes.
pub fn minify(config: &Value) -> Value {
    minify_value(config, &values())
}

/// Reverse `minify`.
pub fn maxify(config: &Value) -> Result<Value, ConfigError> {
    maxify_value(config, &values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_keys_and_values_become_codes() {
        let min = minify(&json!({ "type": "row", "isClosable": false, "width": 50 }));
        assert_eq!(min, json!({ "l": "2", "n": "1", "k": 50 }));
    }

    #[test]
    fn single_characters_are_escaped() {
        let min = minify(&json!({ "x": "a", "title": "b" }));
        assert_eq!(min, json!({ "___x": "___a", "o": "___b" }));
        assert_eq!(maxify(&min).unwrap(), json!({ "x": "a", "title": "b" }));
    }

    #[test]
    fn unknown_entries_pass_through() {
        let config = json!({ "componentState": { "path": "/tmp/file.rs", "line": 12 } });
        let min = minify(&config);
        assert_eq!(min["i"]["path"], "/tmp/file.rs");
        assert_eq!(maxify(&min).unwrap(), config);
    }

    #[test]
    fn nested_layout_survives_the_wire_form() {
        let config = json!({
            "root": {
                "type": "stack",
                "content": [
                    { "type": "component", "componentType": "log", "title": "Log", "id": "7" }
                ],
                "header": { "show": "left", "close": false }
            },
            "settings": { "popoutWholeStack": true },
            "resolved": true
        });
        assert_eq!(maxify(&minify(&config)).unwrap(), config);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(maxify(&json!({ "#": 1 })).is_err());
        assert!(maxify(&json!({ "content": "y" })).is_err());
    }
}
