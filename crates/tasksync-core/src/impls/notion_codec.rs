//! Conversion between domain values and the Notion JSON wire format.
//!
//! Property values on the wire carry their type twice: in `"type"` and as
//! the key holding the payload, e.g. `{"type":"select","select":{"name":"x"}}`.

use serde_json::{Map, Value, json};

use crate::domain::errors::StoreError;
use crate::domain::{Filter, Properties, PropertyValue, Record, RecordId};

/// Encode a text fragment list holding one plain text run.
fn text_runs(content: &str) -> Value {
    json!([{ "text": { "content": content } }])
}

/// Encode one property value. `Unsupported` values are never written.
pub fn encode_value(value: &PropertyValue) -> Option<Value> {
    let encoded = match value {
        PropertyValue::Title(text) => json!({ "title": text_runs(text) }),
        PropertyValue::RichText(text) => json!({ "rich_text": text_runs(text) }),
        PropertyValue::Select(Some(name)) => json!({ "select": { "name": name } }),
        PropertyValue::Select(None) => json!({ "select": null }),
        PropertyValue::Url(url) => json!({ "url": url }),
        PropertyValue::Date(Some(start)) => json!({ "date": { "start": start } }),
        PropertyValue::Date(None) => json!({ "date": null }),
        PropertyValue::Unsupported(_) => return None,
    };
    Some(encoded)
}

pub fn encode_properties(properties: &Properties) -> Value {
    let map: Map<String, Value> = properties
        .iter()
        .filter_map(|(name, value)| encode_value(value).map(|v| (name.clone(), v)))
        .collect();
    Value::Object(map)
}

pub fn encode_filter(filter: &Filter) -> Value {
    match filter {
        Filter::SelectEquals { property, value } => {
            json!({ "property": property, "select": { "equals": value } })
        }
        Filter::SelectNotEquals { property, value } => {
            json!({ "property": property, "select": { "does_not_equal": value } })
        }
        Filter::SelectIsEmpty { property } => {
            json!({ "property": property, "select": { "is_empty": true } })
        }
        Filter::TitleEquals { property, value } => {
            json!({ "property": property, "title": { "equals": value } })
        }
        Filter::And(filters) => {
            json!({ "and": filters.iter().map(encode_filter).collect::<Vec<_>>() })
        }
    }
}

/// Plain text of the first run of a text array.
fn first_run_text(runs: &Value) -> String {
    let Some(first) = runs.as_array().and_then(|a| a.first()) else {
        return String::new();
    };
    first
        .get("plain_text")
        .and_then(Value::as_str)
        .or_else(|| first.pointer("/text/content").and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

/// Decode one property value object.
pub fn decode_value(value: &Value) -> PropertyValue {
    let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
    match kind {
        "title" => PropertyValue::Title(first_run_text(&value["title"])),
        "rich_text" => PropertyValue::RichText(first_run_text(&value["rich_text"])),
        "select" => PropertyValue::Select(str_at(value, "/select/name")),
        "url" => PropertyValue::Url(str_at(value, "/url")),
        "date" => PropertyValue::Date(str_at(value, "/date/start")),
        other => PropertyValue::Unsupported(other.to_string()),
    }
}

/// Decode a page object into a record.
pub fn decode_page(page: &Value) -> Result<Record, StoreError> {
    let id = page
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("page without id".into()))?;

    let archived = ["archived", "in_trash"]
        .iter()
        .any(|key| page.get(*key).and_then(Value::as_bool).unwrap_or(false));

    let properties = page
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, value)| (name.clone(), decode_value(value)))
                .collect()
        })
        .unwrap_or_default();

    Ok(Record {
        id: RecordId::new(id),
        archived,
        properties,
    })
}

/// Turn an error response body into a store error.
pub fn decode_error(status: u16, body: &str) -> StoreError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |key: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    StoreError::Api {
        status,
        code: field("code").unwrap_or_else(|| "unknown".into()),
        message: field("message").unwrap_or_else(|| body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_every_modelled_shape() {
        let mut props = Properties::new();
        props.insert("Tasks".into(), PropertyValue::title("Water plants"));
        props.insert("Status".into(), PropertyValue::select("open"));
        props.insert("Interval".into(), PropertyValue::rich_text("weekly"));
        props.insert("Link".into(), PropertyValue::Url(Some("https://x.test".into())));
        props.insert("Created".into(), PropertyValue::date("2024-01-01"));
        props.insert("Formula".into(), PropertyValue::Unsupported("formula".into()));

        let v = encode_properties(&props);
        assert_eq!(v["Tasks"]["title"][0]["text"]["content"], "Water plants");
        assert_eq!(v["Status"]["select"]["name"], "open");
        assert_eq!(v["Interval"]["rich_text"][0]["text"]["content"], "weekly");
        assert_eq!(v["Link"]["url"], "https://x.test");
        assert_eq!(v["Created"]["date"]["start"], "2024-01-01");
        assert!(v.get("Formula").is_none());
    }

    #[test]
    fn encodes_nested_filters() {
        let f = Filter::And(vec![
            Filter::title_equals("Tasks", "a"),
            Filter::select_not_equals("Cyclic", "once"),
            Filter::select_is_empty("Project"),
        ]);
        assert_eq!(
            encode_filter(&f),
            json!({ "and": [
                { "property": "Tasks", "title": { "equals": "a" } },
                { "property": "Cyclic", "select": { "does_not_equal": "once" } },
                { "property": "Project", "select": { "is_empty": true } },
            ]})
        );
    }

    #[test]
    fn decodes_a_page() {
        let page = json!({
            "object": "page",
            "id": "abc",
            "archived": false,
            "properties": {
                "Tasks": { "id": "title", "type": "title",
                           "title": [{ "plain_text": "Water plants", "text": { "content": "Water plants" } }] },
                "Status": { "id": "s", "type": "select", "select": { "name": "open", "color": "red" } },
                "Priority": { "id": "p", "type": "select", "select": null },
                "Created": { "id": "d", "type": "date", "date": { "start": "2024-01-01", "end": null } },
                "Link": { "id": "u", "type": "url", "url": null },
                "Done": { "id": "c", "type": "checkbox", "checkbox": true },
                "Interval": { "id": "r", "type": "rich_text", "rich_text": [] }
            }
        });

        let record = decode_page(&page).unwrap();
        assert_eq!(record.id.as_str(), "abc");
        assert!(!record.archived);
        assert_eq!(record.text("Tasks"), Some("Water plants"));
        assert_eq!(record.select("Status"), Some("open"));
        assert_eq!(record.select("Priority"), None);
        assert_eq!(record.date("Created"), Some("2024-01-01"));
        assert_eq!(record.url("Link"), None);
        assert_eq!(record.text("Interval"), None);
        assert_eq!(
            record.property("Done"),
            Some(&PropertyValue::Unsupported("checkbox".into()))
        );
    }

    #[test]
    fn page_without_id_is_rejected() {
        assert!(matches!(
            decode_page(&json!({ "properties": {} })),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn error_bodies() {
        let err = decode_error(
            400,
            r#"{"object":"error","status":400,"code":"validation_error","message":"bad"}"#,
        );
        assert!(matches!(
            err,
            StoreError::Api { status: 400, ref code, ref message } if code == "validation_error" && message == "bad"
        ));

        let err = decode_error(502, "Bad Gateway");
        assert!(matches!(err, StoreError::Api { status: 502, ref code, .. } if code == "unknown"));
    }
}
