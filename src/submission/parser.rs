use serde_json::{Map, Value};

/// Parse a request body. Browsers posting in no-cors mode label JSON as
/// `text/plain`, so anything that is not form-encoded is read as JSON.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Value, String> {
    let ct = content_type.unwrap_or("application/json");

    if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body)
    } else {
        serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))
    }
}

/// Repeated keys (checkbox groups) collect into an array in arrival order.
fn parse_form_urlencoded(body: &[u8]) -> Result<Value, String> {
    let body_str = std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    let mut map = Map::new();
    for (k, v) in form_urlencoded::parse(body_str.as_bytes()) {
        let value = Value::String(v.into_owned());
        match map.get_mut(k.as_ref()) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(k.into_owned(), value);
            }
        }
    }
    Ok(Value::Object(map))
}
