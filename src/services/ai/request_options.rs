use super::error::AttemptError;

pub(super) const API_KEY_HEADER: &str = "x-api-key";

/// Headers sent with every chat request.
pub(super) fn default_headers(api_key: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ];
    if let Some(api_key) = api_key {
        headers.push((API_KEY_HEADER.to_string(), api_key.to_string()));
    }
    headers
}

pub(super) fn build_header_map(
    headers: &[(String, String)],
) -> Result<reqwest::header::HeaderMap, AttemptError> {
    let mut header_map = reqwest::header::HeaderMap::new();
    for (key, value) in headers {
        let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| AttemptError::network(format!("Invalid header name: {key}")))?;
        let val = reqwest::header::HeaderValue::from_str(value)
            .map_err(|_| AttemptError::network(format!("Invalid header value for {key}")))?;
        header_map.insert(name, val);
    }
    Ok(header_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_header_only_when_configured() {
        let without = default_headers(None);
        assert!(without.iter().all(|(k, _)| k != API_KEY_HEADER));

        let with = default_headers(Some("secret"));
        assert!(with.iter().any(|(k, v)| k == API_KEY_HEADER && v == "secret"));
        assert!(with
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/json"));
    }

    #[test]
    fn test_build_header_map_rejects_bad_value() {
        let map = build_header_map(&default_headers(Some("k"))).unwrap();
        assert_eq!(map.get("x-api-key").and_then(|v| v.to_str().ok()), Some("k"));

        let bad = vec![("x-api-key".to_string(), "line\nbreak".to_string())];
        assert!(build_header_map(&bad).is_err());
    }
}
