use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;

/// Field names a refresh or login response may carry the access token under,
/// in priority order. Backends disagree on the casing; this list is the only
/// place that knows about it.
const ACCESS_TOKEN_ALIASES: &[&str] = &["accessToken", "access_token", "token"];

/// Pulls the access token out of an auth response body. An alias only counts
/// when it holds a non-empty string; otherwise the next one is tried.
pub(crate) fn extract_access_token(body: &Value) -> Option<String> {
    ACCESS_TOKEN_ALIASES.iter().find_map(|alias| {
        body.get(alias)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// Stand-in error body for non-JSON error responses, shaped like the API's
/// `{ "error": string }` envelope.
pub(crate) fn fallback_error_body(status: StatusCode) -> Value {
    json!({ "error": format!("request failed with status {status}") })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::extract_access_token;

    #[test]
    fn prefers_camel_case_alias() {
        let body = json!({
            "accessToken": "camel",
            "access_token": "snake",
            "token": "plain",
        });
        assert_eq!(extract_access_token(&body).as_deref(), Some("camel"));
    }

    #[test]
    fn falls_through_non_string_aliases() {
        let body = json!({
            "accessToken": 17,
            "access_token": "snake",
        });
        assert_eq!(extract_access_token(&body).as_deref(), Some("snake"));
    }

    #[test]
    fn rejects_empty_tokens() {
        let body = json!({
            "accessToken": "",
            "token": "plain",
        });
        assert_eq!(extract_access_token(&body).as_deref(), Some("plain"));
    }

    #[test]
    fn missing_token_yields_none() {
        assert_eq!(extract_access_token(&json!({ "user": { "id": 3 } })), None);
        assert_eq!(extract_access_token(&json!(null)), None);
    }
}
