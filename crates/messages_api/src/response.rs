use serde::Deserialize;

use crate::error::MessagesApiError;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Extract the first text element of a messages response body.
///
/// Bodies that are not JSON objects, lack a `content` array, or carry no
/// non-empty `text` element are reported as [`MessagesApiError::MalformedResponse`].
pub fn extract_response_text(body: &str) -> Result<String, MessagesApiError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|error| {
        MessagesApiError::MalformedResponse(format!("response body is not valid JSON: {error}"))
    })?;

    if !value.is_object() {
        return Err(MessagesApiError::MalformedResponse(
            "unexpected response format".to_string(),
        ));
    }

    let response: MessagesResponse = serde_json::from_value(value).map_err(|error| {
        MessagesApiError::MalformedResponse(format!("invalid response format: {error}"))
    })?;

    let Some(content) = response.content else {
        return Err(MessagesApiError::MalformedResponse(
            "invalid response format: missing content".to_string(),
        ));
    };

    let text = content.into_iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text),
        ContentBlock::Other => None,
    });

    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(MessagesApiError::MalformedResponse(
            "no text content in response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::extract_response_text;
    use crate::error::MessagesApiError;

    #[test]
    fn first_text_block_wins() {
        let body = r#"{"content":[{"type":"tool_use","id":"x"},{"type":"text","text":"first"},{"type":"text","text":"second"}]}"#;
        assert_eq!(extract_response_text(body).expect("text"), "first");
    }

    #[test]
    fn non_object_body_is_malformed() {
        let error = extract_response_text("[1, 2]").expect_err("array body must fail");
        assert!(matches!(error, MessagesApiError::MalformedResponse(message) if message.contains("unexpected")));
    }

    #[test]
    fn missing_text_block_is_malformed() {
        let error = extract_response_text(r#"{"content":[{"type":"image"}]}"#)
            .expect_err("no text must fail");
        assert!(matches!(error, MessagesApiError::MalformedResponse(message) if message.contains("no text")));
    }
}
