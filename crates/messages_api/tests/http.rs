use messages_api::{normalize_messages_url, MessagesApiClient, MessagesApiConfig, MessagesRequest};

#[test]
fn http_request_targets_configured_endpoint() {
    let config = MessagesApiConfig::new("secret").with_api_url("https://proxy.local/v1/messages/");
    let client = MessagesApiClient::new(config).expect("client");
    let request = MessagesRequest::new("model", 64, Some("sys".to_string())).with_message("user", "hi");

    let http_request = client
        .build_request(&request)
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(
        http_request.url().as_str(),
        normalize_messages_url("https://proxy.local/v1/messages/")
    );
    assert_eq!(http_request.method(), "POST");
    assert_eq!(
        http_request
            .headers()
            .get("x-api-key")
            .and_then(|value| value.to_str().ok()),
        Some("secret")
    );
}

#[test]
fn http_request_requires_api_key() {
    let client = MessagesApiClient::new(MessagesApiConfig::default()).expect("client");
    let request = MessagesRequest::new("model", 64, None);

    assert!(client.build_request(&request).is_err());
}
