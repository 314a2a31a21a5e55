use messages_api::headers::{
    build_headers, HEADER_API_KEY, HEADER_API_VERSION, HEADER_CONTENT_TYPE, HEADER_USER_AGENT,
};
use messages_api::{MessagesApiConfig, MessagesApiError};

#[test]
fn header_map_contains_messages_headers() {
    let config = MessagesApiConfig::new(" secret-key ").insert_header(" X-Extra ", "value");

    let headers = build_headers(&config).expect("header construction");
    assert_eq!(
        headers.get(HEADER_API_KEY).expect("api key header"),
        &"secret-key".to_owned()
    );
    assert_eq!(
        headers.get(HEADER_API_VERSION).expect("version header"),
        &"2023-06-01".to_owned()
    );
    assert_eq!(
        headers.get(HEADER_CONTENT_TYPE).expect("content-type"),
        &"application/json".to_owned()
    );
    assert_eq!(headers.get("x-extra").expect("custom"), &"value".to_owned());
    assert!(headers.get(HEADER_USER_AGENT).is_none());
}

#[test]
fn header_map_includes_user_agent_override() {
    let config = MessagesApiConfig::new("secret-key")
        .with_user_agent("scene-composer/0.1")
        .with_api_version("2024-01-01");
    let headers = build_headers(&config).expect("header construction");
    assert_eq!(
        headers.get(HEADER_USER_AGENT).expect("user-agent"),
        &"scene-composer/0.1".to_string()
    );
    assert_eq!(
        headers.get(HEADER_API_VERSION).expect("version header"),
        &"2024-01-01".to_string()
    );
}

#[test]
fn header_map_rejects_blank_api_key() {
    let config = MessagesApiConfig::new("   ");
    let error = build_headers(&config).expect_err("blank key should fail");
    assert!(matches!(error, MessagesApiError::MissingApiKey));
}
