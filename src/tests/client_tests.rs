//! Client tests against the mock transport.

use crate::client::SlackClient;
use crate::config::{SlackConfigBuilder, TlsVerify};
use crate::errors::{SlackError, TransportError};
use crate::mocks::{FixedClock, MockHttpTransport, MockResponse};
use crate::transport::{HttpTransport, HttpVerb, RequestOptions};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_case::test_case;

fn mock_client(transport: Arc<MockHttpTransport>, token: &str) -> SlackClient {
    SlackClient::new(transport, Some(token.to_string()))
        .unwrap()
        .with_clock(Arc::new(FixedClock::new(1_700_000_000)))
}

async fn call(
    client: &SlackClient,
    verb: HttpVerb,
    method: &str,
) -> crate::SlackResult<serde_json::Value> {
    let options = RequestOptions::new();
    match verb {
        HttpVerb::Get => client.get(method, options).await,
        HttpVerb::Post => client.post(method, options).await,
        HttpVerb::Put => client.put(method, options).await,
        HttpVerb::Delete => client.delete(method, options).await,
        HttpVerb::Patch => client.patch(method, options).await,
    }
}

#[tokio::test]
async fn test_get_decodes_json_object() {
    let transport = Arc::new(
        MockHttpTransport::new().add_response(MockResponse::ok(r#"{"ok":true,"value":42}"#)),
    );
    let client = mock_client(transport.clone(), "xoxb-test");

    let response = client.get("test.method", RequestOptions::new()).await.unwrap();

    assert_eq!(response, json!({"ok": true, "value": 42}));
    assert!(response.is_object());

    let request = transport.last_request().unwrap();
    assert_eq!(request.verb, HttpVerb::Get);
    assert_eq!(request.url, "https://slack.com/api/test.method");
}

#[test_case(HttpVerb::Get ; "get")]
#[test_case(HttpVerb::Post ; "post")]
#[test_case(HttpVerb::Put ; "put")]
#[test_case(HttpVerb::Delete ; "delete")]
#[test_case(HttpVerb::Patch ; "patch")]
#[tokio::test]
async fn test_verb_dispatch_injects_auth(verb: HttpVerb) {
    let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("{}")));
    let client = mock_client(transport.clone(), "xoxb-verb");

    call(&client, verb, "users.info").await.unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.verb, verb);
    assert_eq!(request.url, "https://slack.com/api/users.info");
    assert_eq!(request.query_param("t"), Some("1700000000"));
    assert_eq!(request.query_param("token"), Some("xoxb-verb"));
}

#[test_case(HttpVerb::Get ; "get")]
#[test_case(HttpVerb::Post ; "post")]
#[test_case(HttpVerb::Put ; "put")]
#[test_case(HttpVerb::Delete ; "delete")]
#[test_case(HttpVerb::Patch ; "patch")]
#[tokio::test]
async fn test_non_json_body_is_parse_error(verb: HttpVerb) {
    let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("not json")));
    let client = mock_client(transport, "xoxb-test");

    let result = call(&client, verb, "test.method").await;

    assert!(matches!(result, Err(SlackError::Parse(_))));
}

#[tokio::test]
async fn test_caller_cannot_override_reserved_params() {
    let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("{}")));
    let client = mock_client(transport.clone(), "xoxb-real");

    let options = RequestOptions::new()
        .query("t", "1")
        .query("token", "xoxb-forged")
        .query("channel", "C123")
        .body(json!({"text": "hi"}));
    client.post("chat.postMessage", options).await.unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.query_param("t"), Some("1700000000"));
    assert_eq!(request.query_param("token"), Some("xoxb-real"));
    assert_eq!(request.query_param("channel"), Some("C123"));
    assert_eq!(request.options.body, Some(json!({"text": "hi"})));
}

#[tokio::test]
async fn test_auth_reflects_state_at_send_time() {
    let transport =
        Arc::new(MockHttpTransport::new().with_default_response(MockResponse::ok("{}")));
    let clock = Arc::new(FixedClock::new(100));
    let mut client = SlackClient::new(transport.clone(), Some("xoxb-first".to_string()))
        .unwrap()
        .with_clock(clock.clone());

    client.get("api.test", RequestOptions::new()).await.unwrap();

    client.set_token("xoxb-second");
    clock.set(200);
    client.get("api.test", RequestOptions::new()).await.unwrap();

    let requests = transport.recorded_requests();
    assert_eq!(requests[0].query_param("token"), Some("xoxb-first"));
    assert_eq!(requests[0].query_param("t"), Some("100"));
    assert_eq!(requests[1].query_param("token"), Some("xoxb-second"));
    assert_eq!(requests[1].query_param("t"), Some("200"));
}

#[tokio::test]
async fn test_without_token_only_timestamp_is_sent() {
    let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("{}")));
    let client = SlackClient::new(transport.clone(), None)
        .unwrap()
        .with_clock(Arc::new(FixedClock::new(5)));

    client
        .get("api.test", RequestOptions::new().query("token", "xoxb-forged"))
        .await
        .unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.query_param("t"), Some("5"));
    assert_eq!(request.query_param("token"), None);
}

#[tokio::test]
async fn test_transport_error_propagates_unchanged() {
    let transport = Arc::new(
        MockHttpTransport::new().add_response(MockResponse::error(TransportError::ConnectionFailed {
            message: "connection refused".to_string(),
        })),
    );
    let client = mock_client(transport, "xoxb-test");

    let result = client.delete("files.delete", RequestOptions::new()).await;

    match result {
        Err(SlackError::Transport(TransportError::ConnectionFailed { message })) => {
            assert_eq!(message, "connection refused");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_slack_error_payload_is_returned_as_value() {
    let transport = Arc::new(
        MockHttpTransport::new().add_json_response(&json!({"ok": false, "error": "invalid_auth"})),
    );
    let client = mock_client(transport, "xoxb-test");

    let response = client.get("auth.test", RequestOptions::new()).await.unwrap();

    assert_eq!(response["ok"], json!(false));
    assert_eq!(response["error"], json!("invalid_auth"));
}

#[tokio::test]
async fn test_get_as_deserializes_typed_response() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct AuthTest {
        ok: bool,
        user_id: String,
    }

    let transport = Arc::new(
        MockHttpTransport::new()
            .add_json_response(&json!({"ok": true, "user_id": "U123", "team": "T1"})),
    );
    let client = mock_client(transport, "xoxb-test");

    let response: AuthTest = client.get_as("auth.test", RequestOptions::new()).await.unwrap();

    assert_eq!(
        response,
        AuthTest {
            ok: true,
            user_id: "U123".to_string(),
        }
    );
}

#[tokio::test]
async fn test_method_sends_options_verbatim() {
    let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("[1,2]")));
    let client = mock_client(transport.clone(), "xoxb-test");

    let response = client
        .method(
            HttpVerb::Put,
            "https://example.test/raw",
            RequestOptions::new().query("a", "b"),
        )
        .await
        .unwrap();

    assert_eq!(response, json!([1, 2]));
    let request = transport.last_request().unwrap();
    assert_eq!(request.url, "https://example.test/raw");
    assert_eq!(request.query_param("token"), None);
    assert_eq!(request.query_param("a"), Some("b"));
}

#[test]
fn test_factory_always_replaces_transport() {
    let first = Arc::new(MockHttpTransport::new());
    let second = Arc::new(MockHttpTransport::new());
    let mut client = SlackClient::new(first, None).unwrap();

    let calls = AtomicUsize::new(0);
    let replacement = second.clone();
    client
        .set_transport_factory(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(replacement as Arc<dyn HttpTransport>)
            },
            None,
        )
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let current = client.transport().unwrap();
    let expected: Arc<dyn HttpTransport> = second;
    assert!(Arc::ptr_eq(current, &expected));
}

#[test]
fn test_factory_error_propagates() {
    let mut client = SlackClient::new(Arc::new(MockHttpTransport::new()), None).unwrap();

    let result = client.set_transport_factory(
        || Err(TransportError::Http("factory failed".to_string()).into()),
        None,
    );

    assert!(matches!(result, Err(SlackError::Transport(TransportError::Http(_)))));
}

#[test]
fn test_plain_transport_only_set_when_absent() {
    let first = Arc::new(MockHttpTransport::new());
    let second = Arc::new(MockHttpTransport::new());
    let mut client = SlackClient::new(first.clone(), None).unwrap();

    client.set_transport(second.clone(), None).unwrap();

    let current = client.transport().unwrap();
    let expected: Arc<dyn HttpTransport> = first.clone();
    assert!(Arc::ptr_eq(current, &expected));
    // the rejected instance is never configured
    assert_eq!(first.default_verify(), Some(TlsVerify::Bundled));
    assert_eq!(second.default_verify(), None);
}

#[test]
fn test_plain_transport_installed_on_fresh_client() {
    let mut client = crate::create_client(SlackConfigBuilder::new().build());
    let transport = Arc::new(MockHttpTransport::new());

    client
        .set_transport(transport.clone(), Some(TlsVerify::Disabled))
        .unwrap();

    let expected: Arc<dyn HttpTransport> = transport.clone();
    assert!(Arc::ptr_eq(client.transport().unwrap(), &expected));
    assert_eq!(transport.default_verify(), Some(TlsVerify::Disabled));
}

#[test]
fn test_new_applies_bundled_verify_by_default() {
    let transport = Arc::new(MockHttpTransport::new());
    let client = SlackClient::new(transport.clone(), None).unwrap();

    assert_eq!(transport.default_verify(), Some(TlsVerify::Bundled));
    assert_eq!(client.ssl_verify_path(), TlsVerify::Bundled);
}

#[test]
fn test_empty_verify_keeps_existing_setting() {
    let transport =
        Arc::new(MockHttpTransport::new().with_verify(TlsVerify::from("/etc/ssl/existing.pem")));
    let client = SlackClient::new(transport.clone(), None).unwrap();

    client
        .set_ssl_verify_path(TlsVerify::from_setting(""))
        .unwrap();

    assert_eq!(
        client.ssl_verify_path(),
        TlsVerify::from("/etc/ssl/existing.pem")
    );
}

#[test]
fn test_empty_verify_keeps_configured_setting_on_lazy_transport() {
    let config = SlackConfigBuilder::new().tls_verify(false).build();
    let client = crate::create_client(config);

    client
        .set_ssl_verify_path(TlsVerify::from_setting(""))
        .unwrap();

    assert_eq!(client.ssl_verify_path(), TlsVerify::Disabled);
}

#[test]
fn test_explicit_verify_always_overrides() {
    let transport =
        Arc::new(MockHttpTransport::new().with_verify(TlsVerify::from("/etc/ssl/existing.pem")));
    let client = SlackClient::new(transport.clone(), None).unwrap();

    client
        .set_ssl_verify_path(TlsVerify::from_setting("/custom/path"))
        .unwrap();

    assert_eq!(transport.default_verify(), Some(TlsVerify::from("/custom/path")));
}

#[test]
fn test_ssl_verify_path_without_transport_is_bundled() {
    let client = crate::create_client(SlackConfigBuilder::new().build());
    assert_eq!(client.ssl_verify_path(), TlsVerify::Bundled);
}

#[test]
fn test_ensure_transport_builds_default_lazily() {
    let config = SlackConfigBuilder::new().tls_verify(false).build();
    let mut client = crate::create_client(config);

    client.ensure_transport(None).unwrap();

    assert_eq!(client.ssl_verify_path(), TlsVerify::Disabled);
}

#[test]
fn test_ensure_transport_keeps_existing() {
    let transport = Arc::new(MockHttpTransport::new());
    let mut client = SlackClient::new(transport.clone(), None).unwrap();

    client.ensure_transport(Some(TlsVerify::Disabled)).unwrap();

    let expected: Arc<dyn HttpTransport> = transport.clone();
    assert!(Arc::ptr_eq(client.transport().unwrap(), &expected));
    assert_eq!(transport.default_verify(), Some(TlsVerify::Disabled));
}
