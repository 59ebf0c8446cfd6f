//! Registration client against an in-process HTTP service

use super::test_server::{registry_handler, TestServer};
use std::fs;
use tempfile::TempDir;
use timevouch::client::{ProtocolVersion, RegistrationClient, TimeVouchClient, ValidationSummary};
use timevouch::config::{ServiceConfig, TimeVouchConfig};
use timevouch::progress::NullSink;
use timevouch::tree::hasher::digest_bytes;
use timevouch::{ApiError, Registrar, WalkOutcome};

const FOO: &str = "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae";

fn service(url: String) -> ServiceConfig {
    ServiceConfig {
        endpoint: url,
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
        ..ServiceConfig::default()
    }
}

#[tokio::test]
async fn test_new_then_known_registration() {
    let server = TestServer::registry("digest", "olddigest").await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();
    let digest = digest_bytes(b"foo");

    let first = client.register(&digest, None).await.unwrap();
    assert_eq!(first.digest.as_str(), FOO);
    assert!(!first.previously_registered);
    assert_eq!(first.registered, "2011-03-08T16:32:49Z");
    assert_eq!(first.current_time.as_deref(), Some("2011-03-09T10:00:00Z"));
    assert!(first.registered_at().is_some());

    let second = client.register(&digest, None).await.unwrap();
    assert!(second.previously_registered);
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn test_form_carries_digest_and_secret() {
    let server = TestServer::registry("digest", "olddigest").await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();

    client
        .register(&digest_bytes(b"foo"), Some("passtest"))
        .await
        .unwrap();
    client.register(&digest_bytes(b"bar"), Some("")).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].get("digest").map(String::as_str), Some(FOO));
    assert_eq!(
        requests[0].get("secretword").map(String::as_str),
        Some("passtest")
    );
    assert!(!requests[1].contains_key("secretword"));
}

#[tokio::test]
async fn test_secret_with_reserved_characters_round_trips() {
    let handler = registry_handler("digest", "olddigest", Some("pass word&x=1"));
    let server = TestServer::start(handler).await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();

    let result = client
        .register(&digest_bytes(b"foo"), Some("pass word&x=1"))
        .await
        .unwrap();
    assert!(!result.previously_registered);

    let requests = server.requests();
    assert_eq!(
        requests[0].get("secretword").map(String::as_str),
        Some("pass word&x=1")
    );
    assert!(!requests[0].contains_key("x"));
}

#[tokio::test]
async fn test_structured_rejection() {
    let server = TestServer::start(registry_handler("digest", "olddigest", Some("passtest"))).await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();

    let err = client
        .register(&digest_bytes(b"foo"), Some("wrong"))
        .await
        .unwrap_err();

    match err {
        ApiError::RegistrationRejected {
            status,
            error,
            message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(error, "badsecret");
            assert_eq!(message, "Secret word does not match");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_transport() {
    let server = TestServer::fixed(500, r#"{"error":"internal","message":"boom"}"#).await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();

    let err = client.register(&digest_bytes(b"foo"), None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_unstructured_client_error_is_transport() {
    let server = TestServer::fixed(404, "<html>not here</html>").await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();

    let err = client.register(&digest_bytes(b"foo"), None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_malformed_success_body_is_transport() {
    let server = TestServer::fixed(200, "not json").await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();

    let err = client.register(&digest_bytes(b"foo"), None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_missing_known_field_is_transport() {
    let body = format!(r#"{{"digest":"{}","registered":"2011-03-08T16:32:49Z"}}"#, FOO);
    let server = TestServer::fixed(200, &body).await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();

    let err = client.register(&digest_bytes(b"foo"), None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(msg) if msg.contains("olddigest")));
}

#[tokio::test]
async fn test_connection_refused_is_transport() {
    let client = TimeVouchClient::new(&service("http://127.0.0.1:1/api".to_string())).unwrap();

    let err = client.register(&digest_bytes(b"foo"), None).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_legacy_protocol_field_names() {
    let server = TestServer::registry("docid", "olddocid").await;
    let config = ServiceConfig {
        protocol: ProtocolVersion::Legacy,
        ..service(server.url())
    };
    let client = TimeVouchClient::new(&config).unwrap();

    client.register(&digest_bytes(b"foo"), None).await.unwrap();
    let again = client.register(&digest_bytes(b"foo"), None).await.unwrap();

    assert!(again.previously_registered);
    assert!(server.requests()[0].contains_key("docid"));
}

#[tokio::test]
async fn test_known_field_override() {
    let server = TestServer::registry("digest", "known").await;
    let config = ServiceConfig {
        known_field: Some("known".to_string()),
        ..service(server.url())
    };
    let client = TimeVouchClient::new(&config).unwrap();

    client.register(&digest_bytes(b"foo"), None).await.unwrap();
    let again = client.register(&digest_bytes(b"foo"), None).await.unwrap();
    assert!(again.previously_registered);
}

#[tokio::test]
async fn test_extended_validation_fields() {
    let body = format!(
        r#"{{"digest":"{}","registered":"2011-03-08T16:32:49Z","olddigest":"1","validatesummary":"unsuccessful","validatemessage":"Content differs from the archive."}}"#,
        FOO
    );
    let server = TestServer::fixed(200, &body).await;
    let client = TimeVouchClient::new(&service(server.url())).unwrap();

    let result = client.register(&digest_bytes(b"foo"), None).await.unwrap();
    assert!(result.previously_registered);
    let validation = result.validation.unwrap();
    assert_eq!(validation.summary, ValidationSummary::Unsuccessful);
    assert_eq!(
        validation.message.as_deref(),
        Some("Content differs from the archive.")
    );
}

#[tokio::test]
async fn test_tree_walk_over_http() {
    let server = TestServer::registry("digest", "olddigest").await;
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("a.txt"), "a").unwrap();
    fs::write(root.join("b.txt"), "b").unwrap();

    let mut config = TimeVouchConfig::default();
    config.service = service(server.url());
    let registrar = Registrar::from_config(&config).unwrap();

    let outcome = registrar.register_tree(root, &mut NullSink).await.unwrap();
    assert!(outcome.is_completed());
    // two files + two directories
    assert_eq!(server.request_count(), 4);

    let again = registrar.register_tree(root, &mut NullSink).await.unwrap();
    match again {
        WalkOutcome::Completed(result) => {
            assert!(result.previously_registered);
            assert_eq!(result.digest, outcome.result().digest);
        }
        other => panic!("unexpected {:?}", other),
    }
}
