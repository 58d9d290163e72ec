//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own runtime thread, then
//! drives every verb through the real `UreqTransport`. Validates that request
//! encoding and response decoding agree with an actual HTTP stack.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use mock_server::{Echo, Note, Pairs};
use serde::Serialize;
use serde_json::json;

use fetchkit_core::{
    ClientError, ContentType, Empty, ErrorKind, Headers, HttpClient, HttpMethod, HttpRequest, Json, NoParams,
    Transport, TransportConfig, UreqTransport, Url,
};

/// Start the mock server on a random port and return its base URL.
fn start_server() -> Url {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    Url::parse(&format!("http://{addr}/")).unwrap()
}

fn client() -> HttpClient {
    HttpClient::builder(start_server())
        .timeout(Some(Duration::from_secs(10)))
        .bearer_token("integration")
        .build()
}

#[derive(Serialize)]
struct NewNote<'a> {
    title: &'a str,
    tags: Vec<&'a str>,
}

#[tokio::test]
async fn get_sends_each_array_element_once() {
    let Json(seen): Json<Pairs> = client()
        .get("search", &json!({"q": ["a", "b"]}))
        .await
        .unwrap();

    let mut pairs = seen.pairs;
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("q".to_string(), "a".to_string()),
            ("q".to_string(), "b".to_string()),
        ]
    );
}

#[tokio::test]
async fn post_form_body() {
    let Json(echo): Json<Echo> = client()
        .post(
            "echo",
            &json!({"name": "Ada Lovelace", "langs": ["en", "fr"]}),
            ContentType::FormUrlEncoded,
        )
        .await
        .unwrap();

    assert_eq!(echo.method, "POST");
    assert_eq!(echo.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
    assert_eq!(echo.authorization.as_deref(), Some("Bearer integration"));
    assert_eq!(echo.body, "name=Ada+Lovelace&langs=en&langs=fr");
}

#[tokio::test]
async fn post_multipart_body() {
    let Json(echo): Json<Echo> = client()
        .post("echo", &json!({"avatar": STANDARD.encode("fake png")}), ContentType::Multipart)
        .await
        .unwrap();

    let content_type = echo.content_type.unwrap();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");
    let expected = format!(
        "\r\n--{boundary}\r\n\
         Content-Disposition: form-data; name=\"avatar\"; filename=\"avatar.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         fake png\r\n\
         --{boundary}--"
    );
    assert_eq!(echo.body, expected);
}

#[tokio::test]
async fn put_json_body() {
    let Json(echo): Json<Echo> = client()
        .put("echo", &json!({"done": true}), ContentType::Json)
        .await
        .unwrap();

    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.content_type.as_deref(), Some("application/json; charset=utf-8"));
    assert_eq!(echo.body, r#"{"done":true}"#);
}

#[tokio::test]
async fn delete_sends_json_whatever_content_type() {
    let Json(echo): Json<Echo> = client()
        .delete("echo", &json!({"reason": "spam"}), ContentType::Multipart)
        .await
        .unwrap();

    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.content_type.as_deref(), Some("application/json; charset=utf-8"));
    assert_eq!(echo.body, r#"{"reason":"spam"}"#);
}

#[tokio::test]
async fn text_and_bytes_responses() {
    let client = client();

    let text: String = client.get("text", &NoParams).await.unwrap();
    assert_eq!(text, "hello");

    let bytes: Bytes = client.get("bytes", &NoParams).await.unwrap();
    assert_eq!(&bytes[..], &[0u8, 1, 2, 254, 255]);

    let empty: Empty = client.get("empty", &NoParams).await.unwrap();
    assert_eq!(empty, Empty {});
}

#[tokio::test]
async fn body_past_ten_mib_is_read_in_full() {
    let body: Vec<u8> = client().get("big", &NoParams).await.unwrap();
    assert_eq!(body.len(), mock_server::BIG_BODY_LEN);
    assert!(body
        .iter()
        .enumerate()
        .all(|(i, b)| *b == mock_server::big_body_byte(i)));
}

#[tokio::test]
async fn capped_body_keeps_status_and_headers() {
    let base = start_server();
    let transport = UreqTransport::new(TransportConfig {
        max_body_size: 2,
        ..TransportConfig::default()
    });
    let outcome = transport
        .send(HttpRequest {
            method: HttpMethod::Get,
            url: base.join("bytes").unwrap().to_string(),
            headers: Headers::new(),
            body: None,
        })
        .await;

    let response = outcome.response.expect("headers arrived before the body failed");
    assert_eq!(response.status, 200);
    assert_eq!(response.headers.get("content-type"), Some("application/octet-stream"));
    assert!(response.body.is_empty());
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn decode_error_names_the_redirect_target() {
    let err = client()
        .get::<_, Json<serde_json::Value>>("moved", &NoParams)
        .await
        .unwrap_err();
    match err {
        ClientError::Decode { url, .. } => {
            assert!(url.ends_with("/malformed"), "got {url}");
        }
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_decode_error() {
    let err = client()
        .get::<_, Json<serde_json::Value>>("malformed", &NoParams)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("/malformed"));
}

#[tokio::test]
async fn note_lifecycle() {
    let client = client();

    // Step 1: create.
    let Json(created): Json<Note> = client
        .post(
            "notes",
            &NewNote {
                title: "Integration test",
                tags: vec!["a"],
            },
            ContentType::Json,
        )
        .await
        .unwrap();
    assert_eq!(created.title, "Integration test");
    let path = format!("notes/{}", created.id);

    // Step 2: fetch it back.
    let Json(fetched): Json<Note> = client.get(&path, &NoParams).await.unwrap();
    assert_eq!(fetched, created);

    // Step 3: update tags.
    let Json(updated): Json<Note> = client
        .put(&path, &json!({"tags": ["b", "c"]}), ContentType::Json)
        .await
        .unwrap();
    assert_eq!(updated.tags, vec!["b".to_string(), "c".to_string()]);

    // Step 4: delete returns the removed note.
    let Json(deleted): Json<Note> = client.delete(&path, &NoParams, ContentType::Json).await.unwrap();
    assert_eq!(deleted, updated);

    // Step 5: the 404 has an empty, untyped body, so it cannot become a Note.
    let err = client.get::<_, Json<Note>>(&path, &NoParams).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::builder(Url::parse(&format!("http://{addr}/")).unwrap())
        .timeout(Some(Duration::from_secs(2)))
        .build();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.get::<_, String>("anything", &NoParams),
    )
    .await
    .expect("transport should give up within its timeout");

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
