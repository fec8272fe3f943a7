//! Integration tests using wiremock to simulate HTTP servers.

use fluent_http::{Client, Cookie, Error};
use serde::{Deserialize, Serialize};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fluent_http=debug")
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn test_successful_get_request() {
    init_tracing();
    let mock_server = MockServer::start().await;

    let response_data = TestData {
        id: 1,
        name: "Test".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_data))
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .get(format!("{}/test", mock_server.uri()))
        .send()
        .await;

    assert!(response.error().is_none());
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.status(), "200 OK");
    assert_eq!(response.json::<TestData>().await.unwrap(), response_data);
}

#[tokio::test]
async fn test_json_body_post_request() {
    let mock_server = MockServer::start().await;

    let request_data = TestData {
        id: 0,
        name: "New".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/test"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"id":0,"name":"New"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"name":"New"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let created: TestData = Client::new()
        .post(format!("{}/test", mock_server.uri()))
        .json(&request_data)
        .send()
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn test_form_body_post_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("content-length", "7"))
        .and(body_string("x=1&y=2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = Client::new()
        .post(format!("{}/login", mock_server.uri()))
        .form([("x", "1"), ("y", "2")])
        .send()
        .await
        .text()
        .await
        .unwrap();

    assert_eq!(text, "welcome");
}

#[tokio::test]
async fn test_http_error_404() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .get(format!("{}/test", mock_server.uri()))
        .send()
        .await;

    // Not an error until the body is read
    assert!(response.error().is_none());
    assert_eq!(response.status_code(), 404);

    let err = response.bytes().await.unwrap_err();
    assert_eq!(err.to_string(), "404 Not Found not found");
    match err {
        Error::HttpError {
            status,
            raw_response,
            ..
        } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(raw_response, "not found");
        }
        other => panic!("Expected HttpError, got {:?}", other),
    }

    // Cached: same error again, and now stored on the response
    let again = response.text().await.unwrap_err();
    assert_eq!(again.to_string(), "404 Not Found not found");
    assert!(matches!(response.error(), Some(Error::HttpError { .. })));
}

#[tokio::test]
async fn test_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let result = Client::new()
        .get(format!("{}/test", mock_server.uri()))
        .send()
        .await
        .json::<TestData>()
        .await;

    match result {
        Err(Error::DeserializationFailed {
            raw_response,
            serde_error,
            status,
        }) => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, "invalid json");
            assert!(serde_error.contains("expected"));
        }
        _ => panic!("Expected DeserializationFailed, got {:?}", result),
    }
}

#[tokio::test]
async fn test_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust lang"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .get(format!("{}/search", mock_server.uri()))
        .query("q", "rust lang")
        .query("tag", "a")
        .query("tag", "b")
        .query("page", "2")
        .send()
        .await;
    assert_eq!(response.text().await.unwrap(), "ok");

    let requests = mock_server.received_requests().await.unwrap();
    let pairs: Vec<_> = requests[0].url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("q".to_string(), "rust lang".to_string()),
            ("tag".to_string(), "a".to_string()),
            ("tag".to_string(), "b".to_string()),
            ("page".to_string(), "2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_query_object_and_existing_query_string() {
    #[derive(Serialize)]
    struct Filter {
        limit: u32,
        active: bool,
    }

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("sort", "name"))
        .and(query_param("limit", "10"))
        .and(query_param("active", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let items: Vec<TestData> = Client::new()
        .get(format!("{}/items?sort=name", mock_server.uri()))
        .query_object(&Filter {
            limit: 10,
            active: true,
        })
        .send()
        .await
        .json()
        .await
        .unwrap();

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_headers_and_cookies_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("x-request-id", "42"))
        .and(header("user-agent", "test-agent"))
        .and(header("cookie", "session=abc; theme=dark"))
        .respond_with(ResponseTemplate::new(200).set_body_string("me"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .default_header("User-Agent", "test-agent")
        .unwrap()
        .build()
        .unwrap();

    let response = client
        .get(format!("{}/me", mock_server.uri()))
        .header("x-request-id", "41")
        .header("X-Request-Id", "42")
        .cookie(&Cookie::new("session", "abc"))
        .cookie(&Cookie::new("theme", "dark"))
        .send()
        .await;

    assert_eq!(response.text().await.unwrap(), "me");
}

#[tokio::test]
async fn test_response_metadata_and_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("hi")
                .insert_header("x-custom-header", "custom-value")
                .insert_header("set-cookie", "session=s3cr3t; Path=/; HttpOnly"),
        )
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .get(format!("{}/test", mock_server.uri()))
        .send()
        .await;

    assert_eq!(response.header("x-custom-header"), Some("custom-value"));
    assert!(response.raw().is_some());

    let session = response.cookie("session").unwrap();
    assert_eq!(session.value(), "s3cr3t");
    assert_eq!(session.http_only(), Some(true));
    assert!(response.cookie("missing").is_none());
}

#[tokio::test]
async fn test_invalid_url_is_deferred() {
    let response = Client::new()
        .get("http://exa mple.com/")
        .query("a", "1")
        .header("x", "y")
        .send()
        .await;

    assert!(response.raw().is_none());
    assert!(matches!(response.error(), Some(Error::InvalidUrl(_))));
    assert!(response.headers().is_empty());
    assert_eq!(response.status_code(), 0);
    assert!(matches!(response.bytes().await, Err(Error::InvalidUrl(_))));
}

#[tokio::test]
async fn test_network_error() {
    // Nothing listens on port 1
    let response = Client::new().get("http://127.0.0.1:1/").send().await;

    assert!(response.raw().is_none());
    assert!(matches!(response.error(), Some(Error::Network(_))));
    assert_eq!(response.status(), "");
    assert!(response.cookies().is_empty());
    assert!(response.text().await.is_err());
}

#[tokio::test]
async fn test_get_json_shortcut() {
    let mock_server = MockServer::start().await;

    let response_data = TestData {
        id: 7,
        name: "Shortcut".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_data))
        .mount(&mock_server)
        .await;

    let data: TestData = fluent_http::get_json(format!("{}/test", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(data, response_data);
}

#[tokio::test]
async fn test_all_http_methods() {
    let mock_server = MockServer::start().await;

    for verb in ["OPTIONS", "GET", "HEAD", "POST", "PUT", "DELETE"] {
        Mock::given(method(verb))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = Client::new();
    let url = format!("{}/test", mock_server.uri());

    for builder in [
        client.options(&url),
        client.get(&url),
        client.head(&url),
        client.post(&url),
        client.put(&url),
        client.delete(&url),
    ] {
        let response = builder.send().await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.bytes().await.unwrap().len(), 0);
    }
}

#[tokio::test]
async fn test_non_200_success_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let response = Client::new()
        .delete(format!("{}/test", mock_server.uri()))
        .send()
        .await;

    assert_eq!(response.status_code(), 204);
    match response.bytes().await {
        Err(Error::HttpError { status, .. }) => assert_eq!(status.as_u16(), 204),
        other => panic!("Expected HttpError, got {:?}", other),
    }
}
