// cargo test -p web-conferences-e2e --test integration

use std::sync::Arc;

use hyper::StatusCode;
use serde_json::json;
use tokio::net::TcpStream;
use web_conferences_config::ApiConfig;
use web_conferences_database::memory::MemoryStore;
use web_conferences_database::models::{
    ContextRef, EnrollmentRole, EnrollmentState, NewWebConference, PluginSetting,
};
use web_conferences_e2e::http_e2e::TestServer;
use web_conferences_e2e::init_test_tracing;

async fn course_with_conferences(store: &MemoryStore, count: usize) -> (String, String) {
    store
        .put_plugin_setting(PluginSetting {
            name: "big_blue_button".to_owned(),
            disabled: false,
            settings: json!({ "domain": "bbb.test", "secret": "s3cr3t" }),
        })
        .await;
    let course = store.create_course("course").await;
    let teacher = store.create_user("teacher").await;
    store
        .enroll(
            course.id,
            teacher.id,
            EnrollmentRole::Ta,
            EnrollmentState::Active,
        )
        .await;
    for n in 1..=count {
        store
            .create_conference(NewWebConference::new(
                ContextRef::Course(course.id),
                teacher.id,
                "BigBlueButton",
                format!("Lecture {n}"),
                Some(90),
            ))
            .await;
    }
    let token = store.create_access_token(teacher.id).await;
    (format!("/api/v1/courses/{}/conferences", course.id), token)
}

#[tokio::test]
async fn lists_conferences_over_http() {
    init_test_tracing();
    let store = Arc::new(MemoryStore::new());
    let (url, token) = course_with_conferences(&store, 3).await;
    let server = TestServer::start(store, ApiConfig::default()).await.unwrap();

    let response = server
        .get(&format!("{url}?per_page=2"), Some(&token))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert!(response.header("x-request-id").is_some());
    assert_eq!(
        response.header("link"),
        Some(
            format!(
                "<{url}?page=1&per_page=2>; rel=\"current\",<{url}?page=2&per_page=2>; \
                 rel=\"next\",<{url}?page=1&per_page=2>; rel=\"first\",\
                 <{url}?page=2&per_page=2>; rel=\"last\""
            )
            .as_str()
        )
    );

    let body = response.json().unwrap();
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|conference| conference["title"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(titles, vec!["Lecture 3", "Lecture 2"]);
    assert_eq!(body[0]["has_advanced_settings"], true);
    assert_eq!(body[0]["long_running"], false);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn rejects_anonymous_and_unknown_tokens() {
    init_test_tracing();
    let store = Arc::new(MemoryStore::new());
    let (url, _token) = course_with_conferences(&store, 1).await;
    let server = TestServer::start(store, ApiConfig::default()).await.unwrap();

    let anonymous = server.get(&url, None).await.unwrap();
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.json().unwrap()["status"], "unauthenticated");

    let unknown = server.get(&url, Some("0123456789")).await.unwrap();
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        unknown.json().unwrap()["errors"][0]["message"],
        "Invalid access token."
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn stops_listening_after_shutdown() {
    init_test_tracing();
    let server = TestServer::start(Arc::new(MemoryStore::new()), ApiConfig::default())
        .await
        .unwrap();
    let addr = server.addr();
    assert_eq!(
        server.get("/nowhere", None).await.unwrap().status,
        StatusCode::NOT_FOUND
    );

    server.stop().await.unwrap();
    assert!(TcpStream::connect(addr).await.is_err());
}
