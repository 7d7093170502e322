//! Integration tests for the echo and inspection endpoints.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn get_collapses_single_arguments_to_scalars() {
    let server = common::spawn_server().await;

    let body: Value = server
        .client
        .get(server.url("/get?a=1&b=2&b=3"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["arg"], json!({"a": "1", "b": ["2", "3"]}));
    assert_eq!(body["ip"], json!(["127.0.0.1"]));
    assert_eq!(body["method"], "GET");
    assert_eq!(body["url"], "/get?a=1&b=2&b=3");
    assert!(body.get("data").is_none(), "param echo never carries a body");
}

#[tokio::test]
async fn repeated_header_keeps_first_value() {
    let server = common::spawn_server().await;

    let body: Value = server
        .client
        .get(server.url("/headers"))
        .header("x-dup", "one")
        .header("x-dup", "two")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["headers"]["X-Dup"], "one");
}

#[tokio::test]
async fn malformed_json_still_echoes_raw_body() {
    let server = common::spawn_server().await;
    let raw = "{\"unterminated\": [1, 2";

    let res = server
        .client
        .post(server.url("/post"))
        .header("content-type", "application/json")
        .body(raw)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"], raw);
    assert!(body.get("json").is_none());
    assert_eq!(body["method"], "POST");
}

#[tokio::test]
async fn json_body_is_parsed() {
    let server = common::spawn_server().await;

    let body: Value = server
        .client
        .patch(server.url("/patch?v=2"))
        .json(&json!({"name": "servebin", "tags": ["a", "b"]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["json"], json!({"name": "servebin", "tags": ["a", "b"]}));
    assert_eq!(body["arg"], json!({"v": "2"}));
    assert_eq!(body["method"], "PATCH");
}

#[tokio::test]
async fn multipart_keeps_last_file_per_field() {
    let server = common::spawn_server().await;

    let form = Form::new()
        .text("note", "hello")
        .part(
            "upload",
            Part::bytes(b"first".to_vec())
                .file_name("a.txt")
                .mime_str("text/plain")
                .unwrap(),
        )
        .part(
            "upload",
            Part::bytes(b"second".to_vec())
                .file_name("b.csv")
                .mime_str("text/csv")
                .unwrap(),
        );

    let body: Value = server
        .client
        .put(server.url("/put"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let upload = &body["files"]["upload"];
    assert_eq!(upload["Filename"], "b.csv");
    assert_eq!(upload["Size"], 6);
    assert_eq!(upload["Human_Readable_Size"], "6 B");
    assert_eq!(upload["Content"], "data:text/csv;base64,c2Vjb25k");
    assert_eq!(body["form"], json!({"note": "hello"}));
    assert!(body.get("data").is_none());
    assert_eq!(body["method"], "PUT");
}

#[tokio::test]
async fn delete_echoes_method() {
    let server = common::spawn_server().await;

    let body: Value = server
        .client
        .delete(server.url("/delete"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["method"], "DELETE");
    assert_eq!(body["url"], "/delete");
}

#[tokio::test]
async fn ip_and_user_agent() {
    let server = common::spawn_server().await;

    let ip: Value = server
        .client
        .get(server.url("/ip"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ip, json!({"ip": ["127.0.0.1"]}));

    let ua: Value = server
        .client
        .get(server.url("/user-agent"))
        .header("user-agent", "servebin-tests/1.0")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ua, json!({"user-agent": "servebin-tests/1.0"}));
}

#[tokio::test]
async fn forwarded_for_is_honoured_from_trusted_peer() {
    let server = common::spawn_server().await;

    let body: Value = server
        .client
        .get(server.url("/ip"))
        .header("x-forwarded-for", "203.0.113.7")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["ip"], json!(["203.0.113.7"]));
}

#[tokio::test]
async fn forwarded_for_is_ignored_without_trusted_proxies() {
    let mut config = common::test_config();
    config.security.trusted_proxies = Some(Vec::new());
    let server = common::spawn_with(config).await;

    let body: Value = server
        .client
        .get(server.url("/ip"))
        .header("x-forwarded-for", "203.0.113.7")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["ip"], json!(["127.0.0.1"]));
}

#[tokio::test]
async fn head_and_options_mirror_headers() {
    let server = common::spawn_server().await;

    let res = server
        .client
        .head(server.url("/head?x=1"))
        .header("x-mirror", "yes")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-mirror"], "yes");
    assert_eq!(res.headers()["method"], "HEAD");
    assert_eq!(res.headers()["url"], "/head?x=1");
    assert_eq!(res.headers()["origin"], "127.0.0.1");

    let res = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/options"))
        .header("x-mirror", "again")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-mirror"], "again");
    assert_eq!(res.headers()["method"], "OPTIONS");
    assert_eq!(res.text().await.unwrap(), "null");
}

#[tokio::test]
async fn status_codes_are_reflected() {
    let server = common::spawn_server().await;

    let res = server.client.get(server.url("/status/418")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 418);
    assert!(res.bytes().await.unwrap().is_empty());

    let res = server.client.post(server.url("/status/201")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.client.get(server.url("/status")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_status_codes_are_client_errors() {
    let server = common::spawn_server().await;

    let res = server.client.get(server.url("/status/teapot")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], 404);
    assert!(body["message"].as_str().unwrap().contains("teapot"));

    let res = server.client.get(server.url("/status/1000")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let server = common::spawn_server().await;

    let res = server.client.get(server.url("/ip")).send().await.unwrap();
    assert!(!res.headers()["x-request-id"].is_empty());

    let res = server
        .client
        .get(server.url("/ip"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut config = common::test_config();
    config.security.max_body_size = 16;
    config.security.multipart_memory_limit = 16;
    let server = common::spawn_with(config).await;

    let res = server
        .client
        .post(server.url("/post"))
        .body(vec![b'x'; 64])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let server = common::spawn_server().await;
    let res = server.client.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
