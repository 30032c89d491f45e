mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/users/me", "/teams?page_id=1&page_size=5", "/projects/1"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "GET {}", path);

        let body: Value = res.json().await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .get(server.url("/users/me"))
        .bearer_auth("not-a-jwt")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid or expired token");
    Ok(())
}

#[tokio::test]
async fn news_writes_are_protected_but_reads_are_public() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.post(server.url("/news")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.delete(server.url("/news/1")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Rejected by validation before any query runs
    let res = client.get(server.url("/news?page_id=1&page_size=50")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["page_size"], "must be between 5 and 10");
    Ok(())
}

#[tokio::test]
async fn valid_token_without_database_is_a_server_error() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .get(server.url("/users/me"))
        .bearer_auth(common::token_for(1, "member"))
        .send()
        .await?;

    // The middleware reloads the user, which needs the database
    assert!(res.status().is_server_error(), "got {}", res.status());
    Ok(())
}
