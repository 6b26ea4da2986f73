mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn add_tier_rejects_empty_title() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/petitions/1/supportTiers", server.base_url))
        .json(&json!({ "title": "", "description": "d", "cost": 1 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn add_tier_rejects_negative_cost() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/petitions/1/supportTiers", server.base_url))
        .json(&json!({ "title": "Bronze", "description": "d", "cost": -1 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn edit_tier_rejects_overlong_title() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .patch(format!("{}/petitions/1/supportTiers/1", server.base_url))
        .json(&json!({ "title": "x".repeat(200) }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn add_supporter_rejects_empty_message() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/petitions/1/supporters", server.base_url))
        .json(&json!({ "supportTierId": 1, "message": "" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn tier_routes_reject_non_numeric_ids() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .patch(format!("{}/petitions/1/supportTiers/gold", server.base_url))
        .json(&json!({ "cost": 5 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
