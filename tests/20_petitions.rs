mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn list_rejects_non_numeric_start_index() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/petitions?startIndex=abc", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_rejects_negative_count() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/petitions?count=-1", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_rejects_supporting_cost_beyond_i32() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/petitions?supportingCost=4294967296",
            server.base_url
        ))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_rejects_unknown_sort_order() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/petitions?sortBy=SHINIEST_FIRST", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn list_rejects_non_numeric_category_id() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/petitions?categoryIds=zebra", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_rejects_zero_support_tiers() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/petitions", server.base_url))
        .json(&json!({
            "title": "Save the bees",
            "description": "Pollinators need help",
            "categoryId": 1,
            "supportTiers": [],
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_rejects_four_support_tiers() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let tier = |n: u32| {
        json!({ "title": format!("Tier {}", n), "description": "d", "cost": 1 })
    };
    let res = client
        .post(format!("{}/petitions", server.base_url))
        .json(&json!({
            "title": "Save the bees",
            "description": "Pollinators need help",
            "categoryId": 1,
            "supportTiers": [tier(1), tier(2), tier(3), tier(4)],
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_rejects_duplicate_tier_titles_in_payload() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/petitions", server.base_url))
        .json(&json!({
            "title": "Save the bees",
            "description": "Pollinators need help",
            "categoryId": 1,
            "supportTiers": [
                { "title": "Bronze", "description": "d", "cost": 1 },
                { "title": "Bronze", "description": "d", "cost": 2 },
            ],
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_rejects_negative_tier_cost() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/petitions", server.base_url))
        .json(&json!({
            "title": "Save the bees",
            "description": "Pollinators need help",
            "categoryId": 1,
            "supportTiers": [{ "title": "Bronze", "description": "d", "cost": -5 }],
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn petition_routes_reject_non_numeric_id() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/petitions/first", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
