mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn coupons_are_admin_only() -> Result<()> {
    let app = TestApp::new()?;
    let (_, learner) = app.learner("l@edulingo.test").await?;

    assert_eq!(app.get("/api/coupons", Some(&learner)).await?.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/api/coupons", None).await?.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn create_normalises_code_and_rejects_duplicates() -> Result<()> {
    let app = TestApp::new()?;
    let (_, admin) = app.admin().await?;

    let res = app
        .post(
            "/api/coupons",
            Some(&admin),
            json!({ "code": " summer25 ", "discountPercent": 25, "expiryDate": "2030-01-01T00:00:00Z" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["code"], "SUMMER25");
    assert_eq!(res.data()["isActive"], true);

    let res = app
        .post(
            "/api/coupons",
            Some(&admin),
            json!({ "code": "Summer25", "discountPercent": 10, "expiryDate": "2031-01-01T00:00:00Z" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.message(), "Coupon code already exists");

    let res = app
        .post(
            "/api/coupons",
            Some(&admin),
            json!({ "code": "HUGE", "discountPercent": 150, "expiryDate": "2031-01-01T00:00:00Z" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.post("/api/coupons", Some(&admin), json!({ "code": "NODATE", "discountPercent": 5 })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_list_and_delete() -> Result<()> {
    let app = TestApp::new()?;
    let (_, admin) = app.admin().await?;

    let mut ids = Vec::new();
    for code in ["ONE", "TWO"] {
        let res = app
            .post(
                "/api/coupons",
                Some(&admin),
                json!({ "code": code, "discountPercent": 10, "expiryDate": "2030-06-01T00:00:00Z" }),
            )
            .await?;
        ids.push(res.data()["id"].as_str().unwrap_or_default().to_string());
    }

    let res = app.get("/api/coupons", Some(&admin)).await?;
    assert_eq!(res.body["count"], 2);
    assert_eq!(res.data()[0]["code"], "TWO");

    let uri = format!("/api/coupons/{}", ids[0]);
    let res = app.put(&uri, Some(&admin), json!({ "isActive": false, "discountPercent": 40 })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["isActive"], false);
    assert_eq!(res.data()["discountPercent"], 40);

    let res = app.put(&uri, Some(&admin), json!({ "code": "two" })).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    assert_eq!(app.delete(&uri, Some(&admin)).await?.status, StatusCode::OK);
    let res = app.get(&uri, Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.message(), "Coupon not found");
    Ok(())
}
