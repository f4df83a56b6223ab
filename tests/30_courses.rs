mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

fn course(title: &str, price: f64, status: &str) -> Value {
    json!({
        "title": title,
        "description": "Speak from day one",
        "category": "language",
        "level": "beginner",
        "duration": 12,
        "price": price,
        "status": status
    })
}

async fn create(app: &TestApp, token: &str, body: Value) -> Result<String> {
    let res = app.post("/api/courses/create", Some(token), body).await?;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    Ok(res.data()["id"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn learners_cannot_manage_courses() -> Result<()> {
    let app = TestApp::new()?;
    let (_, learner) = app.learner("l@edulingo.test").await?;

    let res = app
        .post("/api/courses/create", Some(&learner), course("Spanish", 10.0, "draft"))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.message(), "Access denied: requires teacher or admin role");
    Ok(())
}

#[tokio::test]
async fn create_records_owner_and_validates() -> Result<()> {
    let app = TestApp::new()?;
    let (teacher, token) = app.teacher("t@edulingo.test").await?;

    let res = app
        .post("/api/courses/create", Some(&token), course("Spanish 101", 19.5, "draft"))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["teacher_id"], teacher.id.to_string());
    assert_eq!(res.data()["teacher_name"], "teacher user");
    assert_eq!(res.data()["enrolled_count"], 0);

    let res = app
        .post("/api/courses/create", Some(&token), json!({ "description": "no title" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post("/api/courses/create", Some(&token), json!({ "title": "Bad", "price": -1 }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn ownership_applies_to_teachers_but_not_admins() -> Result<()> {
    let app = TestApp::new()?;
    let (_, owner) = app.teacher("owner@edulingo.test").await?;
    let (_, other) = app.teacher("other@edulingo.test").await?;
    let (_, admin) = app.admin().await?;

    let id = create(&app, &owner, course("French", 5.0, "draft")).await?;

    let res = app
        .put(&format!("/api/courses/{}/update", id), Some(&other), json!({ "title": "Stolen" }))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.message(), "You do not have permission to modify this resource");

    let res = app
        .put(&format!("/api/courses/{}/update", id), Some(&admin), json!({ "title": "French A1" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["title"], "French A1");

    // Teachers only list their own courses
    create(&app, &other, course("German", 5.0, "draft")).await?;
    let res = app.get("/api/courses", Some(&owner)).await?;
    assert_eq!(res.body["count"], 1);
    let res = app.get("/api/courses", Some(&admin)).await?;
    assert_eq!(res.body["count"], 2);

    let res = app.delete(&format!("/api/courses/{}/delete", id), Some(&other)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.delete(&format!("/api/courses/{}/delete", id), Some(&owner)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get(&format!("/api/courses/{}", id), Some(&owner)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.message(), "Course not found");
    Ok(())
}

#[tokio::test]
async fn catalog_shows_only_published_courses() -> Result<()> {
    let app = TestApp::new()?;
    let (_, teacher) = app.teacher("t@edulingo.test").await?;

    let draft = create(&app, &teacher, course("Hidden draft", 1.0, "draft")).await?;
    create(&app, &teacher, course("Korean basics", 30.0, "published")).await?;
    create(&app, &teacher, course("Italian basics", 10.0, "published")).await?;

    let res = app.get("/api/courses/catalog", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["count"], 2);

    let res = app.get("/api/courses/catalog?sort=price_asc", None).await?;
    assert_eq!(res.data()[0]["title"], "Italian basics");
    assert_eq!(res.data()[1]["title"], "Korean basics");

    let res = app.get("/api/courses/catalog?search=KOREAN", None).await?;
    assert_eq!(res.body["count"], 1);

    let res = app.get("/api/courses/catalog?level=advanced", None).await?;
    assert_eq!(res.body["count"], 0);

    let res = app.get(&format!("/api/courses/catalog/{}", draft), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.message(), "Course not found or not published");

    app.put(
        &format!("/api/courses/{}/update", draft),
        Some(&teacher),
        json!({ "status": "published" }),
    )
    .await?;
    let res = app.get(&format!("/api/courses/catalog/{}", draft), None).await?;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/api/courses/catalog/not-an-id", None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.message(), "Invalid course ID format");
    Ok(())
}
