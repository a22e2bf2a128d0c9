use std::net::SocketAddr;

use axum::Router;
use chrono::{Duration, Utc};
use configs::DatabaseConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::routes::{self, ServerState};

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }
}

/// Serve the router on an ephemeral port backed by its own in-memory database.
async fn start_server() -> anyhow::Result<TestApp> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
    let db = models::db::connect_and_migrate(&cfg).await?;

    let app: Router = routes::build_router(ServerState::new(db), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

async fn create(c: &reqwest::Client, app: &TestApp, body: Value) -> anyhow::Result<Value> {
    let res = c.post(app.url("/todos")).json(&body).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok(res.json::<Value>().await?)
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .map(|a| a.iter().filter_map(|t| t["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn e2e_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(app.url("/health")).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn e2e_create_then_get_round_trip() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let created = create(&c, &app, json!({
        "title": "Watch CSSE6400 Lecture",
        "description": "Watch the CSSE6400 lecture on ECHO360 for week 1",
        "completed": true,
        "deadline_at": "2023-02-27T00:00:00"
    })).await?;
    assert_eq!(created["title"], "Watch CSSE6400 Lecture");
    assert_eq!(created["description"], "Watch the CSSE6400 lecture on ECHO360 for week 1");
    assert_eq!(created["completed"], true);
    assert_eq!(created["deadline_at"], "2023-02-27T00:00:00Z");
    assert!(created["created_at"].is_string());
    assert_eq!(created["created_at"], created["updated_at"]);

    let id = created["id"].as_i64().unwrap_or_default();
    let res = c.get(app.url(&format!("/todos/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);
    Ok(())
}

#[tokio::test]
async fn e2e_ids_are_unique() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let mut seen = Vec::new();
    for i in 0..5 {
        let t = create(&c, &app, json!({"title": format!("todo {i}")})).await?;
        let id = t["id"].as_i64().unwrap_or_default();
        assert!(!seen.contains(&id));
        seen.push(id);
    }
    Ok(())
}

#[tokio::test]
async fn e2e_get_missing_is_404() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(app.url("/todos/999")).await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Todo not found"}));
    Ok(())
}

#[tokio::test]
async fn e2e_create_validation() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let res = c.post(app.url("/todos")).json(&json!({"description": "x"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Missing required field: title"}));

    let res = c.post(app.url("/todos")).json(&json!({"title": "t", "bogus": 1})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({"error": "Extra fields provided: bogus"}));

    let res = c.post(app.url("/todos")).json(&json!({"title": "t", "deadline_at": "someday"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // nothing was persisted by the rejected requests
    let list = c.get(app.url("/todos")).send().await?.json::<Value>().await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_update_only_given_fields() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let created = create(&c, &app, json!({
        "title": "pay rent",
        "description": "before the 1st",
        "deadline_at": "2030-01-01T00:00:00Z"
    })).await?;
    let id = created["id"].as_i64().unwrap_or_default();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let res = c.put(app.url(&format!("/todos/{id}"))).json(&json!({"completed": true})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], created["title"]);
    assert_eq!(updated["description"], created["description"]);
    assert_eq!(updated["deadline_at"], created["deadline_at"]);
    assert_eq!(updated["created_at"], created["created_at"]);
    assert_ne!(updated["updated_at"], created["updated_at"]);

    let res = c.put(app.url(&format!("/todos/{id}"))).json(&json!({"deadline_at": null})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["deadline_at"], Value::Null);

    let res = c.put(app.url(&format!("/todos/{id}"))).json(&json!({"priority": 1})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Unexpected fields in request"}));

    let res = c.put(app.url("/todos/999")).json(&json!({"completed": true})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Todo not found"}));
    Ok(())
}

#[tokio::test]
async fn e2e_delete_returns_row_then_empty() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let created = create(&c, &app, json!({"title": "temp"})).await?;
    let id = created["id"].as_i64().unwrap_or_default();

    let res = c.delete(app.url(&format!("/todos/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, created);

    for _ in 0..2 {
        let res = c.delete(app.url(&format!("/todos/{id}"))).send().await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
        assert_eq!(res.json::<Value>().await?, json!({}));
    }
    Ok(())
}

#[tokio::test]
async fn e2e_list_filters() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let soon = (Utc::now() + Duration::days(3)).to_rfc3339();
    let later = (Utc::now() + Duration::days(10)).to_rfc3339();
    let a = create(&c, &app, json!({"title": "a", "completed": true, "deadline_at": soon})).await?;
    let b = create(&c, &app, json!({"title": "b", "completed": false, "deadline_at": later})).await?;
    let d = create(&c, &app, json!({"title": "d", "completed": true})).await?;
    let (a, b, d) = (a["id"].as_i64(), b["id"].as_i64(), d["id"].as_i64());
    let (a, b, d) = (a.unwrap_or_default(), b.unwrap_or_default(), d.unwrap_or_default());

    let all = c.get(app.url("/todos")).send().await?.json::<Value>().await?;
    assert_eq!(ids(&all), vec![a, b, d]);

    for token in ["true", "1", "t", "TRUE"] {
        let done = c.get(app.url(&format!("/todos?completed={token}"))).send().await?.json::<Value>().await?;
        assert_eq!(ids(&done), vec![a, d], "completed={token}");
    }
    let open = c.get(app.url("/todos?completed=nope")).send().await?.json::<Value>().await?;
    assert_eq!(ids(&open), vec![b]);

    let week = c.get(app.url("/todos?window=7")).send().await?.json::<Value>().await?;
    assert_eq!(ids(&week), vec![a]);

    let both = c.get(app.url("/todos?completed=false&window=30")).send().await?.json::<Value>().await?;
    assert_eq!(ids(&both), vec![b]);

    let ignored = c.get(app.url("/todos?window=soon")).send().await?.json::<Value>().await?;
    assert_eq!(ids(&ignored), vec![a, b, d]);
    Ok(())
}
