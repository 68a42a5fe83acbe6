mod common;

use reqwest::header;
use serde_json::Value;

async fn vote_count(app: &common::TestApp, work_id: i64) -> i64 {
    let resp = app
        .client
        .get(app.url(&format!("/works/{work_id}")))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    body["data"]["work"]["vote_count"].as_i64().unwrap()
}

#[tokio::test]
async fn upvote_requires_login() {
    let app = common::spawn_app().await;
    let id = common::create_work(&app, "Alien", "movie").await;

    let resp = app
        .client
        .post(app.url(&format!("/works/{id}/upvote")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(common::location(&resp), "/works");
    let (kind, message) = common::flash(resp).await;
    assert_eq!(kind, "error");
    assert_eq!(message, "You must log in to do that");
    assert_eq!(vote_count(&app, id).await, 0);
}

#[tokio::test]
async fn upvote_returns_to_referer() {
    let app = common::spawn_app().await;
    let id = common::create_work(&app, "Alien", "movie").await;
    let cookie = common::login(&app, "ada").await;

    let resp = app
        .client
        .post(app.url(&format!("/works/{id}/upvote")))
        .header(header::COOKIE, &cookie)
        .header(header::REFERER, "/")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(common::location(&resp), "/");
    let (kind, message) = common::flash(resp).await;
    assert_eq!(kind, "success");
    assert_eq!(message, "Successfully upvoted!");
    assert_eq!(vote_count(&app, id).await, 1);
}

#[tokio::test]
async fn double_upvote_is_rejected() {
    let app = common::spawn_app().await;
    let id = common::create_work(&app, "Alien", "movie").await;
    let cookie = common::login(&app, "ada").await;

    for _ in 0..2 {
        app.client
            .post(app.url(&format!("/works/{id}/upvote")))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .unwrap();
    }

    let resp = app
        .client
        .post(app.url(&format!("/works/{id}/upvote")))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    let (kind, message) = common::flash(resp).await;
    assert_eq!(kind, "error");
    assert_eq!(message, "ada: has already voted for this work");
    assert_eq!(vote_count(&app, id).await, 1);
}

#[tokio::test]
async fn votes_from_different_users_add_up() {
    let app = common::spawn_app().await;
    let id = common::create_work(&app, "Alien", "movie").await;

    for name in ["ada", "bob", "cy"] {
        let cookie = common::login(&app, name).await;
        let resp = app
            .client
            .post(app.url(&format!("/works/{id}/upvote")))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .unwrap();
        let (_, message) = common::flash(resp).await;
        assert_eq!(message, "Successfully upvoted!");
    }

    let resp = app
        .client
        .get(app.url(&format!("/works/{id}")))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["work"]["vote_count"], 3);
    assert_eq!(body["data"]["voters"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn upvote_missing_work() {
    let app = common::spawn_app().await;
    let cookie = common::login(&app, "ada").await;

    let resp = app
        .client
        .post(app.url("/works/-1/upvote"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(common::location(&resp), "/works");
    let (_, message) = common::flash(resp).await;
    assert_eq!(message, "That work does not exist");
}

#[tokio::test]
async fn user_page_lists_voted_works() {
    let app = common::spawn_app().await;
    let alien = common::create_work(&app, "Alien", "movie").await;
    common::create_work(&app, "Dune", "book").await;
    let cookie = common::login(&app, "ada").await;

    app.client
        .post(app.url(&format!("/works/{alien}/upvote")))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();

    let resp = app.client.get(app.url("/users/1")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let voted = body["data"]["voted_works"].as_array().unwrap();
    assert_eq!(voted.len(), 1);
    assert_eq!(voted[0]["title"], "Alien");
}

#[tokio::test]
async fn destroying_work_removes_its_votes() {
    let app = common::spawn_app().await;
    let id = common::create_work(&app, "Alien", "movie").await;
    let cookie = common::login(&app, "ada").await;

    app.client
        .post(app.url(&format!("/works/{id}/upvote")))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .delete(app.url(&format!("/works/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);

    let resp = app.client.get(app.url("/users/1")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["voted_works"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn upvote_ignores_foreign_referer() {
    let app = common::spawn_app().await;
    let id = common::create_work(&app, "Alien", "movie").await;
    let cookie = common::login(&app, "ada").await;

    let resp = app
        .client
        .post(app.url(&format!("/works/{id}/upvote")))
        .header(header::COOKIE, &cookie)
        .header(header::REFERER, "https://evil.example/phish")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(common::location(&resp), "/works");

    let resp = app
        .client
        .post(app.url(&format!("/works/{id}/upvote")))
        .header(header::COOKIE, &cookie)
        .header(header::REFERER, "//evil.example/phish")
        .send()
        .await
        .unwrap();
    assert_eq!(common::location(&resp), "/works");
}

#[tokio::test]
async fn upvote_follows_same_site_referer_url() {
    let app = common::spawn_app().await;
    let id = common::create_work(&app, "Alien", "movie").await;
    let cookie = common::login(&app, "ada").await;

    let resp = app
        .client
        .post(app.url(&format!("/works/{id}/upvote")))
        .header(header::COOKIE, &cookie)
        .header(header::REFERER, app.url(&format!("/works/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(common::location(&resp), format!("/works/{id}"));
}
