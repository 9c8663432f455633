mod common;

use axum::http::StatusCode;
use colgados_web::db::{Colgado, NewColgado};
use colgados_web::types::forms::{BAD_CSRF, NOT_AN_INTEGER, REQUIRED};
use common::{Cookies, TestApp, body_text, csrf_token, location, spawn_app, test_config};

async fn add_colgado(app: &TestApp, cookies: &mut Cookies, fields: [(&str, &str); 4]) -> String {
    let resp = app.get("/add", cookies).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let token = csrf_token(&body_text(resp).await);

    let mut form: Vec<(&str, &str)> = fields.to_vec();
    form.push(("csrf_token", &token));
    let resp = app.post_form("/add", &form, cookies).await;
    location(&resp).unwrap_or("").to_string()
}

async fn seed(app: &TestApp, part_no: &str) -> Colgado {
    app.storage
        .insert_colgado(NewColgado {
            part_key: 6220439,
            part_no: part_no.to_string(),
            pieza_rack: 10,
            rack_eslabon: 3,
        })
        .await
        .expect("insert failed")
}

#[tokio::test]
async fn added_colgado_is_listed_with_exact_values() {
    let app = spawn_app(test_config()).await;
    let mut cookies = app.register("ana@scanpaint.com", "clave", "Ana").await;

    let to = add_colgado(
        &app,
        &mut cookies,
        [
            ("part_key", "6220439"),
            ("part_no", "SCN-1041-A"),
            ("pieza_rack", "24"),
            ("rack_eslabon", "2"),
        ],
    )
    .await;
    assert_eq!(to, "/lista_de_colgados");

    let stored = app.storage.list_colgados().await.expect("list failed");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].part_key, 6220439);
    assert_eq!(stored[0].part_no, "SCN-1041-A");
    assert_eq!(stored[0].pieza_rack, 24);
    assert_eq!(stored[0].rack_eslabon, 2);

    let resp = app.get("/lista_de_colgados", &mut cookies).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(&format!("data-id=\"{}\"", stored[0].id)));
    assert!(html.contains("<td>SCN-1041-A</td>"));
    assert!(html.contains("<td>6220439</td>"));
    assert!(html.contains("<td>24</td>"));
}

#[tokio::test]
async fn invalid_add_form_is_shown_again_with_errors() {
    let app = spawn_app(test_config()).await;
    let mut cookies = app.register("ana@scanpaint.com", "clave", "Ana").await;

    let resp = app.get("/add", &mut cookies).await;
    let token = csrf_token(&body_text(resp).await);
    let resp = app
        .post_form(
            "/add",
            &[
                ("part_key", "abc"),
                ("part_no", "SCN-1"),
                ("pieza_rack", ""),
                ("rack_eslabon", "2"),
                ("csrf_token", &token),
            ],
            &mut cookies,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(NOT_AN_INTEGER));
    assert!(html.contains(REQUIRED));
    assert!(html.contains("value=\"SCN-1\""));
    assert!(app.storage.list_colgados().await.expect("list failed").is_empty());
}

#[tokio::test]
async fn add_without_csrf_token_is_rejected() {
    let app = spawn_app(test_config()).await;
    let mut cookies = app.register("ana@scanpaint.com", "clave", "Ana").await;

    let resp = app
        .post_form(
            "/add",
            &[
                ("part_key", "1"),
                ("part_no", "SCN-1"),
                ("pieza_rack", "1"),
                ("rack_eslabon", "1"),
                ("csrf_token", "forged"),
            ],
            &mut cookies,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(BAD_CSRF));
    assert!(app.storage.list_colgados().await.expect("list failed").is_empty());
}

#[tokio::test]
async fn edit_changes_only_rack_counts() {
    let app = spawn_app(test_config()).await;
    let mut cookies = app.register("ana@scanpaint.com", "clave", "Ana").await;
    let original = seed(&app, "SCN-2000").await;
    let other = seed(&app, "SCN-3000").await;

    let resp = app
        .get(&format!("/edit?id={}", original.id), &mut cookies)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("SCN-2000"));
    assert!(html.contains("value=\"10\""));

    let id = original.id.to_string();
    let resp = app
        .post_form(
            "/edit",
            &[("id", &id), ("pieza_rack", "48"), ("rack_eslabon", "6")],
            &mut cookies,
        )
        .await;
    assert_eq!(location(&resp), Some("/lista_de_colgados"));

    let edited = app
        .storage
        .get_colgado(original.id)
        .await
        .expect("lookup failed")
        .expect("record missing");
    assert_eq!(edited.id, original.id);
    assert_eq!(edited.part_key, original.part_key);
    assert_eq!(edited.part_no, original.part_no);
    assert_eq!(edited.pieza_rack, 48);
    assert_eq!(edited.rack_eslabon, 6);

    let untouched = app
        .storage
        .get_colgado(other.id)
        .await
        .expect("lookup failed")
        .expect("record missing");
    assert_eq!(untouched, other);
}

#[tokio::test]
async fn invalid_edit_keeps_stored_values() {
    let app = spawn_app(test_config()).await;
    let mut cookies = app.register("ana@scanpaint.com", "clave", "Ana").await;
    let original = seed(&app, "SCN-2000").await;

    let id = original.id.to_string();
    let resp = app
        .post_form(
            "/edit",
            &[("id", &id), ("pieza_rack", "muchas"), ("rack_eslabon", "6")],
            &mut cookies,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(NOT_AN_INTEGER));

    let stored = app
        .storage
        .get_colgado(original.id)
        .await
        .expect("lookup failed")
        .expect("record missing");
    assert_eq!(stored, original);
}

#[tokio::test]
async fn editing_an_unknown_id_is_not_found() {
    let app = spawn_app(test_config()).await;
    let mut cookies = app.register("ana@scanpaint.com", "clave", "Ana").await;

    let resp = app.get("/edit?id=999", &mut cookies).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .post_form(
            "/edit",
            &[("id", "999"), ("pieza_rack", "1"), ("rack_eslabon", "1")],
            &mut cookies,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_exactly_one_record() {
    let app = spawn_app(test_config()).await;
    let mut cookies = app.register("ana@scanpaint.com", "clave", "Ana").await;
    let first = seed(&app, "SCN-1").await;
    let second = seed(&app, "SCN-2").await;
    let third = seed(&app, "SCN-3").await;

    let resp = app
        .get(&format!("/delete?id={}", second.id), &mut cookies)
        .await;
    assert_eq!(location(&resp), Some("/lista_de_colgados"));

    let remaining = app.storage.list_colgados().await.expect("list failed");
    assert_eq!(remaining, vec![first.clone(), third.clone()]);

    let resp = app.get("/delete?id=999", &mut cookies).await;
    assert_eq!(location(&resp), Some("/lista_de_colgados"));
    let remaining = app.storage.list_colgados().await.expect("list failed");
    assert_eq!(remaining, vec![first, third]);
}

#[tokio::test]
async fn zero_rack_counts_are_stored() {
    let app = spawn_app(test_config()).await;
    let mut cookies = app.register("ana@scanpaint.com", "clave", "Ana").await;

    let to = add_colgado(
        &app,
        &mut cookies,
        [
            ("part_key", "6220439"),
            ("part_no", "SCN-0"),
            ("pieza_rack", "0"),
            ("rack_eslabon", "0"),
        ],
    )
    .await;
    assert_eq!(to, "/lista_de_colgados");

    let stored = app.storage.list_colgados().await.expect("list failed");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].pieza_rack, 0);
    assert_eq!(stored[0].rack_eslabon, 0);
}
