use analyst_portal::core::config::{AppConfig, LocalAccount};
use analyst_portal::main_module::{build_router, build_state};
use analyst_portal::security::{Argon2Config, SecretHasher};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const EMAIL: &str = "maria@x.com";
const PASSWORD: &str = "s3nha-forte";

fn app() -> Router {
    let hasher = SecretHasher::new(Argon2Config::low_memory()).expect("hasher");

    let mut config = AppConfig::default();
    config.auth.accounts = vec![LocalAccount {
        uid: "u1".into(),
        email: EMAIL.into(),
        password_hash: hasher.hash(PASSWORD).expect("hash"),
        display_name: Some("Maria Silva".into()),
    }];

    build_router(build_state(config).expect("state"))
}

async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("response")
}

/// Signs in through the login form and returns the `name=value` cookie pair.
async fn sign_in(app: &Router) -> String {
    let body = format!(
        "email={}&password={}&redirect=%2Ftickets",
        urlencoding::encode(EMAIL),
        urlencoding::encode(PASSWORD)
    );
    let response = send(
        app,
        Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/tickets");

    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("cookie header");
    cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("request")
}

fn json_request(method: &str, uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn create(app: &Router, cookie: &str, uri: &str, body: Value) -> String {
    let response = send(app, json_request("POST", uri, cookie, body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"]
        .as_str()
        .expect("id")
        .to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app();
    let response = send(&app, Request::get("/health").body(Body::empty()).expect("request")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_unauthenticated_page_redirects_to_login() {
    let app = app();
    let response = send(&app, Request::get("/tickets").body(Body::empty()).expect("request")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/login?redirect=%2Ftickets"
    );
}

#[tokio::test]
async fn test_unauthenticated_api_gets_401() {
    let app = app();
    let response = send(
        &app,
        Request::get("/api/analysts").body(Body::empty()).expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_shows_login_failure() {
    let app = app();
    let body = format!("email={}&password=errada", urlencoding::encode(EMAIL));
    let response = send(
        &app,
        Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response)
        .await
        .contains("Falha no login. Verifique suas credenciais."));
}

#[tokio::test]
async fn test_signed_in_user_sees_tickets_page() {
    let app = app();
    let cookie = sign_in(&app).await;

    let response = send(&app, get("/tickets", &cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<a class=\"nav-item active\" href=\"/tickets\">Tickets</a>"));
    assert!(html.contains(EMAIL));
}

#[tokio::test]
async fn test_analyst_create_update_delete() {
    let app = app();
    let cookie = sign_in(&app).await;

    let id = create(
        &app,
        &cookie,
        "/api/analysts",
        json!({ "name": "Maria Silva", "email": "maria@x.com", "team": "N2" }),
    )
    .await;

    let list = body_json(send(&app, get("/api/analysts", &cookie)).await).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["team"], "N2");

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/analysts/{id}"),
            &cookie,
            json!({ "name": "Maria Silva", "email": "maria@x.com", "team": "N3" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let list = body_json(send(&app, get("/api/analysts", &cookie)).await).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["team"], "N3");

    let response = send(
        &app,
        Request::delete(format!("/api/analysts/{id}"))
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);

    let response = send(
        &app,
        Request::delete(format!("/api/analysts/{id}?confirm=true"))
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let list = body_json(send(&app, get("/api/analysts", &cookie)).await).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_invalid_record_is_rejected() {
    let app = app();
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/analysts",
            &cookie,
            json!({ "name": "", "email": "maria@x.com", "team": "N2" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_ticket_form_submit_renders_row() {
    let app = app();
    let cookie = sign_in(&app).await;

    let analyst = create(
        &app,
        &cookie,
        "/api/analysts",
        json!({ "name": "Maria Silva", "email": "maria@x.com", "team": "N2" }),
    )
    .await;
    let support = create(
        &app,
        &cookie,
        "/api/supports",
        json!({ "name": "Chat", "analystId": analyst }),
    )
    .await;
    let reason = create(&app, &cookie, "/api/reasons", json!({ "description": "Senha" })).await;

    let body = format!(
        "editingId=&analystId={analyst}&date=2024-01-10&supportId={support}&reasonId={reason}&observation=teste"
    );
    let response = send(
        &app,
        Request::post("/ui/tickets")
            .header(header::COOKIE, &cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<td>10/01/2024</td><td>Chat</td><td>Senha</td><td>teste</td>"));
    assert!(html.contains(">Cadastrar</button>"));
}

#[tokio::test]
async fn test_report_filters_and_exports_raw_reason_id() {
    let app = app();
    let cookie = sign_in(&app).await;

    let analyst = create(
        &app,
        &cookie,
        "/api/analysts",
        json!({ "name": "Maria Silva", "email": "maria@x.com", "team": "N2" }),
    )
    .await;
    let support = create(
        &app,
        &cookie,
        "/api/supports",
        json!({ "name": "Chat", "analystId": analyst }),
    )
    .await;
    let reason = create(&app, &cookie, "/api/reasons", json!({ "description": "Senha" })).await;

    for (day, observation) in [
        ("2023-12-31", "antes"),
        ("2024-01-01", "inicio"),
        ("2024-01-31", "fim"),
        ("2024-02-01", "depois"),
    ] {
        create(
            &app,
            &cookie,
            "/api/tickets",
            json!({
                "supportId": support,
                "reasonId": reason,
                "analystId": analyst,
                "observation": observation,
                "date": day,
            }),
        )
        .await;
    }

    let range = "startDate=2024-01-01&endDate=2024-01-31";
    let rows = body_json(send(&app, get(&format!("/api/report?{range}"), &cookie)).await).await;
    let rows = rows.as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row["Suporte"], "Chat");
        assert_eq!(row["Analista"], "Maria Silva");
        assert_eq!(row["Equipe"], "N2");
        assert_eq!(row["Motivo"], reason.as_str());
    }

    let response = send(
        &app,
        get(&format!("/relatorio/export?{range}&format=csv"), &cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("disposition")
        .to_string();
    assert!(disposition.contains("relatorio-tickets.csv"));

    let csv = body_text(response).await;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Data,Suporte,Analista,Equipe,Motivo,Observação")
    );
    assert_eq!(lines.clone().count(), 2);
    assert!(csv.contains(&format!("01/01/2024,Chat,Maria Silva,N2,{reason},inicio")));
}

#[tokio::test]
async fn test_empty_export_is_refused() {
    let app = app();
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        get(
            "/relatorio/export?startDate=1999-01-01&endDate=1999-01-31&format=xlsx",
            &cookie,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "nothing_to_export");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = app();
    let cookie = sign_in(&app).await;

    let response = send(
        &app,
        Request::post("/logout")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");

    let response = send(&app, get("/tickets", &cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_ignores_redirect_with_control_bytes() {
    let app = app();
    let body = format!(
        "email={}&password={}&redirect=%2Ftickets%01x",
        urlencoding::encode(EMAIL),
        urlencoding::encode(PASSWORD)
    );
    let response = send(
        &app,
        Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");

    let cookie = sign_in(&app).await;
    let response = send(&app, get("/login?redirect=/x%01", &cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
}

#[tokio::test]
async fn test_api_ticket_defaults_to_session_analyst_and_today() {
    let app = app();
    let cookie = sign_in(&app).await;

    let id = create(
        &app,
        &cookie,
        "/api/tickets",
        json!({ "supportId": "s1", "reasonId": "r1", "observation": "teste" }),
    )
    .await;

    let list = body_json(send(&app, get("/api/tickets", &cookie)).await).await;
    assert_eq!(list[0]["id"], id.as_str());
    assert_eq!(list[0]["analystId"], "u1");
    assert_eq!(
        list[0]["date"],
        analyst_portal::core::shared::utils::today().to_string()
    );
}
