use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_store, Role, Store, Usuario};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, session: Option<u64>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(code) = session {
        builder = builder.header(http::header::COOKIE, format!("session={code}"));
    }
    builder.body(body.to_string()).unwrap()
}

// --- chat ---

#[tokio::test]
async fn chat_greeting_gets_canned_reply() {
    let resp = app()
        .oneshot(request("POST", "/api/v1/chat/message", None, r#"{"message":"oi"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "olá!");
}

#[tokio::test]
async fn chat_empty_message_returns_400() {
    let resp = app()
        .oneshot(request("POST", "/api/v1/chat/message", None, r#"{"message":"  "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["erro"], "mensagem vazia");
}

// --- current user ---

#[tokio::test]
async fn current_user_requires_session() {
    let resp = app()
        .oneshot(request("GET", "/api/v1/usuario/logado", None, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn current_user_resolves_cookie() {
    let resp = app()
        .oneshot(request("GET", "/api/v1/usuario/logado", Some(2), ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: Usuario = body_json(resp).await;
    assert_eq!(user.cod_usuario, 2);
    assert_eq!(user.tipo, Role::Professor);
}

// --- list users ---

#[tokio::test]
async fn list_users_is_admin_only() {
    let resp = app()
        .oneshot(request("GET", "/api/v1/usuario", Some(2), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app()
        .oneshot(request("GET", "/api/v1/usuario", Some(1), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<Usuario> = body_json(resp).await;
    assert_eq!(users.len(), 11);
    assert_eq!(users[0].cod_usuario, 1);
}

// --- students ---

#[tokio::test]
async fn students_of_teacher_without_students_returns_404() {
    let resp = app()
        .oneshot(request("GET", "/api/v1/usuario/professor/2/alunos", Some(2), ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn students_of_unknown_teacher_returns_404() {
    let resp = app()
        .oneshot(request("GET", "/api/v1/usuario/professor/10/alunos", Some(1), ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["erro"], "professor não encontrado");
}

// --- assignment ---

#[tokio::test]
async fn assignment_with_too_few_free_students_returns_400() {
    let mut store = Store::default();
    store.insert(Usuario::new(1, "Admin", Role::Admin));
    store.insert(Usuario::new(2, "Helena", Role::Professor));
    store.insert(Usuario::new(10, "Ana", Role::Aluno));

    let resp = app_with_store(store)
        .oneshot(request("POST", "/api/v1/usuario/professor/2/associar-alunos", Some(1), ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["erro"], "alunos insuficientes para associação");
}

#[tokio::test]
async fn assignment_by_other_teacher_is_forbidden() {
    let resp = app()
        .oneshot(request("POST", "/api/v1/usuario/professor/2/associar-alunos", Some(3), ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- update ---

#[tokio::test]
async fn update_rejects_duplicate_email() {
    let resp = app()
        .oneshot(request(
            "PUT",
            "/api/v1/usuario/10",
            Some(10),
            r#"{"email":"bruno@escola.br"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = body_json(resp).await;
    assert_eq!(body["erro"], "email já cadastrado");
}

#[tokio::test]
async fn update_bad_id_returns_400() {
    let resp = app()
        .oneshot(request("PUT", "/api/v1/usuario/not-a-number", Some(1), r#"{"nome":"X"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full teacher lifecycle ---

#[tokio::test]
async fn teacher_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // assign: first round fills the teacher up to the limit
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("POST", "/api/v1/usuario/professor/2/associar-alunos", Some(2), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: Value = body_json(resp).await;
    assert_eq!(summary["mensagem"], "6 alunos associados");
    assert_eq!(summary["alunos"].as_array().unwrap().len(), 6);

    // list: six students, all linked to teacher 2
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/api/v1/usuario/professor/2/alunos", Some(2), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let students: Vec<Usuario> = body_json(resp).await;
    assert_eq!(students.len(), 6);
    assert!(students.iter().all(|s| s.cod_professor == Some(2)));

    // assign again: limit reached
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("POST", "/api/v1/usuario/professor/2/associar-alunos", Some(2), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["erro"], "limite atingido");

    // assign to the other teacher: the two remaining students
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("POST", "/api/v1/usuario/professor/3/associar-alunos", Some(1), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: Value = body_json(resp).await;
    assert_eq!(summary["alunos"].as_array().unwrap().len(), 2);

    // update: teacher renames themself
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("PUT", "/api/v1/usuario/2", Some(2), r#"{"nome":"Helena Souza"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["usuario"]["nome"], "Helena Souza");
    assert_eq!(body["usuario"]["email"], "helena@escola.br"); // unchanged
}
