use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Most students a teacher may have.
pub const MAX_STUDENTS_PER_TEACHER: usize = 6;
/// Fewest students a single automatic assignment hands out.
pub const MIN_STUDENTS_PER_ASSIGNMENT: usize = 2;

pub const SESSION_COOKIE: &str = "session";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Professor,
    Aluno,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Usuario {
    pub cod_usuario: u64,
    pub nome: String,
    pub email: String,
    pub tipo: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cod_professor: Option<u64>,
}

impl Usuario {
    pub fn new(cod_usuario: u64, nome: &str, tipo: Role) -> Self {
        Self {
            cod_usuario,
            nome: nome.to_string(),
            email: format!("{}@escola.br", nome.to_lowercase()),
            tipo,
            cod_professor: None,
        }
    }
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Deserialize)]
pub struct AtualizarUsuario {
    pub nome: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    users: BTreeMap<u64, Usuario>,
}

impl Store {
    /// One admin (1), two teachers (2, 3) and eight unassigned students
    /// (10..=17).
    pub fn seeded() -> Self {
        let mut store = Self::default();
        store.insert(Usuario::new(1, "Admin", Role::Admin));
        store.insert(Usuario::new(2, "Helena", Role::Professor));
        store.insert(Usuario::new(3, "Paulo", Role::Professor));
        let alunos = ["Ana", "Bruno", "Carla", "Diego", "Elisa", "Fabio", "Gabi", "Hugo"];
        for (code, nome) in (10..).zip(alunos) {
            store.insert(Usuario::new(code, nome, Role::Aluno));
        }
        store
    }

    pub fn insert(&mut self, user: Usuario) {
        self.users.insert(user.cod_usuario, user);
    }

    fn students_of(&self, teacher: u64) -> Vec<Usuario> {
        self.users
            .values()
            .filter(|u| u.tipo == Role::Aluno && u.cod_professor == Some(teacher))
            .cloned()
            .collect()
    }
}

pub type Db = Arc<RwLock<Store>>;

type Rejection = (StatusCode, Json<Value>);

fn erro(status: StatusCode, message: &str) -> Rejection {
    (status, Json(json!({ "erro": message })))
}

pub fn app() -> Router {
    app_with_store(Store::seeded())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/v1/chat/message", post(chat_message))
        .route("/api/v1/usuario", get(list_users))
        .route("/api/v1/usuario/logado", get(current_user))
        .route("/api/v1/usuario/{id}", put(update_user))
        .route("/api/v1/usuario/professor/{id}/alunos", get(list_students))
        .route("/api/v1/usuario/professor/{id}/associar-alunos", post(assign_students))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve the session cookie to a stored user.
fn session_user(headers: &HeaderMap, store: &Store) -> Result<Usuario, Rejection> {
    let code = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse::<u64>().ok());
    code.and_then(|code| store.users.get(&code).cloned())
        .ok_or_else(|| erro(StatusCode::UNAUTHORIZED, "não autenticado"))
}

fn teacher(store: &Store, code: u64) -> Result<&Usuario, Rejection> {
    store
        .users
        .get(&code)
        .filter(|u| u.tipo == Role::Professor)
        .ok_or_else(|| erro(StatusCode::NOT_FOUND, "professor não encontrado"))
}

async fn chat_message(Json(input): Json<ChatRequest>) -> Result<Json<Value>, Rejection> {
    let text = input.message.trim();
    if text.is_empty() {
        return Err(erro(StatusCode::BAD_REQUEST, "mensagem vazia"));
    }
    let reply = match text.to_lowercase().as_str() {
        "oi" | "olá" | "ola" => "olá!".to_string(),
        _ => format!("Você disse: {text}"),
    };
    tracing::debug!(%reply, "chat reply");
    Ok(Json(json!({ "message": reply })))
}

async fn current_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Usuario>, Rejection> {
    let store = db.read().await;
    session_user(&headers, &store).map(Json)
}

async fn list_users(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<Usuario>>, Rejection> {
    let store = db.read().await;
    let user = session_user(&headers, &store)?;
    if user.tipo != Role::Admin {
        return Err(erro(StatusCode::FORBIDDEN, "acesso restrito a administradores"));
    }
    Ok(Json(store.users.values().cloned().collect()))
}

async fn list_students(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<Vec<Usuario>>, Rejection> {
    let store = db.read().await;
    session_user(&headers, &store)?;
    teacher(&store, id)?;
    let students = store.students_of(id);
    if students.is_empty() {
        return Err(erro(StatusCode::NOT_FOUND, "nenhum aluno associado"));
    }
    Ok(Json(students))
}

async fn assign_students(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    let user = session_user(&headers, &store)?;
    teacher(&store, id)?;
    if user.tipo != Role::Admin && user.cod_usuario != id {
        return Err(erro(StatusCode::FORBIDDEN, "sem permissão para associar alunos"));
    }

    let current = store.students_of(id).len();
    if current >= MAX_STUDENTS_PER_TEACHER {
        return Err(erro(StatusCode::BAD_REQUEST, "limite atingido"));
    }
    let free: Vec<u64> = store
        .users
        .values()
        .filter(|u| u.tipo == Role::Aluno && u.cod_professor.is_none())
        .map(|u| u.cod_usuario)
        .take(MAX_STUDENTS_PER_TEACHER - current)
        .collect();
    if free.len() < MIN_STUDENTS_PER_ASSIGNMENT {
        return Err(erro(StatusCode::BAD_REQUEST, "alunos insuficientes para associação"));
    }

    let mut assigned = Vec::with_capacity(free.len());
    for code in free {
        if let Some(aluno) = store.users.get_mut(&code) {
            aluno.cod_professor = Some(id);
            assigned.push(aluno.clone());
        }
    }
    tracing::info!(teacher = id, count = assigned.len(), "students assigned");
    Ok(Json(json!({
        "mensagem": format!("{} alunos associados", assigned.len()),
        "alunos": assigned,
    })))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(input): Json<AtualizarUsuario>,
) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    let user = session_user(&headers, &store)?;
    if user.tipo != Role::Admin && user.cod_usuario != id {
        return Err(erro(StatusCode::FORBIDDEN, "sem permissão para editar este usuário"));
    }
    if let Some(email) = &input.email {
        if store.users.values().any(|u| u.cod_usuario != id && &u.email == email) {
            return Err(erro(StatusCode::CONFLICT, "email já cadastrado"));
        }
    }
    let target = store
        .users
        .get_mut(&id)
        .ok_or_else(|| erro(StatusCode::NOT_FOUND, "usuário não encontrado"))?;
    if let Some(nome) = input.nome {
        target.nome = nome;
    }
    if let Some(email) = input.email {
        target.email = email;
    }
    Ok(Json(json!({ "mensagem": "usuário atualizado", "usuario": target.clone() })))
}
