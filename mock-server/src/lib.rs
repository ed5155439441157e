//! In-memory stand-in for the AwareDB REST API.
//!
//! Serves the login endpoint and the `/rest/db/<database>/<command>/`
//! commands with just enough semantics for client tests: records live in a
//! `Vec` per database, paths are `<node>.<property>`, and formulas are
//! resolved as paths. Every command a database receives is appended to its
//! journal, readable at `GET /__journal/<database>/`.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin";
pub const DATABASE: &str = "demo";
/// Token accepted without logging in.
pub const TOKEN: &str = "demo-token";

#[derive(Debug, Default)]
pub struct Database {
    pub records: Vec<Value>,
    pub journal: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<String, String>,
    tokens: HashSet<String>,
    databases: HashMap<String, Database>,
}

impl Store {
    /// One user, one database, one pre-issued token.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.users.insert(USERNAME.to_string(), PASSWORD.to_string());
        store.tokens.insert(TOKEN.to_string());
        store.databases.insert(DATABASE.to_string(), Database::default());
        store
    }
}

pub type Shared = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let store: Shared = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/rest/auth/token/login/", post(login))
        .route("/rest/db/{database}/{command}/", post(command))
        .route("/__journal/{database}/", get(journal))
        .layer(DefaultBodyLimit::disable())
        .with_state(store)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Invalid token.").into_response(),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, what).into_response(),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

#[derive(Deserialize)]
struct Login {
    username: String,
    password: String,
}

async fn login(State(store): State<Shared>, body: String) -> Result<Json<Value>, ApiError> {
    let login: Login = parse(&body)?;
    let mut store = store.write().await;
    if store.users.get(&login.username) != Some(&login.password) {
        return Err(ApiError::BadRequest(
            "Unable to log in with provided credentials.".to_string(),
        ));
    }
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone());
    info!(username = %login.username, "issued token");
    Ok(Json(json!({ "token": token })))
}

async fn journal(
    State(store): State<Shared>,
    Path(database): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let store = store.read().await;
    let db = store
        .databases
        .get(&database)
        .ok_or(ApiError::NotFound("Database not found."))?;
    Ok(Json(db.journal.clone()))
}

async fn command(
    State(store): State<Shared>,
    Path((database, command)): Path<(String, String)>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let mut store = store.write().await;

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Token "))
        .ok_or(ApiError::Unauthorized)?;
    if !store.tokens.contains(token) {
        return Err(ApiError::Unauthorized);
    }

    let db = store
        .databases
        .get_mut(&database)
        .ok_or(ApiError::NotFound("Database not found."))?;
    db.journal.push(command.clone());
    debug!(%database, %command, "command received");

    let data = match command.as_str() {
        "check" => json!({ "connected": true }),
        "get" => get_value(db, parse(&body)?)?,
        "query" => query(db, parse(&body)?),
        "calculate" => calculate(db, parse(&body)?),
        "what-if" => what_if(db, parse(&body)?),
        "update" => update(db, parse(&body)?)?,
        "remove" => {
            remove(db, parse(&body)?);
            Value::Null
        }
        "flush" => {
            db.records.clear();
            Value::Null
        }
        _ => return Err(ApiError::NotFound("Unknown command.")),
    };
    Ok(Json(json!({ "data": data })))
}

fn matches_key(record: &Value, key: &str) -> bool {
    ["id", "uid", "name"]
        .iter()
        .any(|field| record.get(field).and_then(Value::as_str) == Some(key))
}

fn find<'a>(db: &'a Database, key: &str) -> Option<&'a Value> {
    db.records.iter().find(|record| matches_key(record, key))
}

/// `node` resolves to the whole record, `node.property` to one field.
fn resolve(db: &Database, path: &str) -> Option<Value> {
    match path.split_once('.') {
        Some((node, property)) => {
            find(db, node).map(|r| r.get(property).cloned().unwrap_or(Value::Null))
        }
        None => find(db, path).cloned(),
    }
}

#[derive(Deserialize)]
struct GetPayload {
    path: String,
}

fn get_value(db: &Database, payload: GetPayload) -> Result<Value, ApiError> {
    resolve(db, &payload.path)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown path: {}", payload.path)))
}

#[derive(Deserialize)]
struct QueryPayload {
    #[serde(default = "wildcard")]
    nodes: Vec<String>,
    #[serde(default)]
    properties: Vec<String>,
    #[serde(default)]
    show_abstract: bool,
}

fn wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

fn query(db: &Database, payload: QueryPayload) -> Value {
    let all = payload.nodes.iter().any(|n| n == "*");
    let records = db
        .records
        .iter()
        .filter(|r| payload.show_abstract || r.get("abstract") != Some(&Value::Bool(true)))
        .filter(|r| all || payload.nodes.iter().any(|n| matches_key(r, n)))
        .map(|r| project(r, &payload.properties))
        .collect();
    Value::Array(records)
}

fn project(record: &Value, properties: &[String]) -> Value {
    if properties.is_empty() {
        return record.clone();
    }
    let mut out = Map::new();
    if let Some(id) = record.get("id") {
        out.insert("id".to_string(), id.clone());
    }
    for property in properties {
        if let Some(value) = record.get(property) {
            out.insert(property.clone(), value.clone());
        }
    }
    Value::Object(out)
}

#[derive(Deserialize)]
struct CalculatePayload {
    formula: Value,
}

fn calculate(db: &Database, payload: CalculatePayload) -> Value {
    let eval = |formula: &Value| {
        formula
            .as_str()
            .and_then(|path| resolve(db, path))
            .unwrap_or(Value::Null)
    };
    match &payload.formula {
        Value::Array(formulas) => Value::Array(formulas.iter().map(eval).collect()),
        single => eval(single),
    }
}

#[derive(Deserialize)]
struct WhatIfPayload {
    #[serde(default)]
    changes: Map<String, Value>,
}

/// Before/after per changed path. Nothing is stored.
fn what_if(db: &Database, payload: WhatIfPayload) -> Value {
    let impact = payload
        .changes
        .into_iter()
        .map(|(path, after)| {
            let before = resolve(db, &path).unwrap_or(Value::Null);
            (path, json!({ "before": before, "after": after }))
        })
        .collect();
    Value::Object(impact)
}

#[derive(Deserialize)]
struct UpdatePayload {
    data: Value,
    #[serde(default)]
    partial: bool,
}

fn update(db: &mut Database, payload: UpdatePayload) -> Result<Value, ApiError> {
    let incoming = match payload.data {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut saved = Vec::with_capacity(incoming.len());
    for item in incoming {
        let Value::Object(mut fields) = item else {
            return Err(ApiError::BadRequest("Records must be objects.".to_string()));
        };
        let id = match fields.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                fields.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let existing = db
            .records
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str()));
        let record = match existing {
            Some(Value::Object(current)) if payload.partial => {
                current.extend(fields);
                Value::Object(current.clone())
            }
            Some(current) => {
                *current = Value::Object(fields);
                current.clone()
            }
            None => {
                let record = Value::Object(fields);
                db.records.push(record.clone());
                record
            }
        };
        saved.push(record);
    }
    Ok(Value::Array(saved))
}

#[derive(Deserialize)]
struct RemovePayload {
    ids: Vec<String>,
}

fn remove(db: &mut Database, payload: RemovePayload) {
    db.records.retain(|r| {
        r.get("id")
            .and_then(Value::as_str)
            .map_or(true, |id| !payload.ids.iter().any(|gone| gone == id))
    });
}
