//! The edge-function flavoured API: ids in the path, responses wrapped in
//! a named field, and a bearer token required for writes.

use std::sync::Arc;

use rocket::http::Method;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{blocking, auth, aura, ApiError, ApiResult, BearerToken};
use crate::aura::Assistant;
use crate::models::admin::LoginForm;
use crate::models::analytics::Analytics;
use crate::models::collection::{Collection, EdgeCollection};
use crate::models::document::{self, Document};
use crate::models::message::AuraLead;
use crate::store::Store;

type Db = State<Arc<dyn Store>>;

/// Identity every accepted token maps to.
const EDGE_USER_ID: &str = "admin_user";

fn resolve(param: Result<EdgeCollection, &str>, method: Method) -> ApiResult<Collection> {
    let collection = param
        .map_err(|name| ApiError::NotFound(format!("Unknown collection '{}'", name)))?
        .0;
    if !collection.allows(method) {
        return Err(ApiError::MethodNotAllowed);
    }
    Ok(collection)
}

fn not_found(collection: Collection) -> ApiError {
    ApiError::NotFound(format!("{} not found", collection.label()))
}

#[get("/health")]
pub fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ── Auth ───────────────────────────────────────────────

#[post("/auth/login", data = "<form>")]
pub async fn login(store: &Db, form: Json<LoginForm>) -> ApiResult<Json<Value>> {
    auth::check_login(store, form.into_inner(), "Invalid credentials").await
}

#[get("/auth/verify")]
pub fn verify(token: BearerToken) -> ApiResult<Json<Value>> {
    token.require()?;
    Ok(Json(json!({ "success": true, "userId": EDGE_USER_ID })))
}

// ── Collections ────────────────────────────────────────

#[get("/<collection>", rank = 2)]
pub async fn list(
    store: &Db,
    collection: Result<EdgeCollection, &str>,
    token: BearerToken,
) -> ApiResult<Json<Value>> {
    let collection = resolve(collection, Method::Get)?;
    // visitors may post messages but only the admin reads them
    if collection == Collection::Messages {
        token.require()?;
    }
    let items = blocking(store, move |s| s.list(collection)).await?;
    // keyed by collection name, so `/edge/qa` answers `{"qas": [...]}`
    Ok(Json(json!({ collection.name(): items })))
}

#[get("/<collection>/<id>", rank = 2)]
pub async fn get(
    store: &Db,
    collection: Result<EdgeCollection, &str>,
    id: String,
    token: BearerToken,
) -> ApiResult<Json<Value>> {
    let collection = resolve(collection, Method::Get)?;
    if collection == Collection::Messages {
        token.require()?;
    }
    let found = blocking(store, move |s| s.get(collection, &id)).await?;
    let doc = found.ok_or_else(|| not_found(collection))?;
    Ok(Json(json!({ collection.singular(): doc })))
}

#[post("/<collection>", data = "<body>", rank = 2)]
pub async fn create(
    store: &Db,
    collection: Result<EdgeCollection, &str>,
    body: Json<Value>,
    token: BearerToken,
) -> ApiResult<Json<Value>> {
    let collection = resolve(collection, Method::Post)?;
    if collection != Collection::Messages {
        token.require()?;
    }
    let mut doc = document::from_value(body.into_inner())
        .ok_or_else(|| ApiError::BadRequest("Request body must be a JSON object".into()))?;
    // the edge always assigns its own id; new messages start unread
    doc.remove("id");
    if collection == Collection::Messages {
        doc.insert("read".into(), Value::Bool(false));
    }
    let stored = blocking(store, move |s| s.insert(collection, doc)).await?;
    Ok(Json(json!({ "success": true, "id": document::id_of(&stored) })))
}

#[put("/<collection>/<id>", data = "<body>", rank = 2)]
pub async fn update(
    store: &Db,
    collection: Result<EdgeCollection, &str>,
    id: String,
    body: Json<Document>,
    token: BearerToken,
) -> ApiResult<Json<Value>> {
    token.require()?;
    let collection = resolve(collection, Method::Put)?;
    let patch = body.into_inner();
    let matched = blocking(store, move |s| s.update(collection, &id, patch)).await?;
    if !matched {
        return Err(not_found(collection));
    }
    Ok(Json(json!({ "success": true })))
}

#[delete("/<collection>/<id>", rank = 2)]
pub async fn delete(
    store: &Db,
    collection: Result<EdgeCollection, &str>,
    id: String,
    token: BearerToken,
) -> ApiResult<Json<Value>> {
    token.require()?;
    let collection = resolve(collection, Method::Delete)?;
    blocking(store, move |s| s.delete(collection, &id)).await?;
    Ok(Json(json!({ "success": true })))
}

// ── Settings & analytics ───────────────────────────────

#[get("/settings")]
pub async fn settings_get(store: &Db) -> ApiResult<Json<Value>> {
    let current = blocking(store, |s| s.settings_get()).await?;
    Ok(Json(json!({ "settings": current.unwrap_or_default() })))
}

#[put("/settings", data = "<body>")]
pub async fn settings_update(
    store: &Db,
    body: Json<Document>,
    token: BearerToken,
) -> ApiResult<Json<Value>> {
    token.require()?;
    let patch = body.into_inner();
    blocking(store, move |s| s.settings_update(patch)).await?;
    Ok(Json(json!({ "success": true })))
}

#[get("/analytics")]
pub async fn analytics(store: &Db, token: BearerToken) -> ApiResult<Json<Value>> {
    token.require()?;
    let analytics = blocking(store, |s| Analytics::gather(s)).await?;
    Ok(Json(json!({ "analytics": analytics })))
}

// ── Aura ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EdgeChatRequest {
    #[serde(default)]
    pub question: String,
}

#[post("/aura/chat", data = "<req>")]
pub fn aura_chat(assistant: &State<Assistant>, req: Json<EdgeChatRequest>) -> ApiResult<Json<Value>> {
    if req.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question is required".into()));
    }
    Ok(Json(json!({ "response": assistant.respond(&req.question) })))
}

#[post("/aura/submit-info", data = "<lead>")]
pub async fn aura_submit_info(store: &Db, lead: Json<AuraLead>) -> ApiResult<Json<Value>> {
    let id = aura::save_lead(store, lead.into_inner()).await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        health,
        login,
        verify,
        list,
        get,
        create,
        update,
        delete,
        settings_get,
        settings_update,
        analytics,
        aura_chat,
        aura_submit_info,
    ]
}
