use std::sync::Arc;

use rocket::http::{Method, Status};
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use super::{blocking, ApiError, ApiResult, SeedHeader};
use crate::config::Config;
use crate::models::analytics::Analytics;
use crate::models::collection::{ApiCollection, Collection};
use crate::models::document::{self, Document};
use crate::models::message::{ContactSubmission, NewsletterSignup};
use crate::models::settings;
use crate::store::{AdminSeed, Store};

type Db = State<Arc<dyn Store>>;

/// Resolve the path segment and check the verb against the collection.
fn resolve(param: Result<ApiCollection, &str>, method: Method) -> ApiResult<Collection> {
    let collection = param
        .map_err(|name| ApiError::NotFound(format!("Unknown collection '{}'", name)))?
        .0;
    if !collection.allows(method) {
        return Err(ApiError::MethodNotAllowed);
    }
    Ok(collection)
}

fn require_id(id: Option<String>) -> ApiResult<String> {
    id.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("ID is required".into()))
}

fn into_document(body: Value) -> ApiResult<Document> {
    document::from_value(body)
        .ok_or_else(|| ApiError::BadRequest("Request body must be a JSON object".into()))
}

// ── Collections ────────────────────────────────────────

#[get("/<collection>")]
pub async fn list(
    store: &Db,
    collection: Result<ApiCollection, &str>,
) -> ApiResult<Json<Vec<Document>>> {
    let collection = resolve(collection, Method::Get)?;
    blocking(store, move |s| s.list(collection)).await.map(Json)
}

#[post("/<collection>", data = "<body>")]
pub async fn create(
    store: &Db,
    collection: Result<ApiCollection, &str>,
    body: Json<Value>,
) -> ApiResult<(Status, Json<Document>)> {
    let collection = resolve(collection, Method::Post)?;
    let stored = match collection {
        Collection::Newsletter => subscribe(store, body.into_inner()).await?,
        _ => {
            let doc = into_document(body.into_inner())?;
            blocking(store, move |s| s.insert(collection, doc)).await?
        }
    };
    Ok((Status::Created, Json(stored)))
}

async fn subscribe(store: &Db, body: Value) -> ApiResult<Document> {
    let signup: NewsletterSignup = serde_json::from_value(body)
        .map_err(|_| ApiError::BadRequest("A valid email is required".into()))?;
    let email = signup.address().map_err(ApiError::BadRequest)?.to_string();
    let stored = blocking(store, move |s| {
        if s.find_by(Collection::Newsletter, "email", &email)?.is_some() {
            return Ok(None);
        }
        let mut doc = Document::new();
        doc.insert("email".into(), Value::String(email));
        doc.insert("subscribedAt".into(), Value::String(document::now_iso()));
        s.insert(Collection::Newsletter, doc).map(Some)
    })
    .await?;
    stored.ok_or_else(|| ApiError::BadRequest("Email already subscribed".into()))
}

#[put("/<collection>", data = "<body>")]
pub async fn update(
    store: &Db,
    collection: Result<ApiCollection, &str>,
    body: Json<Value>,
) -> ApiResult<Json<Value>> {
    let collection = resolve(collection, Method::Put)?;
    let mut patch = into_document(body.into_inner())?;
    let id = require_id(document::id_of(&patch).map(str::to_string))?;
    patch.remove("id");
    let matched = blocking(store, {
        let id = id.clone();
        move |s| s.update(collection, &id, patch)
    })
    .await?;
    if !matched {
        log::warn!("Update of {}/{} matched nothing", collection, id);
    }
    Ok(Json(json!({ "success": true })))
}

#[delete("/<collection>?<id>")]
pub async fn delete(
    store: &Db,
    collection: Result<ApiCollection, &str>,
    id: Option<String>,
) -> ApiResult<Json<Value>> {
    let collection = resolve(collection, Method::Delete)?;
    let id = require_id(id)?;
    blocking(store, move |s| s.delete(collection, &id)).await?;
    Ok(Json(json!({ "success": true })))
}

// ── Settings ───────────────────────────────────────────

#[get("/settings")]
pub async fn settings_get(store: &Db) -> ApiResult<Json<Value>> {
    let current = blocking(store, |s| s.settings_get()).await?;
    Ok(Json(settings::or_empty(current)))
}

#[put("/settings", data = "<body>")]
pub async fn settings_update(store: &Db, body: Json<Value>) -> ApiResult<Json<Value>> {
    let patch = into_document(body.into_inner())?;
    blocking(store, move |s| s.settings_update(patch)).await?;
    Ok(Json(json!({ "success": true })))
}

// ── Dashboard & maintenance ────────────────────────────

#[get("/analytics")]
pub async fn analytics(store: &Db) -> ApiResult<Json<Analytics>> {
    blocking(store, |s| Analytics::gather(s)).await.map(Json)
}

#[post("/init")]
pub async fn init(store: &Db, config: &State<Config>, header: SeedHeader) -> ApiResult<Json<Value>> {
    if let Some(expected) = config.seed_token() {
        if header.0.as_deref() != Some(expected) {
            return Err(ApiError::Unauthorized("Unauthorized".into()));
        }
    }
    let seed = AdminSeed {
        username: config.admin.username.clone(),
        password: config.admin.password.clone(),
    };
    let seeded = blocking(store, move |s| s.seed_defaults(&seed)).await?;
    let message = if seeded {
        "Database initialized"
    } else {
        "Database already initialized"
    };
    Ok(Json(json!({ "success": true, "seeded": seeded, "message": message })))
}

#[get("/health")]
pub async fn health(store: &Db) -> Json<Value> {
    let database = match blocking(store, |s| s.ping()).await {
        Ok(()) => "connected",
        Err(e) => {
            log::warn!("Health ping failed: {}", e);
            "unreachable"
        }
    };
    Json(json!({
        "status": "ok",
        "time": document::now_iso(),
        "backend": store.backend_name(),
        "database": database,
    }))
}

// ── Contact form ───────────────────────────────────────

#[post("/contact", data = "<form>")]
pub async fn contact(
    store: &Db,
    form: Json<ContactSubmission>,
) -> ApiResult<(Status, Json<Value>)> {
    let message = form.into_inner().into_message();
    let stored = blocking(store, move |s| s.insert(Collection::Messages, message)).await?;
    log::info!("Contact message {} received", document::id_of(&stored).unwrap_or("?"));
    Ok((
        Status::Created,
        Json(json!({ "success": true, "id": document::id_of(&stored) })),
    ))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        list,
        create,
        update,
        delete,
        settings_get,
        settings_update,
        analytics,
        init,
        health,
        contact,
    ]
}
