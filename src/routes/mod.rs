use std::sync::Arc;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Method, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::collection::Collection;
use crate::store::{Store, StoreError, StoreResult};

pub mod api;
pub mod aura;
pub mod auth;
pub mod edge;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors a handler can answer with. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Conflict(String),
    #[error("Internal server error")]
    Store(StoreError),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::Unauthorized(_) => Status::Unauthorized,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::MethodNotAllowed => Status::MethodNotAllowed,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::Store(_) | ApiError::Internal => Status::InternalServerError,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(id) => ApiError::Conflict(format!("ID '{}' already exists", id)),
            other => ApiError::Store(other),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        if let ApiError::Store(e) = &self {
            log::error!("{} {} failed: {}", req.method(), req.uri(), e);
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).respond_to(req)
    }
}

/// Run a store call on the blocking pool. Every backend is synchronous.
pub async fn blocking<T, F>(store: &State<Arc<dyn Store>>, call: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Store) -> StoreResult<T> + Send + 'static,
{
    let store = store.inner().clone();
    rocket::tokio::task::spawn_blocking(move || call(store.as_ref()))
        .await
        .map_err(|e| {
            log::error!("Store task panicked: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}

// ── Request guards ─────────────────────────────────────

/// Token from an `Authorization: Bearer <token>` header, if any.
/// Any token is accepted; only its presence is checked.
pub struct BearerToken(Option<String>);

impl BearerToken {
    pub fn require(&self) -> ApiResult<&str> {
        self.0
            .as_deref()
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized - No token provided".into()))
    }
}

fn token_from_header(header: Option<&str>) -> Option<String> {
    header?
        .split(' ')
        .nth(1)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for BearerToken {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(BearerToken(token_from_header(
            request.headers().get_one("Authorization"),
        )))
    }
}

/// Value of the `x-seed-token` header, if any.
pub struct SeedHeader(pub Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SeedHeader {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(SeedHeader(
            request.headers().get_one("x-seed-token").map(str::to_string),
        ))
    }
}

// ── CORS ───────────────────────────────────────────────

const ALL_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Adds the CORS headers to every response.
pub struct Cors;

/// Methods to advertise for a path: a collection handler's own verbs,
/// everything else gets the full set.
fn allowed_methods(path: &str) -> String {
    let mut segments = path.trim_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("api"), Some(name), None) => Collection::from_name(name)
            .map(Collection::allow_header)
            .unwrap_or_else(|| ALL_METHODS.to_string()),
        _ => ALL_METHODS.to_string(),
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut rocket::Response<'r>) {
        res.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            allowed_methods(req.uri().path().as_str()),
        ));
        res.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));
        if req.method() == Method::Options {
            res.set_header(Header::new("Access-Control-Max-Age", "600"));
        }
    }
}

/// Preflight: any path answers OPTIONS with an empty 200.
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::Ok
}

// ── Catchers ───────────────────────────────────────────

fn error_body(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

#[catch(400)]
pub fn bad_request() -> Json<Value> {
    error_body("Bad request")
}

#[catch(401)]
pub fn unauthorized() -> Json<Value> {
    error_body("Unauthorized")
}

#[catch(404)]
pub fn not_found() -> Json<Value> {
    error_body("Not found")
}

#[catch(405)]
pub fn method_not_allowed() -> Json<Value> {
    error_body("Method not allowed")
}

#[catch(409)]
pub fn conflict() -> Json<Value> {
    error_body("Conflict")
}

#[catch(422)]
pub fn unprocessable() -> Json<Value> {
    error_body("Invalid request body")
}

#[catch(500)]
pub fn server_error() -> Json<Value> {
    error_body("Internal server error")
}

pub fn catchers() -> Vec<rocket::Catcher> {
    catchers![
        bad_request,
        unauthorized,
        not_found,
        method_not_allowed,
        conflict,
        unprocessable,
        server_error
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_is_second_word() {
        assert_eq!(token_from_header(Some("Bearer abc")), Some("abc".into()));
        assert_eq!(token_from_header(Some("Token xyz")), Some("xyz".into()));
        assert_eq!(token_from_header(Some("Bearer")), None);
        assert_eq!(token_from_header(Some("Bearer ")), None);
        assert_eq!(token_from_header(None), None);
    }

    #[test]
    fn collection_paths_advertise_their_verbs() {
        assert_eq!(allowed_methods("/api/reviews"), "GET, POST, DELETE, OPTIONS");
        assert_eq!(allowed_methods("/api/projects"), ALL_METHODS);
        assert_eq!(allowed_methods("/api/auth/login"), ALL_METHODS);
        assert_eq!(allowed_methods("/edge/reviews"), ALL_METHODS);
    }

    #[test]
    fn store_errors_hide_details() {
        let e = ApiError::from(StoreError::Backend("connection refused".into()));
        assert_eq!(e.to_string(), "Internal server error");
        assert_eq!(e.status(), Status::InternalServerError);
        assert_eq!(ApiError::MethodNotAllowed.status(), Status::MethodNotAllowed);
    }

    #[test]
    fn duplicate_ids_are_conflicts() {
        let e = ApiError::from(StoreError::Duplicate("p1".into()));
        assert_eq!(e.status(), Status::Conflict);
        assert_eq!(e.to_string(), "ID 'p1' already exists");
    }
}
