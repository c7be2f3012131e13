use std::sync::Arc;

use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use super::{blocking, ApiError, ApiResult};
use crate::models::admin::{self, LoginForm};
use crate::store::Store;

/// Check the posted credentials; on success hand out a fresh access token.
pub(crate) async fn check_login(
    store: &State<Arc<dyn Store>>,
    form: LoginForm,
    failure: &'static str,
) -> ApiResult<Json<Value>> {
    let username = form.username.trim().to_string();
    let password = form.password;
    let user = username.clone();
    let ok = blocking(store, move |s| s.verify_admin(&user, &password)).await?;
    if !ok {
        log::warn!("Failed login for '{}'", username);
        return Err(ApiError::Unauthorized(failure.into()));
    }
    log::info!("Admin '{}' logged in", username);
    Ok(Json(json!({
        "success": true,
        "access_token": admin::new_token(),
    })))
}

#[post("/login", data = "<form>")]
pub async fn login(store: &State<Arc<dyn Store>>, form: Json<LoginForm>) -> ApiResult<Json<Value>> {
    check_login(store, form.into_inner(), "Invalid username or password").await
}

pub fn routes() -> Vec<rocket::Route> {
    routes![login]
}
