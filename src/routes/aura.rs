use std::sync::Arc;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{blocking, ApiError, ApiResult};
use crate::aura::{self, Assistant};
use crate::models::collection::Collection;
use crate::models::document;
use crate::models::message::AuraLead;
use crate::store::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Questions asked so far in this conversation, this one included.
    #[serde(default)]
    pub question_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub ask_for_contact: bool,
    /// Follow-up asking for name and email, sent with `askForContact`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_prompt: Option<&'static str>,
}

#[post("/chat", data = "<req>")]
pub fn chat(assistant: &State<Assistant>, req: Json<ChatRequest>) -> ApiResult<Json<ChatResponse>> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".into()));
    }
    let ask_for_contact = aura::should_ask_for_contact(req.question_count);
    Ok(Json(ChatResponse {
        response: assistant.respond(&req.message),
        ask_for_contact,
        contact_prompt: ask_for_contact.then_some(aura::CONTACT_PROMPT),
    }))
}

/// Store a lead captured in the chat as a message.
pub(crate) async fn save_lead(store: &State<Arc<dyn Store>>, lead: AuraLead) -> ApiResult<String> {
    lead.validate().map_err(ApiError::BadRequest)?;
    let message = lead.into_message();
    let stored = blocking(store, move |s| s.insert(Collection::Messages, message)).await?;
    let id = document::id_of(&stored).unwrap_or_default().to_string();
    log::info!("Aura lead saved as message {}", id);
    Ok(id)
}

#[post("/lead", data = "<lead>")]
pub async fn lead(
    store: &State<Arc<dyn Store>>,
    lead: Json<AuraLead>,
) -> ApiResult<(Status, Json<Value>)> {
    let id = save_lead(store, lead.into_inner()).await?;
    Ok((Status::Created, Json(json!({ "success": true, "id": id }))))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![chat, lead]
}
