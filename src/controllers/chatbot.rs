use std::sync::Arc;

use axum::{Extension, Json, extract::State};

use crate::{
    chatbot::{ChatMessage, ChatReply, complete},
    db::stats::get_platform_stats,
    error::Error,
    extract::ApiJson,
    model::CurrentUser,
    state::SharedAppState,
};

#[derive(serde::Deserialize, Debug)]
pub struct IncomingMessage {
    role: Option<String>,
    content: Option<String>,
}

#[derive(serde::Deserialize, Debug)]
pub struct ChatRequest {
    messages: Option<Vec<IncomingMessage>>,
}

impl TryFrom<ChatRequest> for Vec<ChatMessage> {
    type Error = Error;

    fn try_from(request: ChatRequest) -> Result<Self, Self::Error> {
        let messages = request
            .messages
            .filter(|messages| !messages.is_empty())
            .ok_or(Error::BadRequest("Messages array is required".to_string()))?;

        messages
            .into_iter()
            .map(|message| {
                let (role, content) = match (message.role, message.content) {
                    (Some(role), Some(content)) if !role.is_empty() && !content.is_empty() => {
                        (role, content)
                    }
                    _ => {
                        return Err(Error::BadRequest(
                            "Each message must have role and content".to_string(),
                        ));
                    }
                };

                if role != "user" && role != "assistant" {
                    return Err(Error::BadRequest(
                        "Message role must be either \"user\" or \"assistant\"".to_string(),
                    ));
                }

                Ok(ChatMessage { role, content })
            })
            .collect()
    }
}

#[tracing::instrument(name = "[POST] chatbot/chat", skip_all)]
pub async fn chat(
    user: Option<Extension<Arc<CurrentUser>>>,
    State(app_state): State<SharedAppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatReply>, Error> {
    let messages: Vec<ChatMessage> = request.try_into()?;

    if let Some(Extension(user)) = &user {
        tracing::info!(user_id = %user.id, "chat from signed in user");
    }

    let stats = match get_platform_stats(&app_state.pool).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!(error = ?e, "platform stats unavailable, chatting without context");
            None
        }
    };

    let reply = complete(
        &app_state.http_client,
        &app_state.config.chatbot,
        messages,
        stats.as_ref(),
    )
    .await?;

    Ok(Json(reply))
}
