//! Thin client for an OpenAI-compatible chat completion endpoint.

use secrecy::ExposeSecret;
use serde_json::Value;

use crate::{config::Chatbot, model::PlatformStats};

const BASE_PROMPT: &str = "You are the AI assistant of NovelMT, an online platform for reading novels.

Your job:
- help readers find and pick novels that match their taste
- answer questions about how the platform and its features work
- give information about genres, authors and story content
- compare novels when asked and suggest what to read next

Rules:
- keep answers short and clear but complete
- prefer the real platform data below when it is available
- when unsure, say so and suggest where to look";

#[derive(thiserror::Error, Debug)]
pub enum ChatbotError {
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{message}")]
    Upstream {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("Invalid response from chat API")]
    EmptyReply,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(serde::Serialize, Debug)]
pub struct ChatReply {
    pub message: String,
    pub usage: Option<Value>,
}

#[derive(serde::Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(serde::Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Value>,
}

#[derive(serde::Deserialize)]
struct Choice {
    message: Option<ChatMessage>,
}

pub fn system_prompt(stats: Option<&PlatformStats>) -> String {
    let Some(stats) = stats else {
        return BASE_PROMPT.to_string();
    };

    let top_novels = stats
        .top_novels
        .iter()
        .map(|novel| {
            format!(
                "\"{}\" ({}) - {}",
                novel.title,
                novel.author.as_deref().unwrap_or("unknown author"),
                novel.genres.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        "{BASE_PROMPT}

Platform data:
- total novels: {}
- total views: {}
- available genres: {}
- most popular novels: {}

When answering about specific genres or novels, use the data above and do not invent titles that are not listed.",
        stats.total_novels,
        stats.total_views,
        stats.genres.join(", "),
        top_novels
    )
}

/// Sends the conversation, prefixed with the system prompt, and returns the first choice.
#[tracing::instrument(name = "chat completion", skip_all, fields(model = %config.model, messages = messages.len()))]
pub async fn complete(
    http_client: &reqwest::Client,
    config: &Chatbot,
    messages: Vec<ChatMessage>,
    stats: Option<&PlatformStats>,
) -> Result<ChatReply, ChatbotError> {
    let mut conversation = Vec::with_capacity(messages.len() + 1);
    conversation.push(ChatMessage {
        role: "system".to_string(),
        content: system_prompt(stats),
    });
    conversation.extend(messages);

    let response = http_client
        .post(&config.api_url)
        .bearer_auth(config.api_key.expose_secret())
        .json(&CompletionRequest {
            model: &config.model,
            messages: conversation,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            stream: false,
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("Chat API error")
            .to_string();

        return Err(ChatbotError::Upstream { status, message });
    }

    let body: CompletionResponse = response.json().await?;
    let message = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .map(|message| message.content)
        .ok_or(ChatbotError::EmptyReply)?;

    Ok(ChatReply {
        message,
        usage: body.usage,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use crate::{
        config::Chatbot,
        model::{PlatformStats, TopNovel},
    };

    use super::{ChatMessage, ChatbotError, complete, system_prompt};

    fn config(api_url: String) -> Chatbot {
        Chatbot {
            api_url,
            api_key: "test-key".into(),
            model: "test-model".to_string(),
            temperature: 0.7,
            max_tokens: 800,
        }
    }

    fn question() -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: "user".to_string(),
            content: "Recommend a fantasy novel".to_string(),
        }]
    }

    #[test]
    fn prompt_without_stats_has_no_platform_section() {
        let prompt = system_prompt(None);

        assert!(prompt.contains("NovelMT"));
        assert!(!prompt.contains("Platform data"));
    }

    #[test]
    fn prompt_with_stats_lists_catalogue() {
        let stats = PlatformStats {
            total_novels: 12,
            total_views: 3400,
            genres: vec!["Fantasy".to_string(), "Romance".to_string()],
            top_novels: vec![TopNovel {
                title: "Sword Path".to_string(),
                author: None,
                genres: vec!["Fantasy".to_string()],
                views: 900,
            }],
        };

        let prompt = system_prompt(Some(&stats));

        assert!(prompt.contains("total novels: 12"));
        assert!(prompt.contains("total views: 3400"));
        assert!(prompt.contains("Fantasy, Romance"));
        assert!(prompt.contains("\"Sword Path\" (unknown author) - Fantasy"));
    }

    #[tokio::test]
    async fn forwards_conversation_and_returns_first_choice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "stream": false,
                "max_tokens": 800
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Try Sword Path."}}],
                "usage": {"total_tokens": 42}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = complete(
            &reqwest::Client::new(),
            &config(format!("{}/v1/chat/completions", server.uri())),
            question(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(reply.message, "Try Sword Path.");
        assert_eq!(reply.usage, Some(json!({"total_tokens": 42})));

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Recommend a fantasy novel");
    }

    #[tokio::test]
    async fn upstream_error_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached"}
            })))
            .mount(&server)
            .await;

        let error = complete(
            &reqwest::Client::new(),
            &config(server.uri()),
            question(),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(error, ChatbotError::Upstream { .. }));
        assert_eq!(error.to_string(), "Rate limit reached");
    }

    #[tokio::test]
    async fn reply_without_choices_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let error = complete(
            &reqwest::Client::new(),
            &config(server.uri()),
            question(),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(error, ChatbotError::EmptyReply));
    }
}
