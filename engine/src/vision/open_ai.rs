use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DescribeFuture, DescribeRequest, VisionError, VisionModel};

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

const MODEL: &str = "gpt-4o";
const PROMPT: &str = "Describe the content of this image in Korean.";
// the API's maximum; deliberately left untuned
const TEMPERATURE: f32 = 1.0;

/// The OpenAI chat-completions backend. Built once at startup from the
/// loaded credential and handed to the UI.
#[derive(Debug, Clone)]
pub struct OpenAiVision {
    client: Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAiVision {
    pub fn new(api_key: String) -> Self {
        Self::with_url(api_key, OPENAI_CHAT_URL)
    }

    pub fn with_url(api_key: String, url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            url: url.into(),
            model: MODEL.into(),
        }
    }
}

impl VisionModel for OpenAiVision {
    fn describe(&self, req: DescribeRequest) -> DescribeFuture<'_> {
        Box::pin(async move {
            let body = build_body(&self.model, &req);
            debug!(
                "describe request to {}: {}",
                self.url,
                serde_json::to_string(&body).unwrap_or_default()
            );

            let res = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            if !res.status().is_success() {
                let status = res.status().as_u16();
                let body = res.text().await.unwrap_or_default();
                return Err(VisionError::Api { status, body });
            }

            let completion: ChatCompletionResponse = res.json().await?;
            first_choice_text(completion)
        })
    }
}

fn build_body(model: &str, req: &DescribeRequest) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", req.mime_type, req.image_base64),
                    },
                },
            ],
        }],
        temperature: TEMPERATURE,
    }
}

fn first_choice_text(completion: ChatCompletionResponse) -> Result<String, VisionError> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(VisionError::NoChoices)
}

//
// ===== OpenAI wire types =====
//

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}
