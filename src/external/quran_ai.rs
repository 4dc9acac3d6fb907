use crate::config::QuranAiConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a Quranic studies assistant for a university platform. \
Answer questions about the Quran, its recitation, tafsir and related sciences. \
If a question is unrelated to these topics, say so briefly instead of answering.";

#[derive(Clone)]
pub struct QuranAiService {
    http: Client,
    cfg: QuranAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl QuranAiService {
    pub fn new(cfg: QuranAiConfig) -> Self {
        let http = Client::builder()
            .user_agent("seraj-backend/quran-ai")
            .build()
            .expect("reqwest client");
        Self { http, cfg }
    }

    pub fn is_enabled(&self) -> bool {
        !self.cfg.api_key.is_empty()
    }

    /// Ask the completion API a single question.
    pub async fn ask(&self, question: &str) -> AppResult<String> {
        if !self.is_enabled() {
            return Err(AppError::ExternalApiError(
                "Quran AI is not configured".to_string(),
            ));
        }

        let base_url = self
            .cfg
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let model = self.cfg.model.as_deref().unwrap_or(DEFAULT_MODEL);

        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
        };

        let resp = self
            .http
            .post(format!("{base_url}/chat/completions"))
            .bearer_auth(&self.cfg.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::ExternalApiError(format!(
                "Completion API failed: HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let body: ChatResponse = resp.json().await?;
        let answer = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                AppError::ExternalApiError("Completion API returned no choices".to_string())
            })?;

        Ok(answer)
    }
}
