use crate::entities::{ai_questions, quran_verses};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskQuestionRequest {
    #[schema(example = "Which surah is recited in the morning prayer?")]
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AiQuestionResponse {
    pub id: i64,
    pub question: String,
    pub answer: Option<String>,
    pub is_quranic: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ai_questions::Model> for AiQuestionResponse {
    fn from(question: ai_questions::Model) -> Self {
        Self {
            id: question.id,
            question: question.question,
            answer: question.answer,
            is_quranic: question.is_quranic,
            created_at: question.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerseResponse {
    pub id: i64,
    pub surah_name: String,
    pub surah_number: i32,
    pub verse_number: i32,
    pub verse_arabic: String,
    pub translation: Option<String>,
    pub topic: Option<String>,
}

impl From<quran_verses::Model> for VerseResponse {
    fn from(verse: quran_verses::Model) -> Self {
        Self {
            id: verse.id,
            surah_name: verse.surah_name,
            surah_number: verse.surah_number,
            verse_number: verse.verse_number,
            verse_arabic: verse.verse_arabic,
            translation: verse.translation,
            topic: verse.topic,
        }
    }
}
