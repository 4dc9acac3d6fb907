use crate::entities::{ai_question_entity as ai_questions, quran_verse_entity as verses};
use crate::error::{AppError, AppResult};
use crate::external::QuranAiService;
use crate::models::{
    AiQuestionResponse, AskQuestionRequest, PaginatedResponse, PaginationParams, VerseResponse,
};
use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

const MAX_QUESTION_LEN: usize = 2000;

#[derive(Clone)]
pub struct AiService {
    pool: DatabaseConnection,
    quran_ai: QuranAiService,
}

impl AiService {
    pub fn new(pool: DatabaseConnection, quran_ai: QuranAiService) -> Self {
        Self { pool, quran_ai }
    }

    /// Sends the question to the completion API and stores the exchange.
    pub async fn ask(
        &self,
        user_id: i64,
        request: AskQuestionRequest,
    ) -> AppResult<AiQuestionResponse> {
        let question = request.question.trim().to_string();
        if question.is_empty() {
            return Err(AppError::ValidationError(
                "Question cannot be empty".to_string(),
            ));
        }
        if question.len() > MAX_QUESTION_LEN {
            return Err(AppError::ValidationError(format!(
                "Question cannot exceed {MAX_QUESTION_LEN} characters"
            )));
        }

        let answer = self.quran_ai.ask(&question).await?;

        let record = ai_questions::ActiveModel {
            user_id: Set(Some(user_id)),
            question: Set(question),
            answer: Set(Some(answer)),
            is_quranic: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let record = record.insert(&self.pool).await?;
        Ok(record.into())
    }

    pub async fn history(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<AiQuestionResponse>> {
        let base_query =
            ai_questions::Entity::find().filter(ai_questions::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(ai_questions::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let data: Vec<AiQuestionResponse> = items.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::from_params(data, params, total))
    }

    /// Verse of the day: a deterministic pick that rotates daily through the
    /// active verses.
    pub async fn daily_verse(&self) -> AppResult<VerseResponse> {
        let count = verses::Entity::find()
            .filter(verses::Column::IsActive.eq(true))
            .count(&self.pool)
            .await?;

        if count == 0 {
            return Err(AppError::NotFound("No verses available".to_string()));
        }

        let index = Utc::now().date_naive().num_days_from_ce() as u64 % count;

        let verse = verses::Entity::find()
            .filter(verses::Column::IsActive.eq(true))
            .order_by_asc(verses::Column::Id)
            .offset(index)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("No verses available".to_string()))?;

        Ok(verse.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuranAiConfig;
    use crate::test_utils::{create_test_user, setup_test_db};
    use crate::entities::UserRole;

    fn service(db: &DatabaseConnection) -> AiService {
        // unconfigured client: ask() fails with ExternalApiError
        AiService::new(db.clone(), QuranAiService::new(QuranAiConfig::default()))
    }

    async fn seed_verse(db: &DatabaseConnection, surah_number: i32, verse_number: i32) {
        let verse = verses::ActiveModel {
            surah_name: Set("Al-Fatiha".to_string()),
            surah_number: Set(surah_number),
            verse_number: Set(verse_number),
            verse_arabic: Set("بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ".to_string()),
            translation: Set(None),
            topic: Set(None),
            is_active: Set(true),
            ..Default::default()
        };
        verse.insert(db).await.unwrap();
    }

    #[tokio::test]
    async fn test_ask_requires_configured_client() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "asker", UserRole::Participant).await;
        let service = service(&db);

        let result = service
            .ask(
                user.id,
                AskQuestionRequest {
                    question: "What is tajweed?".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ExternalApiError(_))));

        // nothing stored on failure
        let rows = ai_questions::Entity::find().count(&db).await.unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_question() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "asker", UserRole::Participant).await;
        let service = service(&db);

        let result = service
            .ask(
                user.id,
                AskQuestionRequest {
                    question: "   ".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_daily_verse_deterministic() {
        let db = setup_test_db().await;
        seed_verse(&db, 1, 1).await;
        seed_verse(&db, 1, 2).await;
        seed_verse(&db, 1, 3).await;
        let service = service(&db);

        let first = service.daily_verse().await.unwrap();
        let second = service.daily_verse().await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_daily_verse_empty_table() {
        let db = setup_test_db().await;
        let service = service(&db);

        assert!(matches!(
            service.daily_verse().await,
            Err(AppError::NotFound(_))
        ));
    }
}
