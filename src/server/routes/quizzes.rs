use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions::next_quiz_question, Question},
    server::app::AppState,
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::{json_body, ApiResponse};

/// Category id that stands for "every category".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Vec<i64>,
    #[serde(default)]
    quiz_category: Option<QuizCategory>,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Option<Question>,
}

async fn play_quiz(State(pool): State<SqlitePool>, body: Bytes) -> ApiResponse<QuizQuestion> {
    let request: QuizRequest = json_body(&body)?;
    let category = request
        .quiz_category
        .map(|c| c.id)
        .filter(|id| *id != ALL_CATEGORIES);

    let question = next_quiz_question(&pool, category, &request.previous_questions).await?;
    match &question {
        Some(q) => QUIZ_QUESTIONS_SERVED
            .with_label_values(&[q.category.to_string().as_str()])
            .inc(),
        None => tracing::debug!(
            "Quiz exhausted after {} questions",
            request.previous_questions.len()
        ),
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quiz_router() -> Router<AppState> {
    Router::new().route("/quizzes", post(play_quiz))
}
