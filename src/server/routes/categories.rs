use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{categories_map, get_all_categories, get_category_type},
            questions::get_questions_for_category,
        },
        Question,
    },
    server::{app::AppState, error::ApiError},
};

use super::{method_not_allowed_for_id, ApiResponse};

#[derive(Serialize)]
struct CategoriesBody {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<String>,
}

async fn list_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesBody> {
    let categories = get_all_categories(&pool).await?;
    Ok(Json(CategoriesBody {
        success: true,
        categories: categories_map(categories),
    }))
}

async fn questions_for_category(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<CategoryQuestionsBody> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let questions = get_questions_for_category(&pool, id).await?;
    if questions.is_empty() {
        tracing::debug!("No questions in category {id}");
        return Err(ApiError::NotFound);
    }

    Ok(Json(CategoryQuestionsBody {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: get_category_type(&pool, id).await?,
    }))
}

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route(
            "/categories/{id}/questions",
            get(questions_for_category).fallback(method_not_allowed_for_id),
        )
}
