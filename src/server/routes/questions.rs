use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{categories_map, get_all_categories, get_category_type},
            questions::{self, get_all_questions, search_questions},
        },
        Question,
    },
    server::{
        app::AppState,
        deserializers::{deserialize_lenient_page, first_page},
        error::ApiError,
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{json_body, method_not_allowed_for_id, ApiResponse};

pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default = "first_page", deserialize_with = "deserialize_lenient_page")]
    page: i64,
}

// every field is optional so that incomplete questions reach the database and fail there
#[derive(Deserialize)]
struct NewQuestion {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

/// Slice of `items` shown on the 1-based `page`. Pages before the first are empty.
fn paginate<T>(items: &[T], page: i64) -> &[T] {
    let Some(index) = page.checked_sub(1).and_then(|p| usize::try_from(p).ok()) else {
        return &[];
    };
    let start = index.saturating_mul(QUESTIONS_PER_PAGE);
    if start >= items.len() {
        return &[];
    }
    let end = (start + QUESTIONS_PER_PAGE).min(items.len());
    &items[start..end]
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> ApiResponse<QuestionsPage> {
    let questions = get_all_questions(&pool).await?;
    let on_page = paginate(&questions, page);
    let Some(first) = on_page.first() else {
        tracing::debug!("Page {page} is empty");
        return Err(ApiError::NotFound);
    };

    Ok(Json(QuestionsPage {
        success: true,
        current_category: get_category_type(&pool, first.category).await?,
        questions: on_page.to_vec(),
        total_questions: questions.len(),
        categories: categories_map(get_all_categories(&pool).await?),
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Deleted> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    match questions::delete_question(&pool, id).await {
        Ok(()) => {
            tracing::info!("Deleted question {id}");
            QUESTIONS_DELETED.inc();
            Ok(Json(Deleted {
                success: true,
                deleted: id,
            }))
        }
        Err(sqlx::Error::RowNotFound) => Err(ApiError::Unprocessable),
        Err(err) => Err(err.into()),
    }
}

async fn create_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<NewQuestion>, JsonRejection>,
) -> ApiResponse<Created> {
    let Json(new_question) = body.map_err(|rejection| {
        tracing::debug!("Rejected question body: {rejection}");
        ApiError::Unprocessable
    })?;
    let id = questions::create_question(
        &pool,
        new_question.question.as_deref(),
        new_question.answer.as_deref(),
        new_question.category,
        new_question.difficulty,
    )
    .await
    .map_err(|err| {
        tracing::warn!("Failed to insert question: {err}");
        ApiError::Unprocessable
    })?;

    tracing::info!("Created question {id}");
    QUESTIONS_CREATED.inc();
    Ok(Json(Created {
        success: true,
        created: id,
    }))
}

async fn search(State(pool): State<SqlitePool>, body: Bytes) -> ApiResponse<SearchResults> {
    let SearchBody { search_term } = json_body(&body)?;
    let found = search_questions(&pool, &search_term).await?;
    let Some(first) = found.first() else {
        return Err(ApiError::NotFound);
    };

    Ok(Json(SearchResults {
        success: true,
        current_category: get_category_type(&pool, first.category).await?,
        total_questions: found.len(),
        questions: found,
    }))
}

pub fn questions_router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/search", post(search))
        .route(
            "/questions/{id}",
            delete(delete_question).fallback(method_not_allowed_for_id),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_ten_wide() {
        let items: Vec<i32> = (1..=25).collect();
        assert_eq!(paginate(&items, 1), &items[0..10]);
        assert_eq!(paginate(&items, 2), &items[10..20]);
        assert_eq!(paginate(&items, 3), &[21, 22, 23, 24, 25]);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let items: Vec<i32> = (1..=20).collect();
        assert!(paginate(&items, 3).is_empty());
        assert!(paginate(&items, 1000).is_empty());
        assert!(paginate(&items, 0).is_empty());
        assert!(paginate(&items, -1).is_empty());
        assert!(paginate(&items, i64::MAX).is_empty());
        assert!(paginate::<i32>(&[], 1).is_empty());
    }
}
