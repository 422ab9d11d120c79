//! Lesson Q&A: student questions, instructor responses and the inbox.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use coursely_core::error::CoreError;
use coursely_core::types::DbId;
use coursely_core::validation::validate_body;
use coursely_db::models::question::{
    CreatePost, InboxQuery, InboxQuestion, VideoQuestion, VideoResponse,
};
use coursely_db::repositories::QuestionRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::guards::{ensure_enrolled, find_course, find_lesson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// A question with its responses, oldest first.
#[derive(Debug, Serialize)]
pub struct QuestionThread {
    #[serde(flatten)]
    pub question: VideoQuestion,
    pub responses: Vec<VideoResponse>,
}

/// POST /api/v1/lessons/{id}/questions
pub async fn ask(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<CreatePost>,
) -> AppResult<(StatusCode, Json<DataResponse<VideoQuestion>>)> {
    let (_, course_id) = find_lesson(&state, lesson_id).await?;
    let course = find_course(&state, course_id).await?;
    ensure_enrolled(&state, &user, &course).await?;
    validate_body(&input.body)?;

    let question =
        QuestionRepo::create_question(&state.pool, lesson_id, user.user_id, input.body.trim())
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: question })))
}

/// GET /api/v1/lessons/{id}/questions
pub async fn list_for_lesson(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<QuestionThread>>>> {
    let (_, course_id) = find_lesson(&state, lesson_id).await?;
    let course = find_course(&state, course_id).await?;
    ensure_enrolled(&state, &user, &course).await?;

    let questions = QuestionRepo::list_for_lesson(&state.pool, lesson_id).await?;
    let ids: Vec<DbId> = questions.iter().map(|q| q.id).collect();
    let mut responses: HashMap<DbId, Vec<VideoResponse>> = HashMap::new();
    for response in QuestionRepo::list_responses(&state.pool, &ids).await? {
        responses.entry(response.question_id).or_default().push(response);
    }

    let threads = questions
        .into_iter()
        .map(|question| QuestionThread {
            responses: responses.remove(&question.id).unwrap_or_default(),
            question,
        })
        .collect();
    Ok(Json(DataResponse { data: threads }))
}

/// POST /api/v1/questions/{id}/responses
///
/// Only the course's instructor (or a manager) may answer.
pub async fn respond(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(question_id): Path<DbId>,
    Json(input): Json<CreatePost>,
) -> AppResult<(StatusCode, Json<DataResponse<VideoResponse>>)> {
    let instructor_id = QuestionRepo::instructor_of_question(&state.pool, question_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Question", question_id))?;
    if instructor_id != user.user_id && !user.is_manager() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the course instructor can answer this question".into(),
        )));
    }
    validate_body(&input.body)?;

    let response =
        QuestionRepo::create_response(&state.pool, question_id, user.user_id, input.body.trim())
            .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/instructor/questions
///
/// Questions on the caller's courses; managers see every course.
pub async fn inbox(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Query(params): Query<InboxQuery>,
) -> AppResult<Json<DataResponse<Vec<InboxQuestion>>>> {
    let scope = (!user.is_manager()).then_some(user.user_id);
    let (limit, offset) = page(params.limit, params.offset);
    let questions = QuestionRepo::inbox(&state.pool, scope, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: questions }))
}
