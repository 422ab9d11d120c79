//! Course assistant. Replies are templated; see `coursely_core::assistant`.

use axum::extract::State;
use axum::Json;
use coursely_core::assistant::{reply, AssistantContext, AssistantReply, MAX_QUESTION_CHARS};
use coursely_core::error::CoreError;
use coursely_core::progress::summarize;
use coursely_core::types::DbId;
use coursely_db::repositories::{OrderRepo, SubActivityRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::guards::{course_progress_inputs, find_course, is_staff_for};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub course_id: Option<DbId>,
}

/// POST /api/v1/assistant
pub async fn ask(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<AskRequest>,
) -> AppResult<Json<DataResponse<AssistantReply>>> {
    let question = input.question.trim();
    if question.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "question must not be empty".into(),
        )));
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "question must be at most {MAX_QUESTION_CHARS} characters"
        ))));
    }

    let ctx = match input.course_id {
        Some(course_id) => course_context(&state, &user, course_id).await?,
        None => AssistantContext::default(),
    };
    let answer = reply(question, &ctx);
    tracing::debug!(user_id = user.user_id, intent = ?answer.intent, "Assistant replied");
    Ok(Json(DataResponse { data: answer }))
}

async fn course_context(
    state: &AppState,
    user: &AuthUser,
    course_id: DbId,
) -> AppResult<AssistantContext> {
    let course = find_course(state, course_id).await?;
    let is_enrolled = is_staff_for(user, &course)
        || OrderRepo::has_paid(&state.pool, user.user_id, course_id).await?;
    let mut ctx = AssistantContext {
        course_title: Some(course.title),
        is_enrolled,
        ..Default::default()
    };
    if !is_enrolled {
        return Ok(ctx);
    }

    let (ordered, completed) = course_progress_inputs(state, user.user_id, course_id).await?;
    let progress = summarize(&ordered, &completed);
    ctx.progress_percent = Some(progress.percent);
    if let Some(next_id) = progress.next_lesson_id {
        ctx.next_lesson_title = SubActivityRepo::find_by_id(&state.pool, next_id)
            .await?
            .map(|lesson| lesson.title);
    }
    Ok(ctx)
}
