use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    App,
    community::{
        CommentError,
        models::comment::{Comment, CommentUpdate, new_concurrency_stamp, validate_text},
    },
    error::AppError,
    identity::AuthUser,
    mentions::MentionTask,
    policy::{self, CommentAction},
    schema::comments,
};

use super::CommentDto;

#[axum::debug_handler]
pub async fn patch_comment(
    State(ctx): State<App>,
    Path(id): Path<Uuid>,
    AuthUser(caller): AuthUser,
    crate::json::Json(input): crate::json::Json<CommentPatch>,
) -> Result<Json<CommentDto>, AppError> {
    let text = validate_text(&input.text).map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    let comment: Comment = comments::table
        .find(id)
        .filter(comments::is_deleted.eq(false))
        .select(Comment::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or(CommentError::NotFound)?;

    policy::authorize(CommentAction::Update, &caller, &comment)?;

    if !comment.stamp_matches(input.concurrency_stamp.as_deref()) {
        return Err(CommentError::ConcurrencyConflict.into());
    }

    let changes = CommentUpdate {
        text,
        concurrency_stamp: new_concurrency_stamp(),
        updated_at: chrono::Utc::now().naive_utc(),
    };

    // guarded by the stamp we just read so a concurrent writer surfaces as a
    // conflict instead of a lost update
    let updated: Comment = diesel::update(
        comments::table
            .find(id)
            .filter(comments::concurrency_stamp.eq(&comment.concurrency_stamp)),
    )
    .set(&changes)
    .get_result(&mut conn)
    .await
    .optional()?
    .ok_or(CommentError::ConcurrencyConflict)?;

    ctx.mentions.enqueue(MentionTask::Updated {
        comment_id: updated.id,
        text: updated.text.clone(),
    });

    Ok(Json(CommentDto::new(&updated, &caller)))
}

#[derive(Deserialize)]
pub struct CommentPatch {
    text: String,
    concurrency_stamp: Option<String>,
}
