use axum::extract::{Path, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::{
    App,
    community::{
        CommentError,
        models::comment::{Comment, new_concurrency_stamp},
    },
    error::AppError,
    identity::AuthUser,
    policy::{self, CommentAction},
    schema::comments,
};

#[axum::debug_handler]
pub async fn delete_comment(
    State(ctx): State<App>,
    Path(id): Path<Uuid>,
    AuthUser(caller): AuthUser,
) -> Result<(), AppError> {
    let mut conn = ctx.diesel.get().await?;

    let comment: Comment = comments::table
        .find(id)
        .filter(comments::is_deleted.eq(false))
        .select(Comment::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or(CommentError::NotFound)?;

    policy::authorize(CommentAction::Delete, &caller, &comment)?;

    // soft delete: the row stays, every read path filters it out
    diesel::update(comments::table.find(id))
        .set((
            comments::is_deleted.eq(true),
            comments::concurrency_stamp.eq(new_concurrency_stamp()),
            comments::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(&mut conn)
        .await?;

    Ok(())
}
