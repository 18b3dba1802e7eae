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
    community::{CommentError, EntityRef, models::comment::Comment},
    error::AppError,
    events::CommentEvent,
    identity::AuthUser,
    mentions::MentionTask,
    schema::comments,
};

use super::CommentDto;

#[axum::debug_handler]
pub async fn create_comment(
    State(ctx): State<App>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    AuthUser(author): AuthUser,
    crate::json::Json(input): crate::json::Json<CommentSubmission>,
) -> Result<Json<CommentDto>, AppError> {
    let entity = EntityRef::parse(&entity_type, entity_id)?;

    let mut conn = ctx.diesel.get().await?;

    // a reply's target must exist, be live and belong to the same entity
    if let Some(replied_id) = input.replied_comment_id {
        let target = comments::table
            .find(replied_id)
            .filter(comments::is_deleted.eq(false))
            .filter(comments::entity_type.eq(entity.kind.as_str()))
            .filter(comments::entity_id.eq(&entity.id))
            .select(comments::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()?;

        if target.is_none() {
            return Err(CommentError::NotFound.into());
        }
    }

    let new_comment = Comment::new(author.id, &entity, &input.text, input.replied_comment_id)
        .map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let comment: Comment = diesel::insert_into(comments::table)
        .values(&new_comment)
        .get_result(&mut conn)
        .await?;

    // the comment is durably written at this point; both dispatches are
    // fire-and-forget and cannot fail the request
    ctx.mentions.enqueue(MentionTask::Created {
        comment_id: comment.id,
        text: comment.text.clone(),
    });
    ctx.events.publish(CommentEvent::Created { id: comment.id });

    Ok(Json(CommentDto::new(&comment, &author)))
}

#[derive(Deserialize)]
pub struct CommentSubmission {
    text: String,
    replied_comment_id: Option<Uuid>,
}
