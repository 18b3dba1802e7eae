use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    App,
    community::{
        CommentError, EntityKind, EntityRef,
        models::{comment::Comment, post::Post},
    },
    error::AppError,
    identity::models::User,
    schema::{comments, posts, users},
};

use super::{CommentFeedItem, CommentWithDetails, enrich_authors, nest_comments};

pub async fn get_comments(
    State(ctx): State<App>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> Result<Json<Vec<CommentWithDetails>>, AppError> {
    let entity = EntityRef::parse(&entity_type, entity_id)?;

    let mut conn = ctx.diesel.get().await?;

    let rows: Vec<(Comment, User)> = comments::table
        .inner_join(users::table)
        .filter(comments::entity_type.eq(entity.kind.as_str()))
        .filter(comments::entity_id.eq(&entity.id))
        .filter(comments::is_deleted.eq(false))
        .order(comments::created_at.asc())
        .select((Comment::as_select(), User::as_select()))
        .load(&mut conn)
        .await?;

    let mut nested = nest_comments(rows);
    enrich_authors(&ctx, &mut nested).await;

    Ok(Json(nested))
}

#[derive(Deserialize)]
pub struct RepliesQuery {
    filter: Option<String>,
    entity_type: Option<EntityKind>,
    author_username: Option<String>,
    created_after: Option<NaiveDateTime>,
    created_before: Option<NaiveDateTime>,
}

pub async fn get_replies(
    State(ctx): State<App>,
    Path(id): Path<Uuid>,
    Query(q): Query<RepliesQuery>,
) -> Result<Json<Vec<CommentWithDetails>>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    let mut query = comments::table
        .inner_join(users::table)
        .filter(comments::replied_comment_id.eq(id))
        .filter(comments::is_deleted.eq(false))
        .order(comments::created_at.asc())
        .select((Comment::as_select(), User::as_select()))
        .into_boxed();

    if let Some(filter) = &q.filter {
        query = query.filter(comments::text.ilike(format!("%{}%", escape_like(filter))));
    }
    if let Some(kind) = q.entity_type {
        query = query.filter(comments::entity_type.eq(kind.as_str()));
    }
    if let Some(username) = &q.author_username {
        query = query.filter(users::username.eq(username.clone()));
    }
    if let Some(after) = q.created_after {
        query = query.filter(comments::created_at.ge(after));
    }
    if let Some(before) = q.created_before {
        query = query.filter(comments::created_at.le(before));
    }

    let rows: Vec<(Comment, User)> = query.load(&mut conn).await?;

    let mut replies: Vec<CommentWithDetails> = rows
        .iter()
        .map(|(comment, author)| CommentWithDetails::new(comment, author))
        .collect();

    enrich_authors(&ctx, &mut replies).await;

    Ok(Json(replies))
}

#[derive(Deserialize)]
pub struct FeedQuery {
    filter: Option<String>,
    page_size: i64,
    page_offset: i64,
}

pub async fn get_comments_feed(
    State(ctx): State<App>,
    Query(q): Query<FeedQuery>,
) -> Result<Json<Vec<CommentFeedItem>>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    // the feed is post comments only; other entity kinds never enter it
    let mut query = comments::table
        .inner_join(users::table)
        .filter(comments::entity_type.eq(EntityKind::Post.as_str()))
        .filter(comments::is_deleted.eq(false))
        .order(comments::created_at.desc())
        .limit(q.page_size)
        .offset(q.page_offset)
        .select((Comment::as_select(), User::as_select()))
        .into_boxed();

    if let Some(filter) = &q.filter {
        query = query.filter(comments::text.ilike(format!("%{}%", escape_like(filter))));
    }

    let rows: Vec<(Comment, User)> = query.load(&mut conn).await?;

    let mut nested = nest_comments(rows);
    enrich_authors(&ctx, &mut nested).await;

    let mut feed = Vec::with_capacity(nested.len());
    for item in nested {
        let entity = EntityRef::parse(&item.comment.entity_type, item.comment.entity_id.clone())?;

        let post: Post = posts::table
            .find(entity.post_id()?)
            .select(Post::as_select())
            .first(&mut conn)
            .await
            .optional()?
            .ok_or(CommentError::NotFound)?;

        feed.push(CommentFeedItem {
            comment: item,
            post_slug: post.slug,
            post_title: post.title,
            post_creation_date: post.created_at,
            post_community_name: post.author_name,
        });
    }

    Ok(Json(feed))
}

/// `%`, `_` and the escape character itself must not leak into LIKE patterns
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
