use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::{App, events::comment_events};

use super::comment::{
    create::create_comment,
    delete::delete_comment,
    get::{get_comments, get_comments_feed, get_replies},
    patch::patch_comment,
};

pub fn route() -> Router<App> {
    // TODO rate limit the public read endpoints
    Router::<App>::new()
        .route("/{entity_type}/{entity_id}/comments", get(get_comments))
        .route("/{entity_type}/{entity_id}/comments", post(create_comment))
        .route("/comments/{id}", patch(patch_comment))
        .route("/comments/{id}", delete(delete_comment))
        .route("/comments/{id}/replies", get(get_replies))
        .route("/comments/feed", get(get_comments_feed))
        .route("/comments/events", get(comment_events))
}
