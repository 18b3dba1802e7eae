use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// A community post, read-only here. `author_name` is denormalized by the
/// posting service and doubles as the community name in the comments feed.
#[derive(Queryable, Selectable, Debug, Serialize, Clone)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub author_name: String,
    pub created_at: chrono::NaiveDateTime,
}
