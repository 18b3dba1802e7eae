use std::str::FromStr;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiRequestError;

pub mod comment;
pub mod models;
pub mod routes;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommentError {
    #[error("The comment or the content it refers to does not exist")]
    NotFound,

    #[error("You are not allowed to modify this comment")]
    Forbidden,

    #[error("The comment has been modified by someone else, reload and try again")]
    ConcurrencyConflict,

    #[error("Comments are not supported for entity kind `{0}`")]
    UnsupportedEntity(String),
}

impl ApiRequestError for CommentError {
    fn status_code(&self) -> StatusCode {
        match self {
            CommentError::NotFound => StatusCode::NOT_FOUND,
            CommentError::Forbidden => StatusCode::FORBIDDEN,
            CommentError::ConcurrencyConflict => StatusCode::CONFLICT,
            CommentError::UnsupportedEntity(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CommentError::NotFound => "NOT_FOUND",
            CommentError::Forbidden => "FORBIDDEN",
            CommentError::ConcurrencyConflict => "CONFLICT",
            CommentError::UnsupportedEntity(_) => "UNSUPPORTED_ENTITY",
        }
    }
}

/// The kinds of entities comments can attach to. A closed set so every
/// consumer matches exhaustively instead of assuming a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Post,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Post => "post",
        }
    }
}

impl FromStr for EntityKind {
    type Err = CommentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(EntityKind::Post),
            other => Err(CommentError::UnsupportedEntity(other.to_owned())),
        }
    }
}

impl Serialize for EntityKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// A comment's owning entity. The association is polymorphic (no foreign
/// key), so the id stays a string at rest; `post_id` is the one place the
/// "entity id is the post id" coupling lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn parse(kind: &str, id: String) -> Result<Self, CommentError> {
        Ok(Self {
            kind: kind.parse()?,
            id,
        })
    }

    /// The post this entity refers to. An id that does not parse means the
    /// referenced post cannot exist.
    pub fn post_id(&self) -> Result<Uuid, CommentError> {
        match self.kind {
            EntityKind::Post => Uuid::parse_str(&self.id).map_err(|_| CommentError::NotFound),
        }
    }
}
