use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::community::EntityRef;

pub const MAX_COMMENT_LENGTH: usize = 5000;

#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: String,
    pub author_id: Uuid,
    pub text: String,
    pub replied_comment_id: Option<Uuid>,
    pub concurrency_stamp: String,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: String,
    pub author_id: Uuid,
    pub text: String,
    pub replied_comment_id: Option<Uuid>,
    pub concurrency_stamp: String,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::comments)]
pub struct CommentUpdate {
    pub text: String,
    pub concurrency_stamp: String,
    pub updated_at: NaiveDateTime,
}

impl Comment {
    /// The only way a comment comes into existence: stamps identity, the
    /// initial concurrency token and the creation instant, and enforces the
    /// text rules.
    pub fn new(
        author_id: Uuid,
        entity: &EntityRef,
        text: &str,
        replied_comment_id: Option<Uuid>,
    ) -> Result<NewComment, &'static str> {
        let text = validate_text(text)?;

        Ok(NewComment {
            id: Uuid::new_v4(),
            entity_type: entity.kind.as_str().to_owned(),
            entity_id: entity.id.clone(),
            author_id,
            text,
            replied_comment_id,
            concurrency_stamp: new_concurrency_stamp(),
            is_deleted: false,
            created_at: chrono::Utc::now().naive_utc(),
        })
    }

    /// `None` means the caller did not send a stamp, which always matches.
    pub fn stamp_matches(&self, supplied: Option<&str>) -> bool {
        match supplied {
            Some(stamp) => stamp == self.concurrency_stamp,
            None => true,
        }
    }
}

pub fn validate_text(text: &str) -> Result<String, &'static str> {
    let text = text.trim();

    if text.is_empty() {
        return Err("No content provided");
    }

    if text.len() > MAX_COMMENT_LENGTH {
        return Err("Content too long (max 5000 characters)");
    }

    Ok(text.to_owned())
}

pub fn new_concurrency_stamp() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::community::EntityKind;

    fn entity() -> EntityRef {
        EntityRef {
            kind: EntityKind::Post,
            id: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn test_new_comment_trims_text() {
        let comment = Comment::new(Uuid::new_v4(), &entity(), "  hello  ", None).unwrap();
        assert_eq!(comment.text, "hello");
        assert!(!comment.is_deleted);
    }

    #[test]
    fn test_new_comment_rejects_blank_text() {
        assert!(Comment::new(Uuid::new_v4(), &entity(), "   \n ", None).is_err());
    }

    #[test]
    fn test_new_comment_rejects_oversized_text() {
        let text = "a".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(Comment::new(Uuid::new_v4(), &entity(), &text, None).is_err());
    }

    #[test]
    fn test_new_comments_get_distinct_ids_and_stamps() {
        let a = Comment::new(Uuid::new_v4(), &entity(), "one", None).unwrap();
        let b = Comment::new(Uuid::new_v4(), &entity(), "two", None).unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(a.concurrency_stamp, b.concurrency_stamp);
    }

    #[test]
    fn test_stamp_matching() {
        let new = Comment::new(Uuid::new_v4(), &entity(), "text", None).unwrap();
        let comment = Comment {
            id: new.id,
            entity_type: new.entity_type,
            entity_id: new.entity_id,
            author_id: new.author_id,
            text: new.text,
            replied_comment_id: None,
            concurrency_stamp: new.concurrency_stamp.clone(),
            is_deleted: false,
            created_at: new.created_at,
            updated_at: None,
        };

        assert!(comment.stamp_matches(None));
        assert!(comment.stamp_matches(Some(&new.concurrency_stamp)));
        assert!(!comment.stamp_matches(Some("stale")));
    }
}
