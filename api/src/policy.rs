use crate::{
    community::{CommentError, models::comment::Comment},
    identity::models::User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Update,
    Delete,
}

/// The single place deciding who may mutate a comment, independent of any
/// request plumbing: updates are for the author only, deletion also for
/// admins.
pub fn authorize(
    action: CommentAction,
    caller: &User,
    comment: &Comment,
) -> Result<(), CommentError> {
    let allowed = match action {
        CommentAction::Update => caller.id == comment.author_id,
        CommentAction::Delete => caller.id == comment.author_id || caller.is_admin(),
    };

    if allowed {
        Ok(())
    } else {
        Err(CommentError::Forbidden)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identity::models::ADMIN_ROLE;
    use uuid::Uuid;

    fn user(n: u128, role: &str) -> User {
        User {
            id: Uuid::from_u128(n),
            username: format!("user{n}"),
            display_name: None,
            role: role.into(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn comment_by(author: &User) -> Comment {
        Comment {
            id: Uuid::from_u128(1000),
            entity_type: "post".into(),
            entity_id: Uuid::from_u128(7).to_string(),
            author_id: author.id,
            text: "a comment".into(),
            replied_comment_id: None,
            concurrency_stamp: "stamp".into(),
            is_deleted: false,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn test_author_can_update_and_delete() {
        let author = user(1, "member");
        let comment = comment_by(&author);

        assert!(authorize(CommentAction::Update, &author, &comment).is_ok());
        assert!(authorize(CommentAction::Delete, &author, &comment).is_ok());
    }

    #[test]
    fn test_non_author_can_do_neither() {
        let author = user(1, "member");
        let other = user(2, "member");
        let comment = comment_by(&author);

        assert_eq!(
            authorize(CommentAction::Update, &other, &comment),
            Err(CommentError::Forbidden)
        );
        assert_eq!(
            authorize(CommentAction::Delete, &other, &comment),
            Err(CommentError::Forbidden)
        );
    }

    #[test]
    fn test_admin_can_delete_but_not_update_others_comments() {
        let author = user(1, "member");
        let admin = user(2, ADMIN_ROLE);
        let comment = comment_by(&author);

        assert!(authorize(CommentAction::Delete, &admin, &comment).is_ok());
        assert_eq!(
            authorize(CommentAction::Update, &admin, &comment),
            Err(CommentError::Forbidden)
        );
    }
}
