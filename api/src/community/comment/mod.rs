pub mod create;
pub mod delete;
pub mod get;
pub mod patch;

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::{App, identity::models::User, profile};

use super::models::comment::Comment;

/// Comment author as shown to clients. The profile image is resolved lazily
/// and best-effort; an empty string means resolution failed or was skipped.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_image_data_url: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        UserDto {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            profile_image_data_url: String::new(),
        }
    }
}

// The transport shape of a single comment
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentDto {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: String,
    pub text: String,
    pub replied_comment_id: Option<Uuid>,
    pub creation_time: NaiveDateTime,
    pub last_modification_time: Option<NaiveDateTime>,
    pub concurrency_stamp: String,
    pub author: UserDto,
}

impl CommentDto {
    pub fn new(comment: &Comment, author: &User) -> Self {
        CommentDto {
            id: comment.id,
            entity_type: comment.entity_type.clone(),
            entity_id: comment.entity_id.clone(),
            text: comment.text.clone(),
            replied_comment_id: comment.replied_comment_id,
            creation_time: comment.created_at,
            last_modification_time: comment.updated_at,
            concurrency_stamp: comment.concurrency_stamp.clone(),
            author: UserDto::from(author),
        }
    }
}

// A root comment carrying its direct replies
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentWithDetails {
    #[serde(flatten)]
    pub comment: CommentDto,
    pub is_deleted: bool,
    pub replies: Vec<CommentDto>,
}

impl CommentWithDetails {
    pub fn new(comment: &Comment, author: &User) -> Self {
        CommentWithDetails {
            comment: CommentDto::new(comment, author),
            is_deleted: comment.is_deleted,
            replies: vec![],
        }
    }
}

// A feed entry: a nested comment plus metadata of the post it lives on
#[derive(Debug, Serialize, Clone)]
pub struct CommentFeedItem {
    #[serde(flatten)]
    pub comment: CommentWithDetails,
    pub post_slug: String,
    pub post_title: String,
    pub post_creation_date: NaiveDateTime,
    pub post_community_name: String,
}

/// Reshapes a flat, ordered batch of comment+author rows into root comments
/// each carrying its direct replies. Order is preserved on both levels. A
/// reply whose target is not a root in the batch is dropped from the output
/// entirely; the UI only renders one level of nesting.
pub fn nest_comments(rows: Vec<(Comment, User)>) -> Vec<CommentWithDetails> {
    let (root_rows, reply_rows): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|(comment, _)| comment.replied_comment_id.is_none());

    let mut roots = Vec::with_capacity(root_rows.len());
    let mut root_index = HashMap::with_capacity(root_rows.len());

    for (comment, author) in root_rows {
        root_index.insert(comment.id, roots.len());
        roots.push(CommentWithDetails::new(&comment, &author));
    }

    for (comment, author) in reply_rows {
        let Some(parent_id) = comment.replied_comment_id else {
            continue;
        };

        if let Some(&at) = root_index.get(&parent_id) {
            roots[at].replies.push(CommentDto::new(&comment, &author));
        }
    }

    roots
}

/// Fills in the profile pictures for every author appearing in `items`,
/// resolving each distinct author exactly once.
pub async fn enrich_authors(ctx: &App, items: &mut [CommentWithDetails]) {
    let author_ids: Vec<Uuid> = items
        .iter()
        .flat_map(|item| {
            std::iter::once(item.comment.author.id)
                .chain(item.replies.iter().map(|r: &CommentDto| r.author.id))
        })
        .collect();

    let pictures = profile::resolve_profile_pictures(ctx, author_ids).await;

    for item in items {
        if let Some(url) = pictures.get(&item.comment.author.id) {
            item.comment.author.profile_image_data_url = url.clone();
        }

        for reply in &mut item.replies {
            if let Some(url) = pictures.get(&reply.author.id) {
                reply.author.profile_image_data_url = url.clone();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn mock_user(n: u128) -> User {
        User {
            id: Uuid::from_u128(n),
            username: format!("user{n}"),
            display_name: Some(format!("User {n}")),
            role: "member".into(),
            created_at: NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn mock_comment(n: u128, replied: Option<u128>, minute: u32) -> (Comment, User) {
        let comment = Comment {
            id: Uuid::from_u128(n),
            entity_type: "post".into(),
            entity_id: Uuid::from_u128(7).to_string(),
            author_id: Uuid::from_u128(n),
            text: format!("comment {n}"),
            replied_comment_id: replied.map(Uuid::from_u128),
            concurrency_stamp: format!("stamp-{n}"),
            is_deleted: false,
            created_at: NaiveDate::from_ymd_opt(2023, 1, 1)
                .unwrap()
                .and_hms_opt(12, minute, 0)
                .unwrap(),
            updated_at: None,
        };

        (comment, mock_user(n))
    }

    #[test]
    fn test_nest_comments_with_no_rows() {
        assert!(nest_comments(vec![]).is_empty());
    }

    #[test]
    fn test_nest_comments_attaches_replies_to_their_roots() {
        let rows = vec![
            mock_comment(1, None, 0),
            mock_comment(2, Some(1), 1),
            mock_comment(3, None, 2),
            mock_comment(4, Some(3), 3),
            mock_comment(5, Some(1), 4),
        ];

        let nested = nest_comments(rows);

        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].comment.id, Uuid::from_u128(1));
        assert_eq!(nested[1].comment.id, Uuid::from_u128(3));

        let reply_ids: Vec<Uuid> = nested[0].replies.iter().map(|r| r.id).collect();
        assert_eq!(reply_ids, vec![Uuid::from_u128(2), Uuid::from_u128(5)]);
        assert_eq!(nested[1].replies.len(), 1);
        assert_eq!(nested[1].replies[0].id, Uuid::from_u128(4));

        for root in &nested {
            for reply in &root.replies {
                assert_eq!(reply.replied_comment_id, Some(root.comment.id));
            }
        }
    }

    #[test]
    fn test_nest_comments_keeps_replies_ahead_of_their_root() {
        // a feed page is ordered newest first, so a reply can precede its root
        let rows = vec![mock_comment(2, Some(1), 1), mock_comment(1, None, 0)];

        let nested = nest_comments(rows);

        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].replies.len(), 1);
        assert_eq!(nested[0].replies[0].id, Uuid::from_u128(2));
    }

    #[test]
    fn test_nest_comments_drops_replies_without_a_root() {
        // A(id=1) is a root, B(id=2) replies to it, C(id=3) replies to a
        // comment that is not in the batch. C must not appear anywhere.
        let rows = vec![
            mock_comment(1, None, 0),
            mock_comment(2, Some(1), 1),
            mock_comment(3, Some(99), 2),
        ];

        let nested = nest_comments(rows);

        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].comment.id, Uuid::from_u128(1));
        assert_eq!(nested[0].replies.len(), 1);
        assert_eq!(nested[0].replies[0].id, Uuid::from_u128(2));

        let all_ids: Vec<Uuid> = nested
            .iter()
            .flat_map(|root| {
                std::iter::once(root.comment.id).chain(root.replies.iter().map(|r| r.id))
            })
            .collect();
        assert!(!all_ids.contains(&Uuid::from_u128(3)));
    }

    #[test]
    fn test_nest_comments_drops_replies_to_replies() {
        // the UI renders one level; a reply targeting another reply is not a
        // root and gets dropped like any other orphan
        let rows = vec![
            mock_comment(1, None, 0),
            mock_comment(2, Some(1), 1),
            mock_comment(3, Some(2), 2),
        ];

        let nested = nest_comments(rows);

        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].replies.len(), 1);
        assert_eq!(nested[0].replies[0].id, Uuid::from_u128(2));
    }

    #[test]
    fn test_nest_comments_carries_each_rows_own_author() {
        let rows = vec![mock_comment(1, None, 0), mock_comment(2, Some(1), 1)];

        let nested = nest_comments(rows);

        assert_eq!(nested[0].comment.author.username, "user1");
        assert_eq!(nested[0].replies[0].author.username, "user2");
    }
}
