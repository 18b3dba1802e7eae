use diesel::prelude::*;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::content_mentions)]
pub struct NewContentMention {
    pub comment_id: Uuid,
    pub mentioned_user_id: Uuid,
}
