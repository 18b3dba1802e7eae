use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "admin";

/// A platform user. Read-only from this service's perspective; accounts are
/// provisioned and mutated by the identity service.
#[derive(Queryable, Selectable, Debug, Serialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub role: String,
    pub created_at: chrono::NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
