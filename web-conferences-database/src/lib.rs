pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod schema;
pub mod token;

use async_trait::async_trait;
use diesel_async::pooled_connection::deadpool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
pub use error::DatabaseError;
use models::{
    Context, ContextRef, CourseId, Enrollment, GroupId, GroupMembership, PluginSetting, User,
    UserId, WebConference,
};

pub type Pool = deadpool::Pool<AsyncPgConnection>;

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub fn get_database_connection(database_url: &str) -> Result<Pool, DatabaseError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).build()?)
}

/// Read access to everything the conference listing needs.
#[async_trait]
pub trait ConferenceStore: Send + Sync {
    /// The owner of the access token with the given digest.
    async fn user_by_token_digest(&self, digest: &str) -> Result<Option<User>, DatabaseError>;

    async fn context(&self, context: ContextRef) -> Result<Option<Context>, DatabaseError>;

    /// All enrollments of the user in the course, in any state.
    async fn enrollments(
        &self,
        course: CourseId,
        user: UserId,
    ) -> Result<Vec<Enrollment>, DatabaseError>;

    async fn group_membership(
        &self,
        group: GroupId,
        user: UserId,
    ) -> Result<Option<GroupMembership>, DatabaseError>;

    async fn plugin_settings(&self) -> Result<Vec<PluginSetting>, DatabaseError>;

    /// The active conferences of the context with their participants,
    /// newest first.
    async fn conferences(&self, context: ContextRef) -> Result<Vec<WebConference>, DatabaseError>;
}
