//! A [`ConferenceStore`] that keeps everything in memory.
//!
//! Besides the read side of the trait it offers the write operations that the
//! rest of the system expects to happen elsewhere (enrolling users, toggling
//! plugins, creating conferences), so tests and demos can set up a scenario
//! without a database.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::DatabaseError;
use crate::models::{
    ConferenceId, ConferenceState, Context, ContextRef, ContextState, Course, CourseId,
    Enrollment, EnrollmentRole, EnrollmentState, Group, GroupId, GroupMembership,
    MembershipState, NewWebConference, PluginSetting, User, UserId, WebConference,
};
use crate::token::{generate_conference_key, generate_token, token_digest};
use crate::ConferenceStore;

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    /// digest -> owner
    access_tokens: BTreeMap<String, UserId>,
    courses: BTreeMap<CourseId, Course>,
    groups: BTreeMap<GroupId, Group>,
    enrollments: Vec<Enrollment>,
    group_memberships: Vec<GroupMembership>,
    plugin_settings: BTreeMap<String, PluginSetting>,
    conferences: BTreeMap<ConferenceId, WebConference>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_user(&self, name: impl Into<String>) -> User {
        self.insert_user(name.into(), false).await
    }

    pub async fn create_site_admin(&self, name: impl Into<String>) -> User {
        self.insert_user(name.into(), true).await
    }

    async fn insert_user(&self, name: String, site_admin: bool) -> User {
        let mut state = self.state.write().await;
        let user = User {
            id: UserId(state.next_id()),
            name,
            site_admin,
        };
        state.users.insert(user.id, user.clone());
        user
    }

    /// Returns the plaintext token, only its digest is kept.
    pub async fn create_access_token(&self, user: UserId) -> String {
        let token = generate_token();
        self.state
            .write()
            .await
            .access_tokens
            .insert(token_digest(&token), user);
        token
    }

    pub async fn create_course(&self, name: impl Into<String>) -> Course {
        let mut state = self.state.write().await;
        let course = Course {
            id: CourseId(state.next_id()),
            name: name.into(),
            workflow_state: ContextState::Available,
        };
        state.courses.insert(course.id, course.clone());
        course
    }

    pub async fn create_group(&self, course: CourseId, name: impl Into<String>) -> Group {
        let mut state = self.state.write().await;
        let group = Group {
            id: GroupId(state.next_id()),
            course_id: course,
            name: name.into(),
            workflow_state: ContextState::Available,
        };
        state.groups.insert(group.id, group.clone());
        group
    }

    pub async fn set_context_state(&self, context: ContextRef, workflow_state: ContextState) {
        let mut state = self.state.write().await;
        match context {
            ContextRef::Course(id) => {
                if let Some(course) = state.courses.get_mut(&id) {
                    course.workflow_state = workflow_state;
                }
            }
            ContextRef::Group(id) => {
                if let Some(group) = state.groups.get_mut(&id) {
                    group.workflow_state = workflow_state;
                }
            }
        }
    }

    pub async fn enroll(
        &self,
        course: CourseId,
        user: UserId,
        role: EnrollmentRole,
        workflow_state: EnrollmentState,
    ) {
        self.state.write().await.enrollments.push(Enrollment {
            course_id: course,
            user_id: user,
            role,
            workflow_state,
        });
    }

    /// Adds the user to the group or updates the state of an existing
    /// membership.
    pub async fn add_group_member(
        &self,
        group: GroupId,
        user: UserId,
        workflow_state: MembershipState,
    ) {
        let mut state = self.state.write().await;
        if let Some(membership) = state
            .group_memberships
            .iter_mut()
            .find(|membership| membership.group_id == group && membership.user_id == user)
        {
            membership.workflow_state = workflow_state;
        } else {
            state.group_memberships.push(GroupMembership {
                group_id: group,
                user_id: user,
                workflow_state,
            });
        }
    }

    /// Creates the plugin setting or replaces the existing one of that name.
    pub async fn put_plugin_setting(&self, setting: PluginSetting) {
        self.state
            .write()
            .await
            .plugin_settings
            .insert(setting.name.clone(), setting);
    }

    pub async fn set_plugin_disabled(&self, name: &str, disabled: bool) {
        if let Some(setting) = self.state.write().await.plugin_settings.get_mut(name) {
            setting.disabled = disabled;
        }
    }

    pub async fn create_conference(&self, new: NewWebConference) -> WebConference {
        let mut state = self.state.write().await;
        let conference = WebConference {
            id: ConferenceId(state.next_id()),
            context: new.context,
            user_id: new.user_id,
            title: new.title,
            conference_type: new.conference_type,
            conference_key: generate_conference_key(),
            description: new.description,
            duration: new.duration,
            started_at: None,
            ended_at: None,
            workflow_state: ConferenceState::Active,
            user_settings: new.user_settings,
            created_at: Utc::now(),
            participant_ids: Vec::new(),
        };
        state.conferences.insert(conference.id, conference.clone());
        conference
    }

    pub async fn add_participant(&self, conference: ConferenceId, user: UserId) {
        if let Some(conference) = self.state.write().await.conferences.get_mut(&conference) {
            if let Err(index) = conference.participant_ids.binary_search(&user) {
                conference.participant_ids.insert(index, user);
            }
        }
    }

    pub async fn delete_conference(&self, conference: ConferenceId) {
        if let Some(conference) = self.state.write().await.conferences.get_mut(&conference) {
            conference.workflow_state = ConferenceState::Deleted;
        }
    }
}

#[async_trait]
impl ConferenceStore for MemoryStore {
    async fn user_by_token_digest(&self, digest: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .access_tokens
            .get(digest)
            .and_then(|user| state.users.get(user))
            .cloned())
    }

    async fn context(&self, context: ContextRef) -> Result<Option<Context>, DatabaseError> {
        let state = self.state.read().await;
        Ok(match context {
            ContextRef::Course(id) => state.courses.get(&id).cloned().map(Context::Course),
            ContextRef::Group(id) => state.groups.get(&id).cloned().map(Context::Group),
        })
    }

    async fn enrollments(
        &self,
        course: CourseId,
        user: UserId,
    ) -> Result<Vec<Enrollment>, DatabaseError> {
        Ok(self
            .state
            .read()
            .await
            .enrollments
            .iter()
            .filter(|enrollment| enrollment.course_id == course && enrollment.user_id == user)
            .cloned()
            .collect())
    }

    async fn group_membership(
        &self,
        group: GroupId,
        user: UserId,
    ) -> Result<Option<GroupMembership>, DatabaseError> {
        Ok(self
            .state
            .read()
            .await
            .group_memberships
            .iter()
            .find(|membership| membership.group_id == group && membership.user_id == user)
            .cloned())
    }

    async fn plugin_settings(&self) -> Result<Vec<PluginSetting>, DatabaseError> {
        Ok(self
            .state
            .read()
            .await
            .plugin_settings
            .values()
            .cloned()
            .collect())
    }

    async fn conferences(&self, context: ContextRef) -> Result<Vec<WebConference>, DatabaseError> {
        let mut conferences: Vec<WebConference> = self
            .state
            .read()
            .await
            .conferences
            .values()
            .filter(|conference| {
                conference.context == context
                    && conference.workflow_state == ConferenceState::Active
            })
            .cloned()
            .collect();
        conferences.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(conferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tokens_resolve_to_their_owner() {
        let store = MemoryStore::new();
        let user = store.create_user("teacher").await;
        let token = store.create_access_token(user.id).await;

        assert_eq!(
            store
                .user_by_token_digest(&token_digest(&token))
                .await
                .unwrap(),
            Some(user)
        );
        assert_eq!(store.user_by_token_digest(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn conferences_are_scoped_to_their_context_and_skip_deleted_ones() {
        let store = MemoryStore::new();
        let teacher = store.create_user("teacher").await;
        let course = store.create_course("course").await;
        let other = store.create_course("other").await;
        let context = ContextRef::Course(course.id);

        let first = store
            .create_conference(NewWebConference::new(context, teacher.id, "Wimba", "one", Some(60)))
            .await;
        let second = store
            .create_conference(NewWebConference::new(context, teacher.id, "Wimba", "two", Some(60)))
            .await;
        let deleted = store
            .create_conference(NewWebConference::new(context, teacher.id, "Wimba", "gone", None))
            .await;
        store.delete_conference(deleted.id).await;
        store
            .create_conference(NewWebConference::new(
                ContextRef::Course(other.id),
                teacher.id,
                "Wimba",
                "elsewhere",
                None,
            ))
            .await;

        let ids: Vec<ConferenceId> = store
            .conferences(context)
            .await
            .unwrap()
            .into_iter()
            .map(|conference| conference.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn participants_stay_sorted_and_unique() {
        let store = MemoryStore::new();
        let course = store.create_course("course").await;
        let a = store.create_user("a").await;
        let b = store.create_user("b").await;
        let conference = store
            .create_conference(NewWebConference::new(
                ContextRef::Course(course.id),
                a.id,
                "Wimba",
                "c",
                None,
            ))
            .await;
        store.add_participant(conference.id, b.id).await;
        store.add_participant(conference.id, a.id).await;
        store.add_participant(conference.id, b.id).await;

        let listed = store
            .conferences(ContextRef::Course(course.id))
            .await
            .unwrap();
        assert_eq!(listed[0].participant_ids, vec![a.id, b.id]);
    }
}
