use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::error::DatabaseError;
use crate::models::{
    ConferenceId, ConferenceState, Context, ContextRef, Course, CourseId, Enrollment, Group,
    GroupId, GroupMembership, PluginSetting, User, UserId, WebConference,
};
use crate::schema::{
    access_tokens, courses, enrollments, group_memberships, groups, plugin_settings, users,
    web_conference_participants, web_conferences,
};
use crate::{ConferenceStore, Pool};

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct UserRow {
    id: i64,
    name: String,
    site_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            name: row.name,
            site_admin: row.site_admin,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct CourseRow {
    id: i64,
    name: String,
    workflow_state: String,
}

impl TryFrom<CourseRow> for Course {
    type Error = DatabaseError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CourseId(row.id),
            name: row.name,
            workflow_state: row.workflow_state.parse()?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct GroupRow {
    id: i64,
    course_id: i64,
    name: String,
    workflow_state: String,
}

impl TryFrom<GroupRow> for Group {
    type Error = DatabaseError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GroupId(row.id),
            course_id: CourseId(row.course_id),
            name: row.name,
            workflow_state: row.workflow_state.parse()?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct EnrollmentRow {
    course_id: i64,
    user_id: i64,
    role: String,
    workflow_state: String,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = DatabaseError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            course_id: CourseId(row.course_id),
            user_id: UserId(row.user_id),
            role: row.role.parse()?,
            workflow_state: row.workflow_state.parse()?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = group_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct GroupMembershipRow {
    group_id: i64,
    user_id: i64,
    workflow_state: String,
}

impl TryFrom<GroupMembershipRow> for GroupMembership {
    type Error = DatabaseError;

    fn try_from(row: GroupMembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            group_id: GroupId(row.group_id),
            user_id: UserId(row.user_id),
            workflow_state: row.workflow_state.parse()?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = plugin_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct PluginSettingRow {
    name: String,
    disabled: bool,
    settings: serde_json::Value,
}

impl From<PluginSettingRow> for PluginSetting {
    fn from(row: PluginSettingRow) -> Self {
        Self {
            name: row.name,
            disabled: row.disabled,
            settings: row.settings,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = web_conferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct ConferenceRow {
    id: i64,
    context_type: String,
    context_id: i64,
    user_id: i64,
    title: String,
    conference_type: String,
    conference_key: String,
    description: Option<String>,
    duration: Option<i32>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    workflow_state: String,
    user_settings: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl ConferenceRow {
    fn into_conference(self, participant_ids: Vec<UserId>) -> Result<WebConference, DatabaseError> {
        Ok(WebConference {
            id: ConferenceId(self.id),
            context: ContextRef::from_parts(&self.context_type, self.context_id)?,
            user_id: UserId(self.user_id),
            title: self.title,
            conference_type: self.conference_type,
            conference_key: self.conference_key,
            description: self.description,
            duration: self.duration,
            started_at: self.started_at,
            ended_at: self.ended_at,
            workflow_state: self.workflow_state.parse()?,
            user_settings: self.user_settings,
            created_at: self.created_at,
            participant_ids,
        })
    }
}

/// [`ConferenceStore`] backed by postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConferenceStore for PgStore {
    async fn user_by_token_digest(&self, digest: &str) -> Result<Option<User>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let user = users::table
            .inner_join(access_tokens::table)
            .filter(access_tokens::token_digest.eq(digest))
            .select(UserRow::as_select())
            .first(&mut connection)
            .await
            .optional()?;
        Ok(user.map(User::from))
    }

    async fn context(&self, context: ContextRef) -> Result<Option<Context>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(match context {
            ContextRef::Course(CourseId(id)) => courses::table
                .find(id)
                .select(CourseRow::as_select())
                .first(&mut connection)
                .await
                .optional()?
                .map(Course::try_from)
                .transpose()?
                .map(Context::Course),
            ContextRef::Group(GroupId(id)) => groups::table
                .find(id)
                .select(GroupRow::as_select())
                .first(&mut connection)
                .await
                .optional()?
                .map(Group::try_from)
                .transpose()?
                .map(Context::Group),
        })
    }

    async fn enrollments(
        &self,
        course: CourseId,
        user: UserId,
    ) -> Result<Vec<Enrollment>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        enrollments::table
            .filter(enrollments::course_id.eq(course.0))
            .filter(enrollments::user_id.eq(user.0))
            .select(EnrollmentRow::as_select())
            .load(&mut connection)
            .await?
            .into_iter()
            .map(Enrollment::try_from)
            .collect()
    }

    async fn group_membership(
        &self,
        group: GroupId,
        user: UserId,
    ) -> Result<Option<GroupMembership>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        group_memberships::table
            .filter(group_memberships::group_id.eq(group.0))
            .filter(group_memberships::user_id.eq(user.0))
            .select(GroupMembershipRow::as_select())
            .first(&mut connection)
            .await
            .optional()?
            .map(GroupMembership::try_from)
            .transpose()
    }

    async fn plugin_settings(&self) -> Result<Vec<PluginSetting>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let settings = plugin_settings::table
            .select(PluginSettingRow::as_select())
            .load(&mut connection)
            .await?;
        Ok(settings.into_iter().map(PluginSetting::from).collect())
    }

    async fn conferences(&self, context: ContextRef) -> Result<Vec<WebConference>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let rows = web_conferences::table
            .filter(web_conferences::context_type.eq(context.context_type().as_str()))
            .filter(web_conferences::context_id.eq(context.id()))
            .filter(web_conferences::workflow_state.ne(ConferenceState::Deleted.as_str()))
            .order((web_conferences::created_at.desc(), web_conferences::id.desc()))
            .select(ConferenceRow::as_select())
            .load(&mut connection)
            .await?;
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        debug!("loaded {} conferences for {context}", ids.len());

        let participants: Vec<(i64, i64)> = web_conference_participants::table
            .filter(web_conference_participants::web_conference_id.eq_any(ids))
            .select((
                web_conference_participants::web_conference_id,
                web_conference_participants::user_id,
            ))
            .order((
                web_conference_participants::web_conference_id,
                web_conference_participants::user_id,
            ))
            .load(&mut connection)
            .await?;
        with_participants(rows, participants)
    }
}

/// Pairs each conference row with its `(conference id, user id)` participant
/// rows, which arrive ordered by conference and user.
fn with_participants(
    rows: Vec<ConferenceRow>,
    participants: Vec<(i64, i64)>,
) -> Result<Vec<WebConference>, DatabaseError> {
    let mut participants_by_conference: HashMap<i64, Vec<UserId>> = HashMap::new();
    for (conference_id, user_id) in participants {
        participants_by_conference
            .entry(conference_id)
            .or_default()
            .push(UserId(user_id));
    }

    rows.into_iter()
        .map(|row| {
            let mut participant_ids =
                participants_by_conference.remove(&row.id).unwrap_or_default();
            participant_ids.dedup();
            row.into_conference(participant_ids)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use serde_json::json;

    use super::*;
    use crate::models::{EnrollmentRole, EnrollmentState};

    fn conference_row(id: i64, context_type: &str) -> ConferenceRow {
        ConferenceRow {
            id,
            context_type: context_type.to_owned(),
            context_id: 7,
            user_id: 1,
            title: format!("Wimba {id}"),
            conference_type: "Wimba".to_owned(),
            conference_key: "key".to_owned(),
            description: None,
            duration: Some(60),
            started_at: None,
            ended_at: None,
            workflow_state: "active".to_owned(),
            user_settings: json!({}),
            created_at: Utc.with_ymd_and_hms(2013, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn conference_rows_become_conferences() {
        let conference = conference_row(3, "Course")
            .into_conference(vec![UserId(4)])
            .unwrap();
        assert_eq!(conference.id, ConferenceId(3));
        assert_eq!(conference.context, ContextRef::Course(CourseId(7)));
        assert_eq!(conference.workflow_state, ConferenceState::Active);
        assert_eq!(conference.participant_ids, vec![UserId(4)]);
    }

    #[test]
    fn unknown_context_types_are_rejected() {
        assert!(conference_row(3, "Account").into_conference(Vec::new()).is_err());
    }

    #[test]
    fn unknown_roles_are_invalid_values() {
        let row = EnrollmentRow {
            course_id: 7,
            user_id: 1,
            role: "principal".to_owned(),
            workflow_state: "active".to_owned(),
        };
        assert!(matches!(
            Enrollment::try_from(row),
            Err(DatabaseError::InvalidValue { column: "role", ref value }) if value == "principal"
        ));

        let row = EnrollmentRow {
            course_id: 7,
            user_id: 1,
            role: "ta".to_owned(),
            workflow_state: "completed".to_owned(),
        };
        let enrollment = Enrollment::try_from(row).unwrap();
        assert_eq!(enrollment.role, EnrollmentRole::Ta);
        assert_eq!(enrollment.workflow_state, EnrollmentState::Completed);
    }

    #[test]
    fn participants_are_grouped_by_conference() {
        let conferences = with_participants(
            vec![conference_row(2, "Group"), conference_row(1, "Group")],
            vec![(1, 5), (1, 5), (1, 9), (2, 3), (42, 8)],
        )
        .unwrap();
        assert_eq!(conferences[0].id, ConferenceId(2));
        assert_eq!(conferences[0].participant_ids, vec![UserId(3)]);
        assert_eq!(conferences[1].participant_ids, vec![UserId(5), UserId(9)]);
    }
}
