use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;

macro_rules! id_type {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub i64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&self.0, f)
                }
            }
        )*
    };
}

id_type!(UserId, CourseId, GroupId, ConferenceId);

/// Enums that are stored by name in a varchar column.
macro_rules! string_enum {
    ($column:literal, $name:ident { $($variant:ident => $value:literal),* $(,)? }) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )*
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)*
                }
            }
        }

        impl FromStr for $name {
            type Err = DatabaseError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($value => Ok(Self::$variant),)*
                    other => Err(DatabaseError::InvalidValue {
                        column: $column,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!("workflow_state", ContextState {
    Available => "available",
    Deleted => "deleted",
});

string_enum!("role", EnrollmentRole {
    Teacher => "teacher",
    Ta => "ta",
    Designer => "designer",
    Student => "student",
    Observer => "observer",
});

string_enum!("workflow_state", EnrollmentState {
    Active => "active",
    Invited => "invited",
    Inactive => "inactive",
    Completed => "completed",
    Deleted => "deleted",
});

string_enum!("workflow_state", MembershipState {
    Accepted => "accepted",
    Invited => "invited",
    Requested => "requested",
    Deleted => "deleted",
});

string_enum!("workflow_state", ConferenceState {
    Active => "active",
    Deleted => "deleted",
});

string_enum!("context_type", ContextType {
    Course => "Course",
    Group => "Group",
});

/// Points at the course or group that owns conferences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextRef {
    Course(CourseId),
    Group(GroupId),
}

impl ContextRef {
    #[must_use]
    pub const fn context_type(self) -> ContextType {
        match self {
            Self::Course(_) => ContextType::Course,
            Self::Group(_) => ContextType::Group,
        }
    }

    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Course(CourseId(id)) | Self::Group(GroupId(id)) => id,
        }
    }

    /// The route segment of this context type, `courses` or `groups`.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Course(_) => "courses",
            Self::Group(_) => "groups",
        }
    }

    pub fn from_parts(context_type: &str, id: i64) -> Result<Self, DatabaseError> {
        Ok(match context_type.parse::<ContextType>()? {
            ContextType::Course => Self::Course(CourseId(id)),
            ContextType::Group => Self::Group(GroupId(id)),
        })
    }
}

impl fmt::Display for ContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.context_type(), self.id())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub site_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub workflow_state: ContextState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub course_id: CourseId,
    pub name: String,
    pub workflow_state: ContextState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Context {
    Course(Course),
    Group(Group),
}

impl Context {
    #[must_use]
    pub const fn workflow_state(&self) -> ContextState {
        match self {
            Self::Course(course) => course.workflow_state,
            Self::Group(group) => group.workflow_state,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub user_id: UserId,
    pub role: EnrollmentRole,
    pub workflow_state: EnrollmentState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupMembership {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub workflow_state: MembershipState,
}

/// Provider configuration, e.g. `wimba` with `{"domain": "wimba.test"}`.
#[derive(Clone, Debug, PartialEq)]
pub struct PluginSetting {
    pub name: String,
    pub disabled: bool,
    pub settings: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WebConference {
    pub id: ConferenceId,
    pub context: ContextRef,
    pub user_id: UserId,
    pub title: String,
    pub conference_type: String,
    pub conference_key: String,
    pub description: Option<String>,
    /// Minutes. `None` for long running conferences.
    pub duration: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub workflow_state: ConferenceState,
    pub user_settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    /// Sorted ascending.
    pub participant_ids: Vec<UserId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewWebConference {
    pub context: ContextRef,
    pub user_id: UserId,
    pub title: String,
    pub conference_type: String,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub user_settings: serde_json::Value,
}

impl NewWebConference {
    /// A conference with empty user settings and no description.
    pub fn new(
        context: ContextRef,
        user_id: UserId,
        conference_type: impl Into<String>,
        title: impl Into<String>,
        duration: Option<i32>,
    ) -> Self {
        Self {
            context,
            user_id,
            title: title.into(),
            conference_type: conference_type.into(),
            description: None,
            duration,
            user_settings: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_enums_parse_their_stored_names() {
        assert_eq!("ta".parse::<EnrollmentRole>().unwrap(), EnrollmentRole::Ta);
        assert_eq!(EnrollmentState::Completed.as_str(), "completed");
        assert_eq!(ContextType::Group.to_string(), "Group");
        let err = "teacherish".parse::<EnrollmentRole>().unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidValue { column: "role", ref value } if value == "teacherish"
        ));
    }

    #[test]
    fn context_refs_round_trip_through_their_columns() {
        let group = ContextRef::Group(GroupId(12));
        assert_eq!(group.context_type(), ContextType::Group);
        assert_eq!(group.path_segment(), "groups");
        assert_eq!(
            ContextRef::from_parts(group.context_type().as_str(), group.id()).unwrap(),
            group
        );
        assert!(ContextRef::from_parts("Account", 1).is_err());
    }
}
