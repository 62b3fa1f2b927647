//! Who may list the conferences of a course or group.

use web_conferences_database::models::{
    Context, Enrollment, EnrollmentRole, EnrollmentState, GroupMembership, MembershipState, User,
};
use web_conferences_database::{ConferenceStore, DatabaseError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rights {
    /// May list the conferences of the context.
    pub read: bool,
    /// Participates in every conference of the context.
    pub manage: bool,
}

impl Rights {
    pub const NONE: Self = Self {
        read: false,
        manage: false,
    };
    pub const READ: Self = Self {
        read: true,
        manage: false,
    };
    pub const MANAGE: Self = Self {
        read: true,
        manage: true,
    };

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            read: self.read || other.read,
            manage: self.manage || other.manage,
        }
    }
}

const fn role_rights(role: EnrollmentRole) -> Rights {
    match role {
        EnrollmentRole::Teacher | EnrollmentRole::Ta | EnrollmentRole::Designer => Rights::MANAGE,
        EnrollmentRole::Student | EnrollmentRole::Observer => Rights::READ,
    }
}

/// Only active enrollments count.
#[must_use]
pub fn course_rights(enrollments: &[Enrollment]) -> Rights {
    enrollments
        .iter()
        .filter(|enrollment| enrollment.workflow_state == EnrollmentState::Active)
        .fold(Rights::NONE, |rights, enrollment| {
            rights.union(role_rights(enrollment.role))
        })
}

/// Accepted members and the admins of the group's course may do everything,
/// nobody else anything.
#[must_use]
pub fn group_rights(
    membership: Option<&GroupMembership>,
    course_enrollments: &[Enrollment],
) -> Rights {
    let member = membership
        .is_some_and(|membership| membership.workflow_state == MembershipState::Accepted);
    if member || course_rights(course_enrollments).manage {
        Rights::MANAGE
    } else {
        Rights::NONE
    }
}

pub async fn rights_for(
    store: &dyn ConferenceStore,
    user: &User,
    context: &Context,
) -> Result<Rights, DatabaseError> {
    if user.site_admin {
        return Ok(Rights::MANAGE);
    }
    Ok(match context {
        Context::Course(course) => course_rights(&store.enrollments(course.id, user.id).await?),
        Context::Group(group) => {
            let membership = store.group_membership(group.id, user.id).await?;
            let enrollments = store.enrollments(group.course_id, user.id).await?;
            group_rights(membership.as_ref(), &enrollments)
        }
    })
}

#[cfg(test)]
mod tests {
    use web_conferences_database::models::{CourseId, GroupId, UserId};

    use super::*;

    fn enrollment(role: EnrollmentRole, workflow_state: EnrollmentState) -> Enrollment {
        Enrollment {
            course_id: CourseId(1),
            user_id: UserId(2),
            role,
            workflow_state,
        }
    }

    fn membership(workflow_state: MembershipState) -> GroupMembership {
        GroupMembership {
            group_id: GroupId(3),
            user_id: UserId(2),
            workflow_state,
        }
    }

    #[test]
    fn active_teachers_manage_and_students_read() {
        assert_eq!(
            course_rights(&[enrollment(EnrollmentRole::Teacher, EnrollmentState::Active)]),
            Rights::MANAGE
        );
        assert_eq!(
            course_rights(&[enrollment(EnrollmentRole::Student, EnrollmentState::Active)]),
            Rights::READ
        );
        assert_eq!(course_rights(&[]), Rights::NONE);
    }

    #[test]
    fn inactive_enrollments_grant_nothing() {
        for state in [
            EnrollmentState::Invited,
            EnrollmentState::Inactive,
            EnrollmentState::Completed,
            EnrollmentState::Deleted,
        ] {
            assert_eq!(
                course_rights(&[enrollment(EnrollmentRole::Teacher, state)]),
                Rights::NONE,
                "{state}"
            );
        }
    }

    #[test]
    fn the_strongest_enrollment_wins() {
        assert_eq!(
            course_rights(&[
                enrollment(EnrollmentRole::Student, EnrollmentState::Active),
                enrollment(EnrollmentRole::Ta, EnrollmentState::Active),
            ]),
            Rights::MANAGE
        );
    }

    #[test]
    fn groups_need_an_accepted_membership_or_a_course_admin() {
        assert_eq!(
            group_rights(Some(&membership(MembershipState::Accepted)), &[]),
            Rights::MANAGE
        );
        assert_eq!(
            group_rights(Some(&membership(MembershipState::Invited)), &[]),
            Rights::NONE
        );
        assert_eq!(
            group_rights(
                None,
                &[enrollment(EnrollmentRole::Student, EnrollmentState::Active)]
            ),
            Rights::NONE
        );
        assert_eq!(
            group_rights(
                None,
                &[enrollment(EnrollmentRole::Designer, EnrollmentState::Active)]
            ),
            Rights::MANAGE
        );
    }
}
