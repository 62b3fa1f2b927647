//! Listing the conferences of a course or group that a user may see.

use std::collections::HashSet;

use tracing::{debug, info};
use web_conferences_database::models::{
    ConferenceState, ContextRef, ContextState, User, UserId, WebConference,
};

use crate::error::AppError;
use crate::permissions::{rights_for, Rights};
use crate::AppState;

/// The requesting user together with their rights on the listed context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: UserId,
    pub rights: Rights,
}

/// Managers of the context take part in all of its conferences, everyone
/// else in the ones they created or were added to.
#[must_use]
pub fn is_participant(conference: &WebConference, viewer: &Viewer) -> bool {
    viewer.rights.manage
        || conference.user_id == viewer.user_id
        || conference.participant_ids.contains(&viewer.user_id)
}

/// Newest first, ties broken by the higher id.
#[must_use]
pub fn visible_conferences(
    context: ContextRef,
    candidates: Vec<WebConference>,
    enabled_conference_types: &HashSet<&str>,
    viewer: &Viewer,
) -> Vec<WebConference> {
    let mut visible: Vec<WebConference> = candidates
        .into_iter()
        .filter(|conference| {
            conference.context == context && conference.workflow_state == ConferenceState::Active
        })
        .filter(|conference| enabled_conference_types.contains(conference.conference_type.as_str()))
        .filter(|conference| is_participant(conference, viewer))
        .collect();
    visible.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    visible
}

/// Fails with [`AppError::NotFound`] for unknown or deleted contexts and with
/// [`AppError::Unauthorized`] when the user may not read the context. Nothing
/// beyond the context and the user's rights is loaded in those cases.
pub async fn list_conferences(
    state: &AppState,
    user: &User,
    context: ContextRef,
) -> Result<Vec<WebConference>, AppError> {
    let record = state
        .store
        .context(context)
        .await?
        .filter(|record| record.workflow_state() != ContextState::Deleted)
        .ok_or(AppError::NotFound)?;

    let rights = rights_for(state.store.as_ref(), user, &record).await?;
    if !rights.read {
        info!(user = %user.id, %context, "not allowed to list conferences");
        return Err(AppError::Unauthorized);
    }
    let viewer = Viewer {
        user_id: user.id,
        rights,
    };

    let settings = state.store.plugin_settings().await?;
    let enabled = state.plugins.enabled_conference_types(&settings);
    let candidates = state.store.conferences(context).await?;
    let candidate_count = candidates.len();
    let visible = visible_conferences(context, candidates, &enabled, &viewer);
    debug!(
        "{} of {candidate_count} conferences of {context} visible to user {}",
        visible.len(),
        user.id
    );
    Ok(visible)
}
