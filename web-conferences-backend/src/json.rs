//! The api representation of a conference.

use chrono::{DateTime, Utc};
use serde::Serialize;
use web_conferences_database::models::{ConferenceId, ContextType, UserId, WebConference};

use crate::plugins::PluginRegistry;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ConferenceJson {
    pub id: ConferenceId,
    pub title: String,
    pub conference_type: String,
    pub conference_key: String,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub long_running: bool,
    pub user_settings: serde_json::Value,
    pub has_advanced_settings: bool,
    pub users: Vec<UserId>,
    pub context_type: ContextType,
    pub context_id: i64,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub join_url: String,
}

#[must_use]
pub fn api_conference_json(conference: &WebConference, plugins: &PluginRegistry) -> ConferenceJson {
    let url = format!(
        "/{}/{}/conferences/{}",
        conference.context.path_segment(),
        conference.context.id(),
        conference.id
    );
    let mut users = conference.participant_ids.clone();
    users.sort_unstable();
    users.dedup();
    ConferenceJson {
        id: conference.id,
        title: conference.title.clone(),
        conference_type: conference.conference_type.clone(),
        conference_key: conference.conference_key.clone(),
        description: conference.description.clone(),
        duration: conference.duration,
        started_at: conference.started_at,
        ended_at: conference.ended_at,
        long_running: conference.duration.is_none(),
        user_settings: conference.user_settings.clone(),
        has_advanced_settings: plugins
            .provider(&conference.conference_type)
            .is_some_and(|provider| provider.has_advanced_settings),
        users,
        context_type: conference.context.context_type(),
        context_id: conference.context.id(),
        created_at: conference.created_at,
        join_url: format!("{url}/join"),
        url,
    }
}

#[must_use]
pub fn api_conferences_json(
    conferences: &[WebConference],
    plugins: &PluginRegistry,
) -> Vec<ConferenceJson> {
    conferences
        .iter()
        .map(|conference| api_conference_json(conference, plugins))
        .collect()
}
