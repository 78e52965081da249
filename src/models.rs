use serde::{Deserialize, Serialize};
use serenity::model::id::{ChannelId, GuildId, RoleId, UserId};
use std::collections::BTreeMap;
use std::fmt;

/// Key of the support channel inside [`ServerRecord::channels`].
pub const SUPPORT_CHANNEL: &str = "supportChannel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Warn,
    Mute,
    Unmute,
    Kick,
    Ban,
    Unban,
    #[serde(other)]
    Other,
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Warn => "Warn",
            Self::Mute => "Mute",
            Self::Unmute => "Unmute",
            Self::Kick => "Kick",
            Self::Ban => "Ban",
            Self::Unban => "Unban",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationLogEntry {
    pub case_number: u64,
    pub log_type: LogType,
    pub user_id: UserId,
    pub moderator_id: UserId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub id: GuildId,
    #[serde(default)]
    pub moderation_logs: Vec<ModerationLogEntry>,
    #[serde(default)]
    pub support_answers: BTreeMap<String, String>,
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelId>,
    #[serde(default, alias = "staffRoles")]
    pub staff_role_id: Option<RoleId>,
}

impl ServerRecord {
    pub fn new(id: GuildId) -> Self {
        Self {
            id,
            moderation_logs: Vec::new(),
            support_answers: BTreeMap::new(),
            channels: BTreeMap::new(),
            staff_role_id: None,
        }
    }

    /// Log entries about `user`, oldest first.
    pub fn logs_for(&self, user: UserId) -> Vec<ModerationLogEntry> {
        self.moderation_logs
            .iter()
            .filter(|log| log.user_id == user)
            .cloned()
            .collect()
    }

    pub fn support_channel(&self) -> Option<ChannelId> {
        self.channels.get(SUPPORT_CHANNEL).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub number_of_stars: i64,
    #[serde(default)]
    pub given_stars: i64,
    #[serde(default)]
    pub received_stars: i64,
}

impl UserRecord {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            number_of_stars: 0,
            given_stars: 0,
            received_stars: 0,
        }
    }
}
