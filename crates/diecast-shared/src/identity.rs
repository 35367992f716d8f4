use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DISPLAY_NAME, LOCAL_ID_SUFFIX_LEN, PLATFORM_AVATAR, PLATFORM_ID_PREFIX,
};
use crate::types::UserId;

/// Platform user id: numeric in the messaging client, opaque elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PlatformUserId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for PlatformUserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Read-only identity payload handed over by the hosting platform at launch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformUser {
    pub id: PlatformUserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl PlatformUser {
    /// User id in the platform namespace, disjoint from locally generated ids.
    pub fn user_id(&self) -> UserId {
        UserId(format!("{PLATFORM_ID_PREFIX}{}", self.id))
    }

    /// Handle without a leading `@`, or empty.
    pub fn handle(&self) -> String {
        clean_handle(self.username.as_deref().unwrap_or_default())
    }

    /// Given + family name, falling back to the handle, then to the default label.
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default().trim(),
            self.last_name.as_deref().unwrap_or_default().trim()
        );
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        let handle = self.handle();
        if !handle.is_empty() {
            return handle;
        }
        DEFAULT_DISPLAY_NAME.to_string()
    }

    pub fn avatar(&self) -> String {
        first_letter(self.first_name.as_deref().unwrap_or_default())
            .or_else(|| first_letter(&self.handle()))
            .unwrap_or_else(|| PLATFORM_AVATAR.to_string())
    }
}

/// Generate a device-local user id: unix millis followed by a random suffix.
pub fn generate_local_user_id() -> UserId {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LOCAL_ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    UserId(format!("{}{}", chrono::Utc::now().timestamp_millis(), suffix))
}

/// Avatar letter for a display name: its first character, uppercased.
pub fn avatar_letter(name: &str) -> String {
    first_letter(name).unwrap_or_else(|| first_letter(DEFAULT_DISPLAY_NAME).unwrap_or_default())
}

/// Strip whitespace and a leading `@` from a messaging handle.
pub fn clean_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').trim().to_string()
}

fn first_letter(s: &str) -> Option<String> {
    s.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect::<String>())
}
