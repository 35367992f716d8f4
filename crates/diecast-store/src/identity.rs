//! Session identity: one resident [`User`] per device session.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use diecast_shared::constants::{DEFAULT_DISPLAY_NAME, DEFAULT_RATING, KEY_USER};
use diecast_shared::error::{Result, ValidationError};
use diecast_shared::identity::{avatar_letter, clean_handle, generate_local_user_id, PlatformUser};

use crate::codec;
use crate::error::DecodeError;
use crate::kv::{KvStore, WriteStatus};
use crate::models::{ProfileEdit, User};

#[derive(Debug, Clone)]
pub struct IdentityManager {
    store: KvStore,
    user: User,
}

impl IdentityManager {
    /// Restore the stored identity or synthesize and persist a fresh one.
    pub fn load_or_create(store: KvStore) -> Self {
        let user = match decode_stored(store.get(KEY_USER)) {
            Ok(user) if user.is_valid() => {
                tracing::debug!(user_id = %user.id, "identity restored");
                return Self { store, user };
            }
            Ok(user) => {
                tracing::warn!(user_id = %user.id, "stored identity is invalid, replacing");
                fresh_local_user()
            }
            Err(DecodeError::Absent { .. }) => fresh_local_user(),
            Err(e) => {
                tracing::warn!(error = %e, "stored identity unreadable, replacing");
                fresh_local_user()
            }
        };

        tracing::info!(user_id = %user.id, "created local identity");
        let manager = Self { store, user };
        if !manager.persist().is_stored() {
            tracing::warn!("new identity kept for this session only");
        }
        manager
    }

    pub fn current(&self) -> &User {
        &self.user
    }

    /// Replace the session identity with the one handed over by the host
    /// platform. Re-adopting the same platform user keeps its registration
    /// date and locally edited city and contact.
    pub fn adopt_platform_identity(&mut self, platform: &PlatformUser) -> Result<&User> {
        let id = platform.user_id();
        let handle = platform.handle();
        let same_user = self.user.id == id;

        let contact = if same_user && !self.user.contact.is_empty() {
            self.user.contact.clone()
        } else if handle.is_empty() {
            String::new()
        } else {
            format!("@{handle}")
        };

        let user = User {
            display_name: platform.display_name(),
            avatar: platform.avatar(),
            handle,
            contact,
            city: if same_user { self.user.city.clone() } else { String::new() },
            registered_at: if same_user { self.user.registered_at } else { Utc::now() },
            rating: if same_user { self.user.rating } else { DEFAULT_RATING },
            review_count: if same_user { self.user.review_count } else { 0 },
            id,
        };

        tracing::info!(user_id = %user.id, readopted = same_user, "adopted platform identity");
        self.user = user;
        self.persist().or_unavailable()?;
        Ok(&self.user)
    }

    /// Apply profile edits. A blank display name is rejected and leaves the
    /// record untouched.
    pub fn update_profile(&mut self, edit: ProfileEdit) -> Result<&User> {
        let display_name = match edit.display_name.as_deref().map(str::trim) {
            Some("") => return Err(ValidationError::EmptyDisplayName.into()),
            Some(name) => Some(name.to_string()),
            None => None,
        };

        if let Some(name) = display_name {
            self.user.avatar = avatar_letter(&name);
            self.user.display_name = name;
        }
        if let Some(handle) = edit.handle {
            self.user.handle = clean_handle(&handle);
        }
        if let Some(city) = edit.city {
            self.user.city = city.trim().to_string();
        }
        if let Some(contact) = edit.contact {
            self.user.contact = contact.trim().to_string();
        }

        tracing::info!(user_id = %self.user.id, "profile updated");
        self.persist().or_unavailable()?;
        Ok(&self.user)
    }

    /// Forget the stored identity and start over with an unrelated one.
    pub fn logout(&mut self) -> Result<&User> {
        let previous = self.user.id.clone();
        let removed = self.store.remove(KEY_USER);

        self.user = fresh_local_user();
        tracing::info!(previous = %previous, user_id = %self.user.id, "logged out");
        removed.and(self.persist()).or_unavailable()?;
        Ok(&self.user)
    }

    /// Mirror the seller rating from the review ledger onto the session user.
    /// Returns whether anything changed.
    pub fn sync_stats(&mut self, rating: f64, review_count: u32) -> Result<bool> {
        if self.user.rating == rating && self.user.review_count == review_count {
            return Ok(false);
        }
        self.user.rating = rating;
        self.user.review_count = review_count;
        self.persist().or_unavailable()?;
        Ok(true)
    }

    fn persist(&self) -> WriteStatus {
        match codec::encode(&self.user) {
            Some(json) => self.store.set(KEY_USER, &json),
            None => WriteStatus::Dropped,
        }
    }
}

/// Decode plain JSON, falling back to the legacy base64-wrapped form.
fn decode_stored(raw: Option<String>) -> std::result::Result<User, DecodeError> {
    let legacy = raw.as_deref().and_then(|s| STANDARD.decode(s.trim()).ok());
    match codec::decode_record::<User>(KEY_USER, raw) {
        Err(err @ DecodeError::Malformed { .. }) => {
            let Some(bytes) = legacy else {
                return Err(err);
            };
            let text = String::from_utf8(bytes).map_err(|e| DecodeError::Malformed {
                key: KEY_USER.to_string(),
                reason: e.to_string(),
            })?;
            tracing::debug!("reading legacy encoded identity");
            codec::decode_record(KEY_USER, Some(text))
        }
        other => other,
    }
}

fn fresh_local_user() -> User {
    User {
        id: generate_local_user_id(),
        display_name: DEFAULT_DISPLAY_NAME.to_string(),
        handle: String::new(),
        avatar: avatar_letter(DEFAULT_DISPLAY_NAME),
        city: String::new(),
        contact: String::new(),
        registered_at: Utc::now(),
        rating: DEFAULT_RATING,
        review_count: 0,
    }
}
