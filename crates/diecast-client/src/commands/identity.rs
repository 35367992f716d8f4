use serde::{Deserialize, Serialize};
use tracing::info;

use diecast_shared::identity::PlatformUser;
use diecast_shared::types::UserId;
use diecast_store::{ProfileEdit, User};

use super::{lock, user_message};
use crate::projection::rating_stars;
use crate::state::{AppState, SharedState};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    pub display_name: String,
    pub handle: String,
    pub avatar: String,
    pub city: String,
    pub contact: String,
    pub registered_at: String,
    pub rating: f64,
    pub rating_stars: String,
    pub review_count: u32,
    pub active_listings: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEditDto {
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
}

fn make_user_dto(state: &AppState, user: &User) -> UserDto {
    let active_listings = state
        .catalog
        .products_by_seller(&user.id)
        .iter()
        .filter(|p| p.is_active())
        .count();
    UserDto {
        id: user.id.clone(),
        display_name: user.display_name.clone(),
        handle: user.handle.clone(),
        avatar: user.avatar.clone(),
        city: user.city.clone(),
        contact: user.contact.clone(),
        registered_at: user.registered_at.to_rfc3339(),
        rating: user.rating,
        rating_stars: rating_stars(user.rating),
        review_count: user.review_count,
        active_listings,
    }
}

pub fn current_user(state: &SharedState) -> Result<UserDto, String> {
    let guard = lock(state)?;
    Ok(make_user_dto(&guard, guard.identity.current()))
}

/// Adopt the identity handed over by the host messaging platform.
pub fn login_with_platform(state: &SharedState, platform: PlatformUser) -> Result<UserDto, String> {
    let mut guard = lock(state)?;
    guard.launch_with(&platform).map_err(user_message)?;
    info!(user_id = %guard.identity.current().id, "Signed in through platform");
    Ok(make_user_dto(&guard, guard.identity.current()))
}

pub fn update_profile(state: &SharedState, edit: ProfileEditDto) -> Result<UserDto, String> {
    let mut guard = lock(state)?;
    guard
        .identity
        .update_profile(ProfileEdit {
            display_name: edit.display_name,
            handle: edit.handle,
            city: edit.city,
            contact: edit.contact,
        })
        .map_err(user_message)?;
    Ok(make_user_dto(&guard, guard.identity.current()))
}

/// Sign out. The session continues under a fresh anonymous identity.
pub fn logout(state: &SharedState) -> Result<UserDto, String> {
    let mut guard = lock(state)?;
    // The session has switched users even when the store refused the write.
    let outcome = guard.identity.logout().map(|_| ());
    guard.pending_photos.clear();
    guard.refresh_own_rating();
    outcome.map_err(user_message)?;
    Ok(make_user_dto(&guard, guard.identity.current()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use diecast_shared::identity::PlatformUserId;
    use diecast_shared::MarketError;
    use diecast_store::{KvStore, MemoryBackend};

    use super::*;
    use crate::commands::products::attach_photo;
    use crate::commands::test_state;
    use crate::config::ClientConfig;

    #[test]
    fn platform_login_and_profile_edit() {
        let state = test_state();
        let platform: PlatformUser =
            serde_json::from_str(r#"{"id":42,"username":"diecast_fan","first_name":"Pavel"}"#)
                .unwrap();
        assert_eq!(platform.id, PlatformUserId::Number(42));

        let user = login_with_platform(&state, platform).unwrap();
        assert_eq!(user.id, UserId::from("tg_42"));
        assert_eq!(user.display_name, "Pavel");
        assert_eq!(user.contact, "@diecast_fan");
        assert_eq!(user.rating_stars, "★★★★★ 5.0");

        let err = update_profile(
            &state,
            ProfileEditDto {
                display_name: Some(" ".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, "Name cannot be empty");

        let user = update_profile(
            &state,
            ProfileEditDto {
                city: Some("Samara".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(user.city, "Samara");
    }

    #[test]
    fn logout_issues_new_identity() {
        let state = test_state();
        let before = current_user(&state).unwrap().id;
        let after = logout(&state).unwrap().id;
        assert_ne!(before, after);
        assert_eq!(current_user(&state).unwrap().id, after);
    }

    #[test]
    fn logout_discards_draft_even_when_store_refuses() {
        let backend = MemoryBackend::new();
        let state: SharedState = Arc::new(Mutex::new(AppState::with_store(
            KvStore::new(backend.clone()),
            ClientConfig::default(),
        )));
        let before = current_user(&state).unwrap().id;
        attach_photo(&state, "image/png".into(), vec![1; 4]).unwrap();

        backend.set_quota(Some(0));
        let err = logout(&state).unwrap_err();
        assert_eq!(err, MarketError::StorageUnavailable.to_string());

        let guard = state.lock().unwrap();
        assert!(guard.pending_photos.is_empty());
        assert_ne!(guard.identity.current().id, before);
    }

    #[test]
    fn dto_is_camel_case() {
        let state = test_state();
        let json = serde_json::to_value(current_user(&state).unwrap()).unwrap();
        assert!(json.get("displayName").is_some());
        assert!(json.get("reviewCount").is_some());
        assert!(json.get("display_name").is_none());
    }
}
