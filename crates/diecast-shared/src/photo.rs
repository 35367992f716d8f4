//! Photo attachments for new listings.
//!
//! Every file is checked on attach, before it joins the pending set: MIME type
//! against [`ALLOWED_PHOTO_TYPES`], size against [`MAX_PHOTO_SIZE`], and the
//! set itself never holds more than [`MAX_PHOTOS`] entries.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::constants::{ALLOWED_PHOTO_TYPES, MAX_PHOTOS, MAX_PHOTO_SIZE};
use crate::error::ValidationError;

/// A single photo file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl PhotoAttachment {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mime = self.mime.trim().to_ascii_lowercase();
        if !ALLOWED_PHOTO_TYPES.contains(&mime.as_str()) {
            return Err(ValidationError::UnsupportedPhotoType(self.mime.clone()));
        }
        if self.bytes.len() > MAX_PHOTO_SIZE {
            return Err(ValidationError::PhotoTooLarge {
                size: self.bytes.len(),
                max: MAX_PHOTO_SIZE,
            });
        }
        Ok(())
    }

    /// Encode as a `data:` URI, the format kept in the photo blob store.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime.trim().to_ascii_lowercase(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Photos attached to a listing draft that has not been published yet.
///
/// Dropping the value discards the draft's photos.
#[derive(Debug, Clone, Default)]
pub struct PendingPhotos {
    items: Vec<PhotoAttachment>,
}

impl PendingPhotos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a photo. Returns the new number of pending photos.
    ///
    /// A fourth photo is rejected with [`ValidationError::PhotoLimitReached`];
    /// existing entries are never replaced.
    pub fn attach(&mut self, photo: PhotoAttachment) -> Result<usize, ValidationError> {
        if self.items.len() >= MAX_PHOTOS {
            return Err(ValidationError::PhotoLimitReached);
        }
        photo.validate()?;
        self.items.push(photo);
        Ok(self.items.len())
    }

    pub fn remove(&mut self, index: usize) -> Option<PhotoAttachment> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn data_uris(&self) -> Vec<String> {
        self.items.iter().map(PhotoAttachment::to_data_uri).collect()
    }
}
