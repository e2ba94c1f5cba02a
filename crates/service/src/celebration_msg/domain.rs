use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use models::errors::ModelError;

/// Guest submission as received from the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCelebrationMsgInput {
    pub user_id: i32,
    pub name: String,
    pub password: String,
    pub message: String,
    #[serde(default)]
    pub image_url: Vec<String>,
}

/// Replacement content for a guest's own message. The image list is the full
/// desired list, not a delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCelebrationMsgInput {
    pub message: String,
    #[serde(default)]
    pub image_url: Vec<String>,
}

/// Capability proving authorship of one message: all three fields must match.
#[derive(Clone, Serialize, Deserialize)]
pub struct GuestCredential {
    pub id: i32,
    pub name: String,
    pub password: String,
}

impl GuestCredential {
    pub fn new(id: i32, name: impl Into<String>, password: impl Into<String>) -> Self {
        Self { id, name: name.into(), password: password.into() }
    }
}

impl std::fmt::Debug for GuestCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestCredential")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Store payload for a new message; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCelebrationMsg {
    pub user_id: i32,
    pub name: String,
    pub password_hash: String,
    pub message: String,
    pub image_url: Vec<String>,
}

/// Owner-facing view of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelebrationMsg {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub message: String,
    pub image_url: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Guest-facing view of a message: nothing beyond what the invitation page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicCelebrationMsg {
    pub id: i32,
    pub name: String,
    pub message: String,
    pub image_url: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
}

/// Result of an update. `failed_blob_keys` lists orphaned images whose
/// deletion failed and can be retried; the update itself succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedCelebrationMsg {
    pub message: CelebrationMsg,
    pub failed_blob_keys: Vec<String>,
}

impl TryFrom<models::celebration_msg::Model> for CelebrationMsg {
    type Error = ModelError;

    fn try_from(m: models::celebration_msg::Model) -> Result<Self, Self::Error> {
        let image_url = models::celebration_msg::decode_image_urls(m.image_url.as_ref())?;
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            message: m.message,
            image_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl From<CelebrationMsg> for PublicCelebrationMsg {
    fn from(m: CelebrationMsg) -> Self {
        Self { id: m.id, name: m.name, message: m.message, image_url: m.image_url, created_at: m.created_at }
    }
}
