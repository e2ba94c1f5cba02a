use sea_orm::{entity::prelude::*, QueryOrder, QuerySelect, Set, DatabaseConnection, ActiveModelTrait, EntityTrait};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const NAME_MAX_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "celebration_msg")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    /// Stored loosely: a JSON array, a JSON string holding an encoded array, or null.
    /// Read it through [`decode_image_urls`].
    pub image_url: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("name must be at most {NAME_MAX_LEN} characters")));
    }
    Ok(())
}

/// Column value written for an image list. Always the native array form.
pub fn encode_image_urls(urls: &[String]) -> Json {
    Json::Array(urls.iter().cloned().map(Json::String).collect())
}

/// Normalize the persisted image list into an ordered sequence of URLs.
///
/// Accepts a JSON array of strings, a JSON string whose content is an encoded
/// array (`"[\"https://...\"]"`), an empty string, or null.
pub fn decode_image_urls(value: Option<&Json>) -> Result<Vec<String>, errors::ModelError> {
    match value {
        None | Some(Json::Null) => Ok(Vec::new()),
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| match item {
                Json::String(url) => Ok(url.clone()),
                other => Err(errors::ModelError::Codec(format!("image url must be a string, got {other}"))),
            })
            .collect(),
        Some(Json::String(encoded)) => {
            if encoded.trim().is_empty() {
                return Ok(Vec::new());
            }
            let urls: Option<Vec<String>> = serde_json::from_str(encoded)
                .map_err(|e| errors::ModelError::Codec(e.to_string()))?;
            Ok(urls.unwrap_or_default())
        }
        Some(other) => Err(errors::ModelError::Codec(format!("unsupported image list representation: {other}"))),
    }
}

pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    name: &str,
    password_hash: &str,
    message: &str,
    image_url: &[String],
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        password_hash: Set(password_hash.to_string()),
        message: Set(message.to_string()),
        image_url: Set(Some(encode_image_urls(image_url))),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Row candidate for a credential check. The password is verified by the caller.
pub async fn find_by_id_and_name(db: &DatabaseConnection, id: i32, name: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .filter(Column::Name.eq(name))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Newest first, scoped to one invitation owner.
pub async fn list_by_user(db: &DatabaseConnection, user_id: i32, offset: u64, limit: u64) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn count_by_user(db: &DatabaseConnection, user_id: i32) -> Result<u64, errors::ModelError> {
    use sea_orm::PaginatorTrait;
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .count(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Replace message text and the whole image list.
pub async fn update_content(db: &DatabaseConnection, found: Model, message: &str, image_url: &[String]) -> Result<Model, errors::ModelError> {
    let mut am: ActiveModel = found.into();
    am.message = Set(message.to_string());
    am.image_url = Set(Some(encode_image_urls(image_url)));
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Returns whether a row was removed.
pub async fn hard_delete(db: &DatabaseConnection, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
