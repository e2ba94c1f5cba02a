use sea_orm::DatabaseConnection;

use models::celebration_msg;

use crate::celebration_msg::domain::{CelebrationMsg, GuestCredential, NewCelebrationMsg, PublicCelebrationMsg};
use crate::celebration_msg::errors::CelebrationMsgError;
use crate::celebration_msg::repository::CelebrationMsgRepository;
use crate::credentials::verify_password;

/// SeaORM-backed repository implementation.
pub struct SeaOrmCelebrationMsgRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCelebrationMsgRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Row matching the credential triple. Name is matched by the query, the
    /// password against the stored hash.
    async fn matching_row(&self, cred: &GuestCredential) -> Result<Option<celebration_msg::Model>, CelebrationMsgError> {
        let row = celebration_msg::find_by_id_and_name(&self.db, cred.id, &cred.name).await?;
        Ok(row.filter(|r| verify_password(&cred.password, &r.password_hash)))
    }

    async fn page(&self, user_id: i32, offset: u64, limit: u64) -> Result<Vec<CelebrationMsg>, CelebrationMsgError> {
        celebration_msg::list_by_user(&self.db, user_id, offset, limit)
            .await?
            .into_iter()
            .map(|m| CelebrationMsg::try_from(m).map_err(CelebrationMsgError::from))
            .collect()
    }
}

#[async_trait::async_trait]
impl CelebrationMsgRepository for SeaOrmCelebrationMsgRepository {
    async fn list_by_owner(&self, user_id: i32, offset: u64, limit: u64) -> Result<Vec<CelebrationMsg>, CelebrationMsgError> {
        self.page(user_id, offset, limit).await
    }

    async fn count_by_owner(&self, user_id: i32) -> Result<u64, CelebrationMsgError> {
        Ok(celebration_msg::count_by_user(&self.db, user_id).await?)
    }

    async fn list_public(&self, user_id: i32, offset: u64, limit: u64) -> Result<Vec<PublicCelebrationMsg>, CelebrationMsgError> {
        Ok(self.page(user_id, offset, limit).await?.into_iter().map(PublicCelebrationMsg::from).collect())
    }

    async fn count_public(&self, user_id: i32) -> Result<u64, CelebrationMsgError> {
        Ok(celebration_msg::count_by_user(&self.db, user_id).await?)
    }

    async fn find_by_credential(&self, cred: &GuestCredential) -> Result<Option<CelebrationMsg>, CelebrationMsgError> {
        match self.matching_row(cred).await? {
            Some(row) => Ok(Some(CelebrationMsg::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, new: NewCelebrationMsg) -> Result<CelebrationMsg, CelebrationMsgError> {
        let created = celebration_msg::create(&self.db, new.user_id, &new.name, &new.password_hash, &new.message, &new.image_url).await?;
        Ok(CelebrationMsg::try_from(created)?)
    }

    async fn update_by_credential(&self, cred: &GuestCredential, message: &str, image_url: &[String]) -> Result<Option<CelebrationMsg>, CelebrationMsgError> {
        let Some(row) = self.matching_row(cred).await? else { return Ok(None) };
        let updated = celebration_msg::update_content(&self.db, row, message, image_url).await?;
        Ok(Some(CelebrationMsg::try_from(updated)?))
    }

    async fn delete_by_credential(&self, cred: &GuestCredential) -> Result<bool, CelebrationMsgError> {
        let Some(row) = self.matching_row(cred).await? else { return Ok(false) };
        Ok(celebration_msg::hard_delete(&self.db, row.id).await?)
    }

    async fn delete_by_id(&self, id: i32) -> Result<Option<CelebrationMsg>, CelebrationMsgError> {
        use sea_orm::EntityTrait;
        let found = celebration_msg::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(CelebrationMsgError::store)?;
        let Some(row) = found else { return Ok(None) };
        if !celebration_msg::hard_delete(&self.db, id).await? {
            // Removed concurrently between the lookup and the delete.
            return Ok(None);
        }
        Ok(Some(CelebrationMsg::try_from(row)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::cheap_hasher;
    use crate::test_support::get_db;
    use sea_orm::{ActiveModelTrait, Set};
    use serde_json::json;

    fn new_msg(user_id: i32, name: &str, password: &str, images: &[&str]) -> NewCelebrationMsg {
        NewCelebrationMsg {
            user_id,
            name: name.into(),
            password_hash: cheap_hasher().hash(password).unwrap(),
            message: format!("congrats from {name}"),
            image_url: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn crud_round_trip_with_credentials() -> Result<(), anyhow::Error> {
        let repo = SeaOrmCelebrationMsgRepository::new(get_db().await?);

        let created = repo.create(new_msg(1, "Minji", "pw1", &["https://s3/x/a.jpg"])).await?;
        assert_eq!(created.image_url, vec!["https://s3/x/a.jpg"]);

        let good = GuestCredential::new(created.id, "Minji", "pw1");
        assert!(repo.find_by_credential(&good).await?.is_some());
        assert!(repo.find_by_credential(&GuestCredential::new(created.id, "minji", "pw1")).await?.is_none());
        assert!(repo.find_by_credential(&GuestCredential::new(created.id, "Minji", "pw2")).await?.is_none());
        assert!(repo.find_by_credential(&GuestCredential::new(created.id + 1, "Minji", "pw1")).await?.is_none());

        let updated = repo
            .update_by_credential(&good, "edited", &["https://s3/x/b.jpg".to_string()])
            .await?
            .expect("credential matches");
        assert_eq!(updated.message, "edited");
        assert_eq!(updated.image_url, vec!["https://s3/x/b.jpg"]);

        assert!(!repo.delete_by_credential(&GuestCredential::new(created.id, "Minji", "nope")).await?);
        assert!(repo.delete_by_credential(&good).await?);
        assert!(repo.find_by_credential(&good).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_scoped_to_owner() -> Result<(), anyhow::Error> {
        let repo = SeaOrmCelebrationMsgRepository::new(get_db().await?);
        for i in 0..7 {
            repo.create(new_msg(10, &format!("guest{i}"), "pw", &[])).await?;
        }
        repo.create(new_msg(11, "stranger", "pw", &[])).await?;

        assert_eq!(repo.count_by_owner(10).await?, 7);
        assert_eq!(repo.count_public(10).await?, 7);
        assert_eq!(repo.count_by_owner(11).await?, 1);

        let first = repo.list_by_owner(10, 0, 5).await?;
        let second = repo.list_by_owner(10, 5, 5).await?;
        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 2);
        assert!(first.iter().chain(second.iter()).all(|m| m.user_id == 10));

        let mut ids: Vec<i32> = first.iter().chain(second.iter()).map(|m| m.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 7);

        let public = repo.list_public(10, 5, 5).await?;
        assert_eq!(public.len(), 2);
        assert!(repo.list_public(10, 20, 5).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn string_encoded_image_column_is_normalized() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let now = chrono::Utc::now().fixed_offset();
        let row = celebration_msg::ActiveModel {
            user_id: Set(3),
            name: Set("Legacy".into()),
            password_hash: Set(cheap_hasher().hash("pw").unwrap()),
            message: Set("from the old schema".into()),
            image_url: Set(Some(json!(r#"["https://s3/x/a.jpg","https://s3/x/b.jpg"]"#))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let repo = SeaOrmCelebrationMsgRepository::new(db);
        let found = repo
            .find_by_credential(&GuestCredential::new(row.id, "Legacy", "pw"))
            .await?
            .expect("row exists");
        assert_eq!(found.image_url, vec!["https://s3/x/a.jpg", "https://s3/x/b.jpg"]);
        Ok(())
    }

    #[tokio::test]
    async fn admin_delete_returns_removed_row_once() -> Result<(), anyhow::Error> {
        let repo = SeaOrmCelebrationMsgRepository::new(get_db().await?);
        let created = repo.create(new_msg(5, "Bora", "pw", &[])).await?;
        let removed = repo.delete_by_id(created.id).await?;
        assert_eq!(removed.map(|m| m.id), Some(created.id));
        assert!(repo.delete_by_id(created.id).await?.is_none());
        Ok(())
    }
}
