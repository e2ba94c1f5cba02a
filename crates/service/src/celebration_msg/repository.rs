use async_trait::async_trait;

use super::domain::{CelebrationMsg, GuestCredential, NewCelebrationMsg, PublicCelebrationMsg};
use super::errors::CelebrationMsgError;

/// Repository abstraction for celebration message persistence.
///
/// Every listing and count is scoped to one invitation owner. Credential
/// operations match `(id, name, password)` exactly; a mismatch on any field
/// is absence, not an error.
#[async_trait]
pub trait CelebrationMsgRepository: Send + Sync {
    async fn list_by_owner(&self, user_id: i32, offset: u64, limit: u64) -> Result<Vec<CelebrationMsg>, CelebrationMsgError>;
    async fn count_by_owner(&self, user_id: i32) -> Result<u64, CelebrationMsgError>;

    async fn list_public(&self, user_id: i32, offset: u64, limit: u64) -> Result<Vec<PublicCelebrationMsg>, CelebrationMsgError>;
    async fn count_public(&self, user_id: i32) -> Result<u64, CelebrationMsgError>;

    async fn find_by_credential(&self, cred: &GuestCredential) -> Result<Option<CelebrationMsg>, CelebrationMsgError>;
    async fn create(&self, new: NewCelebrationMsg) -> Result<CelebrationMsg, CelebrationMsgError>;
    /// Replace message text and the whole image list.
    async fn update_by_credential(&self, cred: &GuestCredential, message: &str, image_url: &[String]) -> Result<Option<CelebrationMsg>, CelebrationMsgError>;
    async fn delete_by_credential(&self, cred: &GuestCredential) -> Result<bool, CelebrationMsgError>;
    /// Unconditional removal; returns the removed row if there was one.
    async fn delete_by_id(&self, id: i32) -> Result<Option<CelebrationMsg>, CelebrationMsgError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, PoisonError};

    use chrono::{Duration, Utc};
    use models::celebration_msg::{encode_image_urls, Model};

    use crate::credentials::verify_password;

    /// Rows are kept in their persisted shape so image lists go through the
    /// same column codec as the database.
    #[derive(Default)]
    pub struct MockCelebrationMsgRepository {
        rows: Mutex<Vec<Model>>,
        next_id: AtomicUsize,
        writes: AtomicUsize,
        failing: AtomicBool,
    }

    impl MockCelebrationMsgRepository {
        /// Every subsequent call fails with a store error until reset.
        pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

        /// Number of successful create/update/delete calls.
        pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

        /// Insert a row as-is, e.g. with a JSON-encoded string image column.
        pub fn insert_raw(&self, row: Model) {
            self.next_id.fetch_max(row.id as usize, Ordering::SeqCst);
            self.lock().push(row);
        }

        /// Persisted row, bypassing credentials.
        pub fn raw(&self, id: i32) -> Option<Model> { self.lock().iter().find(|r| r.id == id).cloned() }

        fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Model>> {
            self.rows.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn check(&self) -> Result<(), CelebrationMsgError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(CelebrationMsgError::store("connection refused"));
            }
            Ok(())
        }

        fn page(&self, user_id: i32, offset: u64, limit: u64) -> Result<Vec<CelebrationMsg>, CelebrationMsgError> {
            let mut rows: Vec<Model> = self.lock().iter().filter(|r| r.user_id == user_id).cloned().collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            rows.into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|r| CelebrationMsg::try_from(r).map_err(CelebrationMsgError::from))
                .collect()
        }

        fn position(rows: &[Model], cred: &GuestCredential) -> Option<usize> {
            rows.iter()
                .position(|r| r.id == cred.id && r.name == cred.name && verify_password(&cred.password, &r.password_hash))
        }
    }

    #[async_trait]
    impl CelebrationMsgRepository for MockCelebrationMsgRepository {
        async fn list_by_owner(&self, user_id: i32, offset: u64, limit: u64) -> Result<Vec<CelebrationMsg>, CelebrationMsgError> {
            self.check()?;
            self.page(user_id, offset, limit)
        }

        async fn count_by_owner(&self, user_id: i32) -> Result<u64, CelebrationMsgError> {
            self.check()?;
            Ok(self.lock().iter().filter(|r| r.user_id == user_id).count() as u64)
        }

        async fn list_public(&self, user_id: i32, offset: u64, limit: u64) -> Result<Vec<PublicCelebrationMsg>, CelebrationMsgError> {
            self.check()?;
            Ok(self.page(user_id, offset, limit)?.into_iter().map(PublicCelebrationMsg::from).collect())
        }

        async fn count_public(&self, user_id: i32) -> Result<u64, CelebrationMsgError> {
            self.count_by_owner(user_id).await
        }

        async fn find_by_credential(&self, cred: &GuestCredential) -> Result<Option<CelebrationMsg>, CelebrationMsgError> {
            self.check()?;
            let rows = self.lock();
            match Self::position(&rows, cred) {
                Some(i) => Ok(Some(CelebrationMsg::try_from(rows[i].clone())?)),
                None => Ok(None),
            }
        }

        async fn create(&self, new: NewCelebrationMsg) -> Result<CelebrationMsg, CelebrationMsgError> {
            self.check()?;
            models::celebration_msg::validate_name(&new.name)?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
            // Strictly increasing timestamps keep newest-first ordering deterministic.
            let now = (Utc::now() + Duration::microseconds(id as i64)).fixed_offset();
            let row = Model {
                id,
                user_id: new.user_id,
                name: new.name,
                password_hash: new.password_hash,
                message: new.message,
                image_url: Some(encode_image_urls(&new.image_url)),
                created_at: now,
                updated_at: now,
            };
            self.lock().push(row.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(CelebrationMsg::try_from(row)?)
        }

        async fn update_by_credential(&self, cred: &GuestCredential, message: &str, image_url: &[String]) -> Result<Option<CelebrationMsg>, CelebrationMsgError> {
            self.check()?;
            let mut rows = self.lock();
            let Some(i) = Self::position(&rows, cred) else { return Ok(None) };
            let row = &mut rows[i];
            row.message = message.to_string();
            row.image_url = Some(encode_image_urls(image_url));
            row.updated_at = Utc::now().fixed_offset();
            let updated = row.clone();
            drop(rows);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(Some(CelebrationMsg::try_from(updated)?))
        }

        async fn delete_by_credential(&self, cred: &GuestCredential) -> Result<bool, CelebrationMsgError> {
            self.check()?;
            let mut rows = self.lock();
            let Some(i) = Self::position(&rows, cred) else { return Ok(false) };
            rows.remove(i);
            drop(rows);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn delete_by_id(&self, id: i32) -> Result<Option<CelebrationMsg>, CelebrationMsgError> {
            self.check()?;
            let mut rows = self.lock();
            let Some(i) = rows.iter().position(|r| r.id == id) else { return Ok(None) };
            let removed = rows.remove(i);
            drop(rows);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(Some(CelebrationMsg::try_from(removed)?))
        }
    }
}
