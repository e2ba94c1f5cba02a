use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::{
    CelebrationMsg, CreateCelebrationMsgInput, GuestCredential, NewCelebrationMsg, PublicCelebrationMsg,
    UpdateCelebrationMsgInput, UpdatedCelebrationMsg,
};
use super::errors::CelebrationMsgError;
use super::repository::CelebrationMsgRepository;
use crate::blob::BlobStore;
use crate::credentials::CredentialHasher;
use crate::pagination::{total_pages, Page, Pagination};

/// Celebration message service configuration
#[derive(Clone, Debug)]
pub struct CelebrationMsgConfig {
    /// Upper bound on images attached at creation.
    pub max_images: usize,
}

impl Default for CelebrationMsgConfig {
    fn default() -> Self { Self { max_images: 10 } }
}

impl From<&configs::CelebrationConfig> for CelebrationMsgConfig {
    fn from(cfg: &configs::CelebrationConfig) -> Self { Self { max_images: cfg.max_images } }
}

/// Images present before an edit and absent from the submitted list.
///
/// Set difference by exact string: order and duplicates in either list do not
/// matter, each orphan is reported once in its original order.
pub fn orphaned_images(previous: &[String], submitted: &[String]) -> Vec<String> {
    let keep: HashSet<&str> = submitted.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    previous
        .iter()
        .filter(|url| !keep.contains(url.as_str()) && seen.insert(url.as_str()))
        .cloned()
        .collect()
}

/// Guest message workflows independent of web framework.
///
/// Talks to the store for data and to the blob store only when an edit drops
/// images.
pub struct CelebrationMsgService<R: CelebrationMsgRepository, B: BlobStore> {
    repo: Arc<R>,
    blobs: Arc<B>,
    cfg: CelebrationMsgConfig,
    hasher: CredentialHasher,
}

impl<R: CelebrationMsgRepository, B: BlobStore> CelebrationMsgService<R, B> {
    pub fn new(repo: Arc<R>, blobs: Arc<B>, cfg: CelebrationMsgConfig) -> Self {
        Self { repo, blobs, cfg, hasher: CredentialHasher::default() }
    }

    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self
    }

    fn window(user_id: i32, opts: Pagination) -> Result<(u64, u64), CelebrationMsgError> {
        if user_id <= 0 {
            return Err(CelebrationMsgError::Validation(format!("invalid user id {user_id}")));
        }
        opts.window()
            .ok_or_else(|| CelebrationMsgError::Validation("page and size must be at least 1".into()))
    }

    /// Owner-facing page of messages for one invitation, newest first.
    ///
    /// Pages past the end come back empty with correct totals.
    #[instrument(skip(self), fields(user_id = %user_id, page = opts.page, size = opts.per_page))]
    pub async fn list_for_owner(&self, user_id: i32, opts: Pagination) -> Result<Page<CelebrationMsg>, CelebrationMsgError> {
        let (offset, limit) = Self::window(user_id, opts)?;
        let ctx = || format!("failed to load celebration messages for user {user_id}");

        let items = self.repo.list_by_owner(user_id, offset, limit).await.map_err(|e| e.context(ctx))?;
        let total_items = self.repo.count_by_owner(user_id).await.map_err(|e| e.context(ctx))?;
        debug!(returned = items.len(), total_items, "owner_listing");

        Ok(Page { items, total_items, total_pages: total_pages(total_items, opts.per_page) })
    }

    /// Guest-facing page: same contract as [`Self::list_for_owner`], public fields only.
    #[instrument(skip(self), fields(user_id = %user_id, page = opts.page, size = opts.per_page))]
    pub async fn list_for_guest(&self, user_id: i32, opts: Pagination) -> Result<Page<PublicCelebrationMsg>, CelebrationMsgError> {
        let (offset, limit) = Self::window(user_id, opts)?;
        let ctx = || format!("failed to load celebration messages for user {user_id}");

        let items = self.repo.list_public(user_id, offset, limit).await.map_err(|e| e.context(ctx))?;
        let total_items = self.repo.count_public(user_id).await.map_err(|e| e.context(ctx))?;
        debug!(returned = items.len(), total_items, "guest_listing");

        Ok(Page { items, total_items, total_pages: total_pages(total_items, opts.per_page) })
    }

    /// The guest's own message, or `None` when the credential matches nothing.
    #[instrument(skip(self, cred), fields(id = cred.id))]
    pub async fn find_mine(&self, cred: &GuestCredential) -> Result<Option<CelebrationMsg>, CelebrationMsgError> {
        self.repo
            .find_by_credential(cred)
            .await
            .map_err(|e| e.context(|| format!("failed to load celebration message (id: {}, name: {})", cred.id, cred.name)))
    }

    /// Post a new message. Images are already uploaded; only their URLs are stored.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::blob::mock::RecordingBlobStore;
    /// use service::celebration_msg::{CelebrationMsgConfig, CelebrationMsgService};
    /// use service::celebration_msg::domain::CreateCelebrationMsgInput;
    /// use service::celebration_msg::repository::mock::MockCelebrationMsgRepository;
    ///
    /// let svc = CelebrationMsgService::new(
    ///     Arc::new(MockCelebrationMsgRepository::default()),
    ///     Arc::new(RecordingBlobStore::default()),
    ///     CelebrationMsgConfig::default(),
    /// );
    /// let input = CreateCelebrationMsgInput {
    ///     user_id: 1,
    ///     name: "Minji".into(),
    ///     password: "1234".into(),
    ///     message: "Congratulations!".into(),
    ///     image_url: vec!["https://s3/x/a.jpg".into()],
    /// };
    /// let created = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(created.image_url.len(), 1);
    /// ```
    #[instrument(skip(self, input), fields(user_id = %input.user_id, images = input.image_url.len()))]
    pub async fn create(&self, input: CreateCelebrationMsgInput) -> Result<CelebrationMsg, CelebrationMsgError> {
        if input.image_url.len() > self.cfg.max_images {
            return Err(CelebrationMsgError::Validation(format!(
                "at most {} images per message, got {}",
                self.cfg.max_images,
                input.image_url.len()
            )));
        }
        if input.user_id <= 0 {
            return Err(CelebrationMsgError::Validation(format!("invalid user id {}", input.user_id)));
        }
        if input.name.trim().is_empty() || input.password.trim().is_empty() {
            return Err(CelebrationMsgError::Validation("name and password are required".into()));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let new = NewCelebrationMsg {
            user_id: input.user_id,
            name: input.name,
            password_hash,
            message: input.message,
            image_url: input.image_url,
        };
        let created = self
            .repo
            .create(new)
            .await
            .map_err(|e| e.context(|| "failed to create celebration message".to_string()))?;
        info!(id = created.id, user_id = created.user_id, "celebration_msg_created");
        Ok(created)
    }

    /// Replace a guest's message and reconcile its images.
    ///
    /// The submitted list is the full desired list. The row is persisted
    /// first, then every image that was attached before and is absent now is
    /// deleted from the blob store. Blob failures never fail the update; their
    /// keys come back in `failed_blob_keys`.
    #[instrument(skip(self, cred, input), fields(id = cred.id, images = input.image_url.len()))]
    pub async fn update(&self, cred: &GuestCredential, input: UpdateCelebrationMsgInput) -> Result<UpdatedCelebrationMsg, CelebrationMsgError> {
        let ctx = || format!("failed to update celebration message (id: {}, name: {})", cred.id, cred.name);
        let not_found = || CelebrationMsgError::NotFound(format!("{}: no message matches the given credentials", ctx()));

        let existing = self
            .repo
            .find_by_credential(cred)
            .await
            .map_err(|e| e.context(ctx))?
            .ok_or_else(not_found)?;

        let orphaned = orphaned_images(&existing.image_url, &input.image_url);

        let message = self
            .repo
            .update_by_credential(cred, &input.message, &input.image_url)
            .await
            .map_err(|e| e.context(ctx))?
            // Deleted between lookup and update
            .ok_or_else(not_found)?;

        let failed_blob_keys = self.purge_images(&orphaned).await;
        info!(
            id = message.id,
            removed_images = orphaned.len(),
            failed_deletes = failed_blob_keys.len(),
            "celebration_msg_updated"
        );
        Ok(UpdatedCelebrationMsg { message, failed_blob_keys })
    }

    /// Sequential best-effort deletes. Returns the keys that failed.
    async fn purge_images(&self, urls: &[String]) -> Vec<String> {
        let mut failed = Vec::new();
        for url in urls {
            let Some(key) = self.blobs.extract_key(url) else {
                debug!(%url, "image url has no blob key; skipping");
                continue;
            };
            match self.blobs.delete(&key).await {
                Ok(()) => info!(%key, "orphaned_image_deleted"),
                Err(e) => {
                    warn!(%key, error = %e, "orphaned_image_delete_failed");
                    failed.push(key);
                }
            }
        }
        failed
    }

    /// Remove the guest's own message. Attached images are left in the blob store.
    #[instrument(skip(self, cred), fields(id = cred.id))]
    pub async fn delete_mine(&self, cred: &GuestCredential) -> Result<bool, CelebrationMsgError> {
        let removed = self
            .repo
            .delete_by_credential(cred)
            .await
            .map_err(|e| e.context(|| format!("failed to delete celebration message (id: {}, name: {})", cred.id, cred.name)))?;
        if removed {
            info!(id = cred.id, "celebration_msg_deleted");
        }
        Ok(removed)
    }

    /// Privileged removal by id alone. `false` when there was nothing to remove.
    #[instrument(skip(self))]
    pub async fn delete_by_admin(&self, id: i32) -> Result<bool, CelebrationMsgError> {
        info!(id, "admin_delete_attempt");
        let removed = self
            .repo
            .delete_by_id(id)
            .await
            .map_err(|e| e.context(|| format!("failed to delete celebration message as admin (id: {id})")))?;
        match removed {
            Some(_) => {
                info!(id, "admin_delete_succeeded");
                Ok(true)
            }
            None => {
                info!(id, "admin_delete_nothing_to_remove");
                Ok(false)
            }
        }
    }
}
