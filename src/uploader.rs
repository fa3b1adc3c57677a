//! # Upload Orchestrator
//!
//! Turns a batch of picked files into stored image references.
//!
//! ## Batch Lifecycle
//!
//! ```text
//! Idle → (validate → upload) per file, in selection order → Idle
//! ```
//!
//! Files are handled one at a time: each storage call is awaited before the
//! next file is looked at, which keeps progress and error order identical to
//! selection order. A batch cannot be cancelled once started.
//!
//! ## Capacity
//!
//! An owner already at its limit gets a notice and nothing else happens. An
//! owner with some room left gets as many files as fit; the rest of the
//! selection is dropped without a message.

use crate::config::Config;
use crate::log_data;
use crate::logging::Logger;
use crate::middleware::ValidationMiddleware;
use crate::models::{BatchOutcome, ImageFile, UploadSession};
use crate::owner::OwnerId;
use crate::constants::{PROGRESS_DONE, PROGRESS_STARTED};
use crate::storage::ImageStorage;

/// Called with the session after every state change.
pub type ProgressObserver<'a> = Box<dyn FnMut(&UploadSession) + 'a>;

pub struct ImageUploader<'a, S: ImageStorage + ?Sized> {
    storage: &'a S,
    config: &'a Config,
    logger: Logger,
    session: UploadSession,
    observer: Option<ProgressObserver<'a>>,
}

impl<'a, S: ImageStorage + ?Sized> ImageUploader<'a, S> {
    pub fn new(storage: &'a S, config: &'a Config, logger: Logger) -> Self {
        Self {
            storage,
            config,
            logger,
            session: UploadSession::new(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl FnMut(&UploadSession) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    /// Whether a new selection may be started. False while a batch runs.
    pub fn select_enabled(&self) -> bool {
        !self.session.is_in_flight()
    }

    /// Runs one batch.
    ///
    /// `on_images_change` receives `images` followed by every newly stored
    /// reference, exactly once, unless the owner was already at `max_images`.
    /// Validation and storage failures never escape; they end up in the
    /// returned error list and in the session.
    pub async fn handle_file_select<F>(
        &mut self,
        files: Vec<ImageFile>,
        images: &[String],
        max_images: usize,
        owner: &OwnerId,
        on_images_change: F,
    ) -> BatchOutcome
    where
        F: FnOnce(Vec<String>),
    {
        if images.len() >= max_images {
            let notice = format!("Je kunt maximaal {max_images} afbeeldingen uploaden.");
            self.logger.warn(
                "Batch rejected, owner at capacity",
                log_data!("owner" => owner.as_str(), "max_images" => max_images),
            );
            return BatchOutcome::AtCapacity { notice };
        }

        self.session.begin();
        self.notify();
        self.logger.info(
            "Batch started",
            log_data!("owner" => owner.as_str(), "files" => files.len(), "current" => images.len()),
        );

        let mut stored: Vec<String> = Vec::new();
        for file in files {
            if images.len() + stored.len() >= max_images {
                break;
            }
            if let Some(url) = self.process_file(&file, owner).await {
                stored.push(url);
            }
        }

        let count = stored.len();
        let mut updated = Vec::with_capacity(images.len() + count);
        updated.extend_from_slice(images);
        updated.extend(stored);
        on_images_change(updated);

        let errors = self.session.errors().to_vec();
        self.session.finish();
        self.notify();
        self.logger.info(
            "Batch finished",
            log_data!("owner" => owner.as_str(), "stored" => count, "errors" => errors.len()),
        );

        BatchOutcome::Completed {
            stored: count,
            errors,
        }
    }

    async fn process_file(&mut self, file: &ImageFile, owner: &OwnerId) -> Option<String> {
        if let Err(failure) =
            ValidationMiddleware::validate_image_file(&file.content_type, file.size, self.config)
        {
            self.session.push_error(&file.name, &failure.to_string());
            self.notify();
            return None;
        }

        self.session.set_progress(&file.name, PROGRESS_STARTED);
        self.notify();

        match self.storage.upload_image(file, owner).await {
            Ok(url) => {
                self.session.set_progress(&file.name, PROGRESS_DONE);
                self.notify();
                Some(url)
            }
            Err(err) => {
                self.logger.error(
                    "Error processing file",
                    log_data!("file" => file.name.as_str(), "error" => err.to_string()),
                );
                self.session.push_error(&file.name, err.user_reason());
                self.notify();
                None
            }
        }
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.session);
        }
    }
}

/// Returns `images` without the entry at `index`. Out-of-range indexes leave
/// the list unchanged.
pub fn remove_image(images: &[String], index: usize) -> Vec<String> {
    images
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, image)| image.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorageError;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory storage that records every call.
    #[derive(Default)]
    struct MemoryStorage {
        calls: RefCell<Vec<(String, String)>>,
        failures: HashMap<String, StorageError>,
    }

    impl MemoryStorage {
        fn failing(name: &str, err: StorageError) -> Self {
            let mut storage = Self::default();
            storage.failures.insert(name.to_string(), err);
            storage
        }

        fn uploaded(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(name, _)| name.clone()).collect()
        }
    }

    #[async_trait(?Send)]
    impl ImageStorage for MemoryStorage {
        async fn upload_image(
            &self,
            file: &ImageFile,
            owner: &OwnerId,
        ) -> Result<String, StorageError> {
            self.calls
                .borrow_mut()
                .push((file.name.clone(), owner.to_string()));
            match self.failures.get(&file.name) {
                Some(err) => Err(err.clone()),
                None => Ok(format!("https://cdn.test/{}/{}", owner, file.name)),
            }
        }
    }

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", vec![0u8; 16])
    }

    fn refs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn owner() -> OwnerId {
        OwnerId::Persistent("p1".to_string())
    }

    fn run(
        storage: &MemoryStorage,
        files: Vec<ImageFile>,
        images: &[String],
        max: usize,
    ) -> (BatchOutcome, Option<Vec<String>>, Vec<usize>) {
        let config = Config::default();
        let mut received = None;
        let mut calls = 0;
        let mut progress_lens = Vec::new();
        let outcome = {
            let mut uploader = ImageUploader::new(storage, &config, Logger::new("test"))
                .with_observer(|session: &UploadSession| progress_lens.push(session.progress().len()));
            block_on(uploader.handle_file_select(files, images, max, &owner(), |list| {
                calls += 1;
                received = Some(list);
            }))
        };
        assert!(calls <= 1);
        (outcome, received, progress_lens)
    }

    #[test]
    fn appends_new_references_in_selection_order() {
        let storage = MemoryStorage::default();
        let current = refs(&["A", "B"]);
        let (outcome, received, _) =
            run(&storage, vec![png("x.png"), png("y.png"), png("z.png")], &current, 5);

        assert_eq!(
            received.unwrap(),
            refs(&[
                "A",
                "B",
                "https://cdn.test/p1/x.png",
                "https://cdn.test/p1/y.png",
                "https://cdn.test/p1/z.png",
            ])
        );
        assert_eq!(
            outcome,
            BatchOutcome::Completed {
                stored: 3,
                errors: vec![]
            }
        );
    }

    #[test]
    fn at_capacity_rejects_without_callback() {
        let storage = MemoryStorage::default();
        let current = refs(&["A", "B"]);
        let (outcome, received, observed) = run(&storage, vec![png("x.png")], &current, 2);

        assert_eq!(
            outcome,
            BatchOutcome::AtCapacity {
                notice: "Je kunt maximaal 2 afbeeldingen uploaden.".to_string()
            }
        );
        assert!(received.is_none());
        assert!(storage.uploaded().is_empty());
        assert!(observed.is_empty());
    }

    #[test]
    fn truncates_silently_past_remaining_capacity() {
        // the gif past capacity would fail validation if it were looked at
        let storage = MemoryStorage::default();
        let current = refs(&["A"]);
        let files = vec![
            png("x.png"),
            png("y.png"),
            ImageFile::new("late.gif", "image/gif", vec![1]),
        ];
        let (outcome, received, _) = run(&storage, files, &current, 3);

        assert_eq!(received.unwrap().len(), 3);
        assert_eq!(storage.uploaded(), ["x.png", "y.png"]);
        assert_eq!(
            outcome,
            BatchOutcome::Completed {
                stored: 2,
                errors: vec![]
            }
        );
    }

    #[test]
    fn invalid_type_is_reported_and_not_uploaded() {
        let storage = MemoryStorage::default();
        let files = vec![
            ImageFile::new("doc.pdf", "application/pdf", vec![1, 2, 3]),
            png("ok.png"),
        ];
        let (outcome, received, _) = run(&storage, files, &refs(&["A"]), 5);

        assert_eq!(storage.uploaded(), ["ok.png"]);
        assert_eq!(received.unwrap(), refs(&["A", "https://cdn.test/p1/ok.png"]));
        match outcome {
            BatchOutcome::Completed { stored, errors } => {
                assert_eq!(stored, 1);
                assert_eq!(
                    errors,
                    ["doc.pdf: Alleen JPG, PNG en WebP afbeeldingen zijn toegestaan"]
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn oversized_file_is_reported_and_not_uploaded() {
        let storage = MemoryStorage::default();
        let mut big = png("big.png");
        big.size = Config::default().max_file_size + 1;
        let (outcome, received, _) = run(&storage, vec![big], &[], 5);

        assert!(storage.uploaded().is_empty());
        assert_eq!(received.unwrap(), Vec::<String>::new());
        assert_eq!(
            outcome,
            BatchOutcome::Completed {
                stored: 0,
                errors: vec!["big.png: Bestand is te groot (maximaal 5MB)".to_string()]
            }
        );
    }

    #[test]
    fn storage_errors_name_the_file() {
        let storage = MemoryStorage::failing("bad.png", StorageError::Rejected("Bucket vol".into()));
        let (outcome, received, _) =
            run(&storage, vec![png("bad.png"), png("good.png")], &refs(&["A"]), 5);

        assert_eq!(received.unwrap(), refs(&["A", "https://cdn.test/p1/good.png"]));
        assert_eq!(
            outcome,
            BatchOutcome::Completed {
                stored: 1,
                errors: vec!["bad.png: Bucket vol".to_string()]
            }
        );
    }

    #[test]
    fn storage_faults_use_generic_message() {
        let storage = MemoryStorage::failing("bad.png", StorageError::Fault("boom".into()));
        let (outcome, _, _) = run(&storage, vec![png("bad.png")], &[], 5);

        assert_eq!(
            outcome,
            BatchOutcome::Completed {
                stored: 0,
                errors: vec!["bad.png: Upload mislukt".to_string()]
            }
        );
    }

    #[test]
    fn session_is_cleared_but_errors_stay_visible() {
        let storage = MemoryStorage::failing("bad.png", StorageError::Fault("boom".into()));
        let config = Config::default();
        let mut uploader = ImageUploader::new(&storage, &config, Logger::new("test"));

        assert!(uploader.select_enabled());
        block_on(uploader.handle_file_select(
            vec![png("bad.png"), png("good.png")],
            &[],
            5,
            &owner(),
            |_| {},
        ));

        assert!(uploader.select_enabled());
        assert!(uploader.session().progress().is_empty());
        assert_eq!(uploader.session().errors(), ["bad.png: Upload mislukt"]);
    }

    #[test]
    fn observer_sees_progress_while_in_flight() {
        let storage = MemoryStorage::default();
        let config = Config::default();
        let mut seen: Vec<(bool, Option<u8>)> = Vec::new();
        {
            let mut uploader = ImageUploader::new(&storage, &config, Logger::new("test"))
                .with_observer(|session: &UploadSession| {
                    seen.push((session.is_in_flight(), session.progress_for("a.png")));
                });
            block_on(uploader.handle_file_select(vec![png("a.png")], &[], 5, &owner(), |_| {}));
        }

        assert_eq!(
            seen,
            [(true, None), (true, Some(0)), (true, Some(100)), (false, None)]
        );
    }

    #[test]
    fn empty_selection_still_reports_current_images() {
        let storage = MemoryStorage::default();
        let (_, received, _) = run(&storage, vec![], &refs(&["A"]), 5);
        assert_eq!(received.unwrap(), refs(&["A"]));
    }

    #[test]
    fn uploads_are_tagged_with_the_owner() {
        let storage = MemoryStorage::default();
        run(&storage, vec![png("a.png")], &[], 5);
        assert_eq!(storage.calls.borrow()[0].1, "p1");
    }

    #[test]
    fn remove_image_keeps_relative_order() {
        let images = refs(&["A", "B", "C", "D"]);
        assert_eq!(remove_image(&images, 0), refs(&["B", "C", "D"]));
        assert_eq!(remove_image(&images, 2), refs(&["A", "B", "D"]));
        assert_eq!(remove_image(&images, 3), refs(&["A", "B", "C"]));
    }

    #[test]
    fn remove_image_out_of_range_is_a_no_op() {
        let images = refs(&["A", "B"]);
        assert_eq!(remove_image(&images, 7), images);
    }
}
