use reqwest::multipart::{Form, Part};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use url::Url;

use crate::client::CandidateFile;
use crate::models::{ErrorResponse, StoredFile, UploadPolicy, UploadResponse, FILES_FIELD};

/// Path of the upload endpoint relative to the server root.
pub const UPLOAD_PATH: &str = "/api/upload";

/// Message shown when the server gives no usable error.
pub const UPLOAD_FAILED: &str = "Upload failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    /// Up to five files, overflow silently dropped.
    Multi,
    /// Exactly one file per drop.
    Single,
}

impl PickerMode {
    pub fn max_files(&self) -> usize {
        match self {
            PickerMode::Multi => UploadPolicy::default().max_files,
            PickerMode::Single => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerPhase {
    Idle,
    Selecting,
    Uploading,
    Uploaded,
    Failed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickerError {
    #[error("Please drop a single PDF file.")]
    MultipleFiles,
    #[error("Only PDF files are allowed.")]
    NoPdf,
    #[error("Cannot change the selection while an upload is in progress.")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing selected, or another submission was still running.
    Skipped,
    Uploaded(Vec<StoredFile>),
    Failed(String),
}

#[derive(Debug, Default)]
struct PickerState {
    selected: Vec<CandidateFile>,
    uploaded: Vec<StoredFile>,
    error: Option<String>,
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Client side of the upload pathway: collects PDFs, then submits them in one request.
///
/// Share it between tasks behind an `Arc`; at most one submission runs at a time.
pub struct UploadPicker {
    client: reqwest::Client,
    endpoint: Url,
    mode: PickerMode,
    state: Mutex<PickerState>,
    uploading: AtomicBool,
}

impl UploadPicker {
    pub fn new(endpoint: Url, mode: PickerMode) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, mode)
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url, mode: PickerMode) -> Self {
        Self {
            client,
            endpoint,
            mode,
            state: Mutex::new(PickerState::default()),
            uploading: AtomicBool::new(false),
        }
    }

    /// Picker posting to `UPLOAD_PATH` on `server`.
    pub fn for_server(server: &Url, mode: PickerMode) -> Result<Self, url::ParseError> {
        Ok(Self::new(server.join(UPLOAD_PATH)?, mode))
    }

    fn lock(&self) -> MutexGuard<'_, PickerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn mode(&self) -> PickerMode {
        self.mode
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> PickerPhase {
        if self.is_uploading() {
            return PickerPhase::Uploading;
        }
        let state = self.lock();
        if state.error.is_some() {
            PickerPhase::Failed
        } else if !state.selected.is_empty() {
            PickerPhase::Selecting
        } else if !state.uploaded.is_empty() {
            PickerPhase::Uploaded
        } else {
            PickerPhase::Idle
        }
    }

    pub fn selected(&self) -> Vec<CandidateFile> {
        self.lock().selected.clone()
    }

    pub fn uploaded(&self) -> Vec<StoredFile> {
        self.lock().uploaded.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Offer files from a drop or a file dialog. Returns how many were added.
    ///
    /// Non-PDF entries are filtered out and duplicates of already selected
    /// files ignored. In multi mode the selection is cut to the cap without
    /// complaint and an empty drop is a no-op; in single mode a drop must
    /// contain exactly one PDF, so an empty drop is rejected too.
    pub fn add_candidates(&self, incoming: Vec<CandidateFile>) -> Result<usize, PickerError> {
        if incoming.is_empty() && self.mode == PickerMode::Multi {
            return Ok(0);
        }
        let pdfs: Vec<CandidateFile> = incoming.into_iter().filter(|f| f.is_pdf()).collect();

        let mut state = self.lock();
        let result = match self.mode {
            PickerMode::Multi => Ok(Self::merge(&mut state.selected, pdfs, self.mode.max_files())),
            PickerMode::Single => match pdfs.len() {
                0 => Err(PickerError::NoPdf),
                // The dropped file replaces the current one
                1 => {
                    state.selected = pdfs;
                    Ok(1)
                }
                _ => Err(PickerError::MultipleFiles),
            },
        };

        match &result {
            Ok(added) if *added > 0 => state.error = None,
            Ok(_) => {}
            Err(e) => state.error = Some(e.to_string()),
        }
        result
    }

    /// Append new entries in order, then truncate. Returns the growth of the set.
    fn merge(selected: &mut Vec<CandidateFile>, pdfs: Vec<CandidateFile>, cap: usize) -> usize {
        let before = selected.len();
        for file in pdfs {
            if !selected.iter().any(|existing| existing.same_file(&file)) {
                selected.push(file);
            }
        }
        selected.truncate(cap);
        selected.len().saturating_sub(before)
    }

    /// Drop one selected file.
    pub fn remove(&self, index: usize) -> Result<Option<CandidateFile>, PickerError> {
        if self.is_uploading() {
            return Err(PickerError::Busy);
        }
        let mut state = self.lock();
        if index < state.selected.len() {
            Ok(Some(state.selected.remove(index)))
        } else {
            Ok(None)
        }
    }

    /// Empty the selection. Refused while a submission is in flight.
    pub fn clear(&self) -> Result<(), PickerError> {
        if self.is_uploading() {
            return Err(PickerError::Busy);
        }
        self.lock().selected.clear();
        Ok(())
    }

    /// Upload the current selection in a single request.
    ///
    /// Skipped when nothing is selected or a submission is already running.
    pub async fn submit(&self) -> SubmitOutcome {
        if self
            .uploading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("submission already in flight, skipping");
            return SubmitOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.uploading);

        let batch = {
            let mut state = self.lock();
            if state.selected.is_empty() {
                return SubmitOutcome::Skipped;
            }
            state.error = None;
            state.selected.clone()
        };

        let result = self.send(&batch).await;

        let mut state = self.lock();
        match result {
            Ok(files) => {
                state.uploaded = files.clone();
                // Files added while the request was running stay selected
                state
                    .selected
                    .retain(|file| !batch.iter().any(|sent| sent.same_file(file)));
                SubmitOutcome::Uploaded(files)
            }
            Err(message) => {
                state.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    async fn send(&self, batch: &[CandidateFile]) -> Result<Vec<StoredFile>, String> {
        let mut form = Form::new();
        for file in batch {
            let part = Part::bytes(file.data.to_vec()).file_name(file.name.clone());
            let part = match &file.media_type {
                Some(media_type) => part.mime_str(media_type).map_err(|e| {
                    tracing::warn!(name = %file.name, error = %e, "invalid media type");
                    UPLOAD_FAILED.to_string()
                })?,
                None => part,
            };
            form = form.part(FILES_FIELD, part);
        }

        tracing::info!(count = batch.len(), endpoint = %self.endpoint, "uploading files");

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "upload request failed");
                UPLOAD_FAILED.to_string()
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .map(|body| body.error)
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| UPLOAD_FAILED.to_string());
            tracing::warn!(%status, error = %message, "upload rejected");
            return Err(message);
        }

        response
            .json::<UploadResponse>()
            .await
            .map(|body| body.files)
            .map_err(|e| {
                tracing::warn!(error = %e, "unreadable upload response");
                UPLOAD_FAILED.to_string()
            })
    }
}
