//! In-memory provider for poll-loop and studio tests.

use std::{collections::VecDeque, sync::Mutex};

use {async_trait::async_trait, bytes::Bytes};

use crate::{
    error::{Error, Result},
    payload::{ImagePayload, VideoPayload},
    provider::{DownloadedMedia, MediaProvider, Operation},
    types::ImageOutput,
};

/// Replays a fixed sequence of operations from `get_operation`.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    start: Option<Operation>,
    script: Mutex<VecDeque<Operation>>,
    repeat: Option<Operation>,
    download_mime: Option<String>,
    polled: Mutex<Vec<String>>,
    downloaded: Mutex<Vec<String>>,
    submitted: Mutex<Vec<(String, VideoPayload)>>,
}

impl ScriptedProvider {
    pub(crate) fn new(script: Vec<Operation>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// Answer every poll with `op`.
    pub(crate) fn repeating(op: Operation) -> Self {
        Self {
            repeat: Some(op),
            ..Default::default()
        }
    }

    /// Operation returned by `start_video`.
    pub(crate) fn starting_with(mut self, op: Operation) -> Self {
        self.start = Some(op);
        self
    }

    pub(crate) fn download_mime(mut self, mime: &str) -> Self {
        self.download_mime = Some(mime.into());
        self
    }

    pub(crate) fn polls(&self) -> usize {
        self.polled.lock().map(|p| p.len()).unwrap_or_default()
    }

    pub(crate) fn polled_names(&self) -> Vec<String> {
        self.polled.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub(crate) fn downloaded(&self) -> Vec<String> {
        self.downloaded.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub(crate) fn submitted(&self) -> Vec<(String, VideoPayload)> {
        self.submitted.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MediaProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        "scripted"
    }

    fn name(&self) -> &'static str {
        "Scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn generate_image(&self, _model: &str, payload: &ImagePayload) -> Result<ImageOutput> {
        let prompt = payload
            .instances
            .first()
            .map(|i| i.prompt.clone())
            .unwrap_or_default();
        Ok(ImageOutput {
            data: Bytes::from(prompt.into_bytes()),
            mime_type: payload.parameters.output_mime_type.clone(),
        })
    }

    async fn start_video(&self, model: &str, payload: &VideoPayload) -> Result<Operation> {
        if let Ok(mut submitted) = self.submitted.lock() {
            submitted.push((model.to_owned(), payload.clone()));
        }
        self.start
            .clone()
            .ok_or_else(|| Error::message("no start operation scripted"))
    }

    async fn get_operation(&self, name: &str) -> Result<Operation> {
        if let Ok(mut polled) = self.polled.lock() {
            polled.push(name.to_owned());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.or_else(|| self.repeat.clone())
            .ok_or_else(|| Error::message("poll script exhausted"))
    }

    async fn download(&self, uri: &str) -> Result<DownloadedMedia> {
        if let Ok(mut downloaded) = self.downloaded.lock() {
            downloaded.push(uri.to_owned());
        }
        Ok(DownloadedMedia {
            data: Bytes::from_static(b"video-bytes"),
            mime_type: self.download_mime.clone(),
        })
    }
}
