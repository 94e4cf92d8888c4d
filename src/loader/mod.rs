//! # Asset Loading
//!
//! Loads run away from the presenter: a [`AssetLoader`] receives a
//! [`LoadRequest`] and eventually sends exactly one [`LoadCompletion`] on
//! the channel it was handed. The presenter drains that channel on its own
//! thread and uses the [`LoadToken`] to drop completions that were
//! superseded by a newer request.

pub mod decode;
pub mod source;

use std::{path::PathBuf, sync::Arc};

use futures::channel::mpsc::UnboundedSender;

pub use decode::{decode_gltf, AssetData};
pub use source::{AssetSource, FileSource};

use crate::error::{ViewerError, ViewerResult};

/// Identifies one load request. Tokens only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(pub u64);

impl LoadToken {
    pub fn next(self) -> LoadToken {
        LoadToken(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub url: String,
}

/// Outcome of one load request
#[derive(Debug)]
pub struct LoadCompletion {
    pub token: LoadToken,
    pub url: String,
    pub result: ViewerResult<AssetData>,
}

pub type CompletionSender = UnboundedSender<LoadCompletion>;

/// Starts asset loads. Implementations must send exactly one completion per
/// request; a closed channel means nobody is waiting and the result is
/// dropped.
pub trait AssetLoader {
    fn load(&self, request: LoadRequest, completions: CompletionSender);
}

/// Fetches and decodes `url` from `source`.
pub fn fetch_and_decode(source: &dyn AssetSource, url: &str) -> ViewerResult<AssetData> {
    let bytes = source.fetch(url)?;
    let base: Option<PathBuf> = source.base_path(url);
    decode_gltf(&bytes, base.as_deref(), url).map_err(|err| match err {
        ViewerError::Decode(reason) => ViewerError::asset_load(url, reason),
        other => other,
    })
}

fn send_completion(completions: &CompletionSender, completion: LoadCompletion) {
    if completions.unbounded_send(completion).is_err() {
        log::debug!("Load completion dropped: receiver is gone");
    }
}

/// Runs every load on its own worker thread.
pub struct ThreadedLoader {
    source: Arc<dyn AssetSource + Send + Sync>,
}

impl ThreadedLoader {
    pub fn new(source: impl AssetSource + Send + Sync + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl AssetLoader for ThreadedLoader {
    fn load(&self, request: LoadRequest, completions: CompletionSender) {
        let source = Arc::clone(&self.source);
        let LoadRequest { token, url } = request;
        let thread_url = url.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("asset-load-{}", token.0))
            .spawn(move || {
                let result = fetch_and_decode(source.as_ref(), &thread_url);
                send_completion(
                    &completions,
                    LoadCompletion {
                        token,
                        url: thread_url,
                        result,
                    },
                );
            });

        if let Err(err) = spawned {
            log::error!("Failed to spawn loader thread for {}: {}", url, err);
        }
    }
}

/// Loads on the calling thread. The completion is queued before `load`
/// returns and applied on the presenter's next poll like any other.
pub struct InlineLoader<S: AssetSource> {
    source: S,
}

impl<S: AssetSource> InlineLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: AssetSource> AssetLoader for InlineLoader<S> {
    fn load(&self, request: LoadRequest, completions: CompletionSender) {
        let result = fetch_and_decode(&self.source, &request.url);
        send_completion(
            &completions,
            LoadCompletion {
                token: request.token,
                url: request.url,
                result,
            },
        );
    }
}
