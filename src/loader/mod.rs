//! Off-thread photo decoding where only the most recent request is delivered.

use std::path::PathBuf;
use std::sync::mpsc;

use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to decode image {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: image::ImageError,
    },
    #[error("image {origin} has no pixels")]
    EmptyImage { origin: String },
    #[error("decode worker exited before reporting a result")]
    WorkerGone,
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl LoadSource {
    fn origin(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for LoadSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for LoadSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Identifies one load request; later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Decode `source` into an RGBA buffer on the calling thread.
pub fn decode_image(source: &LoadSource) -> LoadResult<RgbaImage> {
    let decoded = match source {
        LoadSource::Path(path) => image::open(path),
        LoadSource::Bytes(bytes) => image::load_from_memory(bytes),
    }
    .map_err(|err| LoadError::Decode {
        origin: source.origin(),
        source: err,
    })?;

    let image = decoded.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::EmptyImage {
            origin: source.origin(),
        });
    }
    Ok(image)
}

/// Hand a finished decode back to the loader. Returns `false` once the request was superseded.
fn deliver(
    tx: &mpsc::Sender<LoadResult<RgbaImage>>,
    ticket: LoadTicket,
    result: LoadResult<RgbaImage>,
) -> bool {
    if tx.send(result).is_err() {
        tracing::debug!(?ticket, "dropping decode result for superseded load");
        return false;
    }
    true
}

type PendingLoad = (LoadTicket, mpsc::Receiver<LoadResult<RgbaImage>>);

#[derive(Debug, Default)]
pub struct ImageLoader {
    next_ticket: u64,
    pending: Option<PendingLoad>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start decoding `source` on a worker thread. Any earlier pending request is abandoned and
    /// its result will never be delivered.
    pub fn request(&mut self, source: impl Into<LoadSource>) -> LoadTicket {
        let source = source.into();
        self.next_ticket = self.next_ticket.saturating_add(1);
        let ticket = LoadTicket(self.next_ticket);

        if let Some((stale, _)) = self.pending.take() {
            tracing::debug!(?stale, ?ticket, "superseding pending image load");
        }

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            deliver(&tx, ticket, decode_image(&source));
        });
        self.pending = Some((ticket, rx));
        ticket
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Result of the latest request if it has finished, without blocking.
    pub fn poll(&mut self) -> Option<(LoadTicket, LoadResult<RgbaImage>)> {
        let (ticket, rx) = self.pending.as_ref()?;
        let ticket = *ticket;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => Err(LoadError::WorkerGone),
        };
        self.pending = None;
        Some((ticket, result))
    }

    /// Block until the latest request finishes. `None` when nothing is pending.
    pub fn wait(&mut self) -> Option<(LoadTicket, LoadResult<RgbaImage>)> {
        let (ticket, rx) = self.pending.take()?;
        let result = rx.recv().unwrap_or(Err(LoadError::WorkerGone));
        Some((ticket, result))
    }
}

#[cfg(test)]
pub(crate) fn encode_test_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode test png");
    bytes.into_inner()
}
