//! Media normalization for outbound replies.
//!
//! Replies can carry media given in several shapes: an async reader, raw
//! bytes, a decoded image, or a string naming either a URL or a local file.
//! [`ReplyPayloadBuilder`] turns each of those into a [`NamedPayload`] (a
//! filename, the bytes and a content type) so the client only has to decide
//! how to put them on the wire.
//!
//! Conversion is per input: an input that cannot be converted (a download
//! that fails, a missing file, an image handed to an audio reply) is logged
//! and skipped while the others are still sent.
//!
//! # Example
//!
//! ```no_run
//! use iris_client::{MediaInput, MediaKind, ReplyPayloadBuilder};
//!
//! # async fn example() {
//! let http = reqwest::Client::new();
//! let builder = ReplyPayloadBuilder::new(&http, MediaKind::Audio);
//!
//! let payloads = builder
//!     .build(vec![
//!         MediaInput::location("https://cdn.example.com/voice%20note.mp3"),
//!         MediaInput::location("/var/bot/jingle.mp3"),
//!         MediaInput::bytes(vec![0x49, 0x44, 0x33]),
//!     ])
//!     .await;
//!
//! for payload in &payloads {
//!     println!("{} ({} bytes)", payload.filename, payload.bytes.len());
//! }
//! # }
//! ```

use crate::errors::PayloadError;
use base64::Engine;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use reqwest::Client as ReqwestClient;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

/// Content type attached to binary payloads.
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// Content type attached to payloads produced from decoded images.
pub const PNG_MIME: &str = "image/png";

/// The category of media a reply carries.
///
/// The category decides how payloads are encoded (base64 inside JSON for
/// images, multipart parts for everything else), the reply `type` sent to the
/// gateway and the fallback filename of unnamed inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    File,
}

impl MediaKind {
    /// Returns the lowercase name used in reply types and filenames.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::File => "file",
        }
    }

    /// Extension used for synthesized filenames.
    #[must_use]
    pub const fn default_extension(self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Audio => "mp3",
            Self::Video => "mp4",
            Self::File => "bin",
        }
    }

    /// Builds the fallback filename `<kind>_<index>.<ext>` for an input with
    /// no usable name of its own.
    ///
    /// ```
    /// use iris_client::MediaKind;
    ///
    /// assert_eq!(MediaKind::Audio.synthesized_filename(2), "audio_2.mp3");
    /// assert_eq!(MediaKind::File.synthesized_filename(0), "file_0.bin");
    /// ```
    #[must_use]
    pub fn synthesized_filename(self, index: usize) -> String {
        format!("{}_{}.{}", self.as_str(), index, self.default_extension())
    }

    /// Returns the reply `type` for a batch of `count` payloads.
    ///
    /// Images always go out as `image_multiple`. Other kinds use the singular
    /// name for exactly one payload and `<kind>_multiple` otherwise.
    #[must_use]
    pub fn reply_type(self, count: usize) -> String {
        match self {
            Self::Image => "image_multiple".to_string(),
            _ if count == 1 => self.as_str().to_string(),
            _ => format!("{}_multiple", self.as_str()),
        }
    }

    /// Returns true if payloads of this kind travel as multipart form parts.
    #[must_use]
    pub const fn is_multipart(self) -> bool {
        !matches!(self, Self::Image)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of media handed to a reply method.
///
/// Every variant is consumed once by [`ReplyPayloadBuilder::convert`].
pub enum MediaInput {
    /// An async stream, read to the end. `name` is used as the filename
    /// (its last path component) when present.
    Reader {
        reader: Box<dyn AsyncRead + Send + Unpin>,
        name: Option<String>,
    },
    /// Raw bytes, sent as-is.
    Bytes(Bytes),
    /// A decoded image, re-encoded as RGBA PNG. Only accepted for image
    /// replies.
    Image(DynamicImage),
    /// A URL (anything starting with `http`) to download, or a local file
    /// path to read.
    Location(String),
}

impl MediaInput {
    /// Wraps an unnamed async reader.
    pub fn reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::Reader {
            reader: Box::new(reader),
            name: None,
        }
    }

    /// Wraps an async reader whose source has a name, such as an open file.
    pub fn named_reader(
        reader: impl AsyncRead + Send + Unpin + 'static,
        name: impl Into<String>,
    ) -> Self {
        Self::Reader {
            reader: Box::new(reader),
            name: Some(name.into()),
        }
    }

    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn location(location: impl Into<String>) -> Self {
        Self::Location(location.into())
    }

    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Location(path.as_ref().to_string_lossy().into_owned())
    }

    /// Short name of the variant, used in log lines and errors.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Reader { .. } => "reader",
            Self::Bytes(_) => "bytes",
            Self::Image(_) => "image",
            Self::Location(_) => "location",
        }
    }
}

impl fmt::Debug for MediaInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reader { name, .. } => f
                .debug_struct("Reader")
                .field("name", name)
                .finish_non_exhaustive(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Image(image) => f
                .debug_struct("Image")
                .field("width", &image.width())
                .field("height", &image.height())
                .finish(),
            Self::Location(location) => f.debug_tuple("Location").field(location).finish(),
        }
    }
}

impl From<Bytes> for MediaInput {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for MediaInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

impl From<&[u8]> for MediaInput {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<DynamicImage> for MediaInput {
    fn from(image: DynamicImage) -> Self {
        Self::Image(image)
    }
}

impl From<String> for MediaInput {
    fn from(location: String) -> Self {
        Self::Location(location)
    }
}

impl From<&str> for MediaInput {
    fn from(location: &str) -> Self {
        Self::Location(location.to_string())
    }
}

impl From<PathBuf> for MediaInput {
    fn from(path: PathBuf) -> Self {
        Self::path(path)
    }
}

impl From<&Path> for MediaInput {
    fn from(path: &Path) -> Self {
        Self::path(path)
    }
}

/// An ordered batch of media inputs.
///
/// Reply methods accept `impl Into<MediaInputs>`, so callers can pass a single
/// input or a sequence of them:
///
/// ```
/// use iris_client::{MediaInput, MediaInputs};
///
/// let single: MediaInputs = "https://example.com/cat.png".into();
/// assert_eq!(single.len(), 1);
///
/// let many: MediaInputs = vec![
///     MediaInput::bytes(vec![1, 2, 3]),
///     MediaInput::location("/tmp/dog.png"),
/// ]
/// .into();
/// assert_eq!(many.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MediaInputs(Vec<MediaInput>);

impl MediaInputs {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for MediaInputs {
    type Item = MediaInput;
    type IntoIter = std::vec::IntoIter<MediaInput>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<MediaInput> for MediaInputs {
    fn from_iter<I: IntoIterator<Item = MediaInput>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<MediaInput>> for MediaInputs {
    fn from(inputs: Vec<MediaInput>) -> Self {
        Self(inputs)
    }
}

impl<const N: usize> From<[MediaInput; N]> for MediaInputs {
    fn from(inputs: [MediaInput; N]) -> Self {
        Self(inputs.into())
    }
}

impl From<MediaInput> for MediaInputs {
    fn from(input: MediaInput) -> Self {
        Self(vec![input])
    }
}

impl From<Bytes> for MediaInputs {
    fn from(bytes: Bytes) -> Self {
        MediaInput::from(bytes).into()
    }
}

impl From<DynamicImage> for MediaInputs {
    fn from(image: DynamicImage) -> Self {
        MediaInput::from(image).into()
    }
}

impl From<String> for MediaInputs {
    fn from(location: String) -> Self {
        MediaInput::from(location).into()
    }
}

impl From<&str> for MediaInputs {
    fn from(location: &str) -> Self {
        MediaInput::from(location).into()
    }
}

impl From<PathBuf> for MediaInputs {
    fn from(path: PathBuf) -> Self {
        MediaInput::from(path).into()
    }
}

impl From<&Path> for MediaInputs {
    fn from(path: &Path) -> Self {
        MediaInput::from(path).into()
    }
}

/// A named byte blob ready to be attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPayload {
    pub filename: String,
    pub bytes: Bytes,
    pub content_type: String,
}

impl NamedPayload {
    /// Encodes the payload bytes as standard, padded base64, the form image
    /// replies carry in their JSON body.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Outcome of converting a batch: the payloads that made it and the inputs
/// that were skipped, by position.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub payloads: Vec<NamedPayload>,
    pub failures: Vec<(usize, PayloadError)>,
}

/// Converts [`MediaInput`]s of one [`MediaKind`] into [`NamedPayload`]s.
///
/// Downloads go through the given HTTP client so they share its connection
/// pool and timeouts.
#[derive(Debug, Clone, Copy)]
pub struct ReplyPayloadBuilder<'a> {
    http_client: &'a ReqwestClient,
    kind: MediaKind,
}

impl<'a> ReplyPayloadBuilder<'a> {
    #[must_use]
    pub const fn new(http_client: &'a ReqwestClient, kind: MediaKind) -> Self {
        Self { http_client, kind }
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Converts every input in order, logging and dropping the ones that fail.
    pub async fn build(&self, inputs: impl Into<MediaInputs>) -> Vec<NamedPayload> {
        self.build_report(inputs).await.payloads
    }

    /// Like [`build`](Self::build), but also hands back the failures.
    pub async fn build_report(&self, inputs: impl Into<MediaInputs>) -> BuildReport {
        let mut report = BuildReport::default();

        for (index, input) in inputs.into().into_iter().enumerate() {
            match self.convert(index, input).await {
                Ok(payload) => {
                    debug!(
                        "Prepared {} payload #{}: {} ({} bytes)",
                        self.kind,
                        index,
                        payload.filename,
                        payload.bytes.len()
                    );
                    report.payloads.push(payload);
                }
                Err(e) => {
                    warn!("Skipping {} input #{}: {}", self.kind, index, e);
                    report.failures.push((index, e));
                }
            }
        }

        report
    }

    /// Converts a single input. `index` is the input's position in the
    /// caller's batch and only feeds the fallback filename.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] when the input is not accepted for this
    /// kind, or when reading, downloading or encoding it fails.
    pub async fn convert(
        &self,
        index: usize,
        input: MediaInput,
    ) -> Result<NamedPayload, PayloadError> {
        debug!(
            "Converting {} input #{} ({})",
            self.kind,
            index,
            input.variant_name()
        );

        match input {
            MediaInput::Reader { mut reader, name } => {
                let mut buf = Vec::new();
                reader
                    .read_to_end(&mut buf)
                    .await
                    .map_err(PayloadError::Stream)?;
                let filename = name
                    .as_deref()
                    .and_then(file_name_of)
                    .unwrap_or_else(|| self.kind.synthesized_filename(index));
                Ok(self.binary_payload(filename, buf.into()))
            }
            MediaInput::Bytes(bytes) => {
                Ok(self.binary_payload(self.kind.synthesized_filename(index), bytes))
            }
            MediaInput::Image(image) => {
                if self.kind != MediaKind::Image {
                    return Err(PayloadError::Unsupported {
                        kind: self.kind,
                        input: "image",
                    });
                }
                Ok(NamedPayload {
                    filename: self.kind.synthesized_filename(index),
                    bytes: encode_rgba_png(&image)?,
                    content_type: PNG_MIME.to_string(),
                })
            }
            MediaInput::Location(url) if url.starts_with("http") => {
                self.download(index, &url).await
            }
            MediaInput::Location(path) => self.read_file(index, Path::new(&path)).await,
        }
    }

    fn binary_payload(&self, filename: String, bytes: Bytes) -> NamedPayload {
        NamedPayload {
            filename,
            bytes,
            content_type: OCTET_STREAM_MIME.to_string(),
        }
    }

    async fn download(&self, index: usize, url: &str) -> Result<NamedPayload, PayloadError> {
        debug!("Downloading {} input #{} from {}", self.kind, index, url);

        let fetch_error = |source| PayloadError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.http_client.get(url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(PayloadError::Download {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(fetch_error)?;

        let filename =
            filename_from_url(url).unwrap_or_else(|| self.kind.synthesized_filename(index));
        Ok(self.binary_payload(filename, bytes))
    }

    async fn read_file(&self, index: usize, path: &Path) -> Result<NamedPayload, PayloadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| PayloadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let filename = path
            .to_str()
            .and_then(file_name_of)
            .unwrap_or_else(|| self.kind.synthesized_filename(index));
        Ok(self.binary_payload(filename, bytes.into()))
    }
}

/// Last path component of `name`, if it has a non-empty one.
fn file_name_of(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(String::from)
}

/// Derives a filename from the percent-decoded path of a URL.
///
/// Returns `None` when the URL does not parse or its path ends in `/`.
pub(crate) fn filename_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let path = urlencoding::decode(parsed.path()).ok()?;
    let name = path.rsplit('/').next()?;
    (!name.is_empty()).then(|| name.to_string())
}

fn encode_rgba_png(image: &DynamicImage) -> Result<Bytes, PayloadError> {
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    let mut cursor = std::io::Cursor::new(Vec::new());
    rgba.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use tempfile::NamedTempFile;
    use tokio::io::ReadBuf;

    /// Reader whose every read fails.
    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "stream reset",
            )))
        }
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn unused_local_url(path: &str) -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}{path}")
    }

    fn builder(http: &ReqwestClient, kind: MediaKind) -> ReplyPayloadBuilder<'_> {
        ReplyPayloadBuilder::new(http, kind)
    }

    // =========================================================================
    // MediaKind
    // =========================================================================

    #[test]
    fn test_reply_type_singular_and_plural() {
        assert_eq!(MediaKind::Audio.reply_type(1), "audio");
        assert_eq!(MediaKind::Audio.reply_type(2), "audio_multiple");
        assert_eq!(MediaKind::Video.reply_type(1), "video");
        assert_eq!(MediaKind::Video.reply_type(3), "video_multiple");
        assert_eq!(MediaKind::File.reply_type(1), "file");
        assert_eq!(MediaKind::File.reply_type(5), "file_multiple");
    }

    #[test]
    fn test_reply_type_image_always_multiple() {
        assert_eq!(MediaKind::Image.reply_type(1), "image_multiple");
        assert_eq!(MediaKind::Image.reply_type(4), "image_multiple");
    }

    #[test]
    fn test_synthesized_filenames() {
        assert_eq!(MediaKind::Image.synthesized_filename(0), "image_0.png");
        assert_eq!(MediaKind::Audio.synthesized_filename(1), "audio_1.mp3");
        assert_eq!(MediaKind::Video.synthesized_filename(7), "video_7.mp4");
        assert_eq!(MediaKind::File.synthesized_filename(3), "file_3.bin");
    }

    #[test]
    fn test_is_multipart() {
        assert!(!MediaKind::Image.is_multipart());
        assert!(MediaKind::Audio.is_multipart());
        assert!(MediaKind::Video.is_multipart());
        assert!(MediaKind::File.is_multipart());
    }

    // =========================================================================
    // Filename derivation
    // =========================================================================

    #[test]
    fn test_filename_from_url_decodes_path() {
        assert_eq!(
            filename_from_url("https://cdn.example.com/media/voice%20note.mp3?sig=abc"),
            Some("voice note.mp3".to_string())
        );
    }

    #[test]
    fn test_filename_from_url_decodes_unicode() {
        assert_eq!(
            filename_from_url("http://example.com/%EC%9D%8C%EC%84%B1.m4a"),
            Some("음성.m4a".to_string())
        );
    }

    #[test]
    fn test_filename_from_url_empty_path() {
        assert_eq!(filename_from_url("https://example.com"), None);
        assert_eq!(filename_from_url("https://example.com/media/"), None);
    }

    #[test]
    fn test_filename_from_url_unparseable() {
        assert_eq!(filename_from_url("http//not a url"), None);
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("/var/bot/song.mp3"), Some("song.mp3".to_string()));
        assert_eq!(file_name_of("clip.mp4"), Some("clip.mp4".to_string()));
        assert_eq!(file_name_of(""), None);
    }

    // =========================================================================
    // MediaInputs
    // =========================================================================

    #[test]
    fn test_media_inputs_from_single_and_many() {
        let single: MediaInputs = MediaInput::bytes(vec![1u8]).into();
        assert_eq!(single.len(), 1);

        let array: MediaInputs =
            [MediaInput::bytes(vec![1u8]), MediaInput::location("a.bin")].into();
        assert_eq!(array.len(), 2);

        let collected: MediaInputs = (0..3u8).map(|b| MediaInput::bytes(vec![b])).collect();
        assert_eq!(collected.len(), 3);

        assert!(MediaInputs::default().is_empty());
    }

    #[test]
    fn test_media_input_debug_hides_contents() {
        let debug = format!("{:?}", MediaInput::bytes(vec![0u8; 1024]));
        assert_eq!(debug, "Bytes(1024)");

        let debug = format!("{:?}", MediaInput::named_reader(&b"abc"[..], "a.mp3"));
        assert!(debug.contains("a.mp3"));
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    #[tokio::test]
    async fn test_convert_bytes_uses_synthesized_name() {
        let http = ReqwestClient::new();
        let payload = builder(&http, MediaKind::Audio)
            .convert(4, MediaInput::bytes(vec![1, 2, 3]))
            .await
            .expect("bytes should convert");

        assert_eq!(payload.filename, "audio_4.mp3");
        assert_eq!(payload.bytes.as_ref(), &[1, 2, 3]);
        assert_eq!(payload.content_type, OCTET_STREAM_MIME);
    }

    #[tokio::test]
    async fn test_convert_named_reader_uses_basename() {
        let http = ReqwestClient::new();
        let payload = builder(&http, MediaKind::Video)
            .convert(0, MediaInput::named_reader(&b"movie"[..], "/home/bot/clips/intro.mp4"))
            .await
            .expect("reader should convert");

        assert_eq!(payload.filename, "intro.mp4");
        assert_eq!(payload.bytes.as_ref(), b"movie");
    }

    #[tokio::test]
    async fn test_convert_unnamed_reader_uses_synthesized_name() {
        let http = ReqwestClient::new();
        let payload = builder(&http, MediaKind::File)
            .convert(2, MediaInput::reader(&b"data"[..]))
            .await
            .expect("reader should convert");

        assert_eq!(payload.filename, "file_2.bin");
    }

    #[tokio::test]
    async fn test_convert_local_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"local bytes").expect("Failed to write temp file");
        let expected_name = file
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .expect("temp file has a name");

        let http = ReqwestClient::new();
        let payload = builder(&http, MediaKind::File)
            .convert(0, MediaInput::path(file.path()))
            .await
            .expect("file should convert");

        assert_eq!(payload.filename, expected_name);
        assert_eq!(payload.bytes.as_ref(), b"local bytes");
    }

    #[tokio::test]
    async fn test_convert_missing_file_is_read_error() {
        let http = ReqwestClient::new();
        let err = builder(&http, MediaKind::Audio)
            .convert(0, MediaInput::location("/definitely/not/here.mp3"))
            .await
            .unwrap_err();

        assert!(matches!(err, PayloadError::Read { .. }));
    }

    #[tokio::test]
    async fn test_convert_image_to_rgba_png() {
        let http = ReqwestClient::new();
        let image = DynamicImage::new_rgb8(3, 2);
        let payload = builder(&http, MediaKind::Image)
            .convert(1, MediaInput::Image(image))
            .await
            .expect("image should convert");

        assert_eq!(payload.filename, "image_1.png");
        assert_eq!(payload.content_type, PNG_MIME);

        let decoded = image::load_from_memory_with_format(&payload.bytes, ImageFormat::Png)
            .expect("payload should be a PNG");
        assert_eq!(decoded.color(), image::ColorType::Rgba8);
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[tokio::test]
    async fn test_convert_image_rejected_for_audio() {
        let http = ReqwestClient::new();
        let err = builder(&http, MediaKind::Audio)
            .convert(0, MediaInput::Image(DynamicImage::new_rgba8(1, 1)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PayloadError::Unsupported {
                kind: MediaKind::Audio,
                input: "image"
            }
        ));
    }

    #[tokio::test]
    async fn test_build_report_keeps_order_and_indexes_failures() {
        let http = ReqwestClient::new();
        let report = builder(&http, MediaKind::File)
            .build_report(vec![
                MediaInput::bytes(b"first".to_vec()),
                MediaInput::location("/no/such/file.bin"),
                MediaInput::bytes(b"third".to_vec()),
            ])
            .await;

        let names: Vec<_> = report.payloads.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(names, ["file_0.bin", "file_2.bin"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 1);
    }

    #[tokio::test]
    async fn test_convert_failing_reader_is_stream_error() {
        let http = ReqwestClient::new();
        let err = builder(&http, MediaKind::File)
            .convert(0, MediaInput::named_reader(BrokenReader, "upload.bin"))
            .await
            .unwrap_err();

        match err {
            PayloadError::Stream(source) => {
                assert_eq!(source.kind(), std::io::ErrorKind::ConnectionReset);
            }
            other => panic!("Expected Stream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_convert_unreachable_url_is_fetch_error() {
        let http = ReqwestClient::new();
        let url = unused_local_url("/clip.mp4");
        let err = builder(&http, MediaKind::Video)
            .convert(0, MediaInput::location(url.as_str()))
            .await
            .unwrap_err();

        match err {
            PayloadError::Fetch { url: failed, .. } => assert_eq!(failed, url),
            other => panic!("Expected Fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_build_logs_skipped_inputs_as_warnings() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let http = ReqwestClient::new();
        let payloads = builder(&http, MediaKind::Audio)
            .build(vec![
                MediaInput::reader(BrokenReader),
                MediaInput::bytes(b"ok".to_vec()),
            ])
            .await;

        assert_eq!(payloads.len(), 1);
        let output = logs.contents();
        assert!(output.contains("WARN"), "got: {output}");
        assert!(output.contains("Skipping audio input #0"), "got: {output}");
    }

    #[test]
    fn test_to_base64() {
        let payload = NamedPayload {
            filename: "image_0.png".to_string(),
            bytes: Bytes::from_static(b"hi"),
            content_type: PNG_MIME.to_string(),
        };
        assert_eq!(payload.to_base64(), "aGk=");
    }
}
