//! Clipboard copy controls
//!
//! A copy control shows a confirmation or an error label after a copy
//! attempt and reverts to its idle label after a fixed delay. Reverts run as
//! tokio tasks; there is no cancellation, so overlapping attempts each
//! schedule their own revert.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

pub const SNIPPET_IDLE_LABEL: &str = "Copy to clipboard";
pub const SNIPPET_COPIED_LABEL: &str = "Copied";
pub const SNIPPET_ERROR_LABEL: &str = "Copy failed";
pub const SNIPPET_REVERT: Duration = Duration::from_millis(1500);

pub const DOCUMENT_IDLE_LABEL: &str = "Copy as Markdown";
pub const DOCUMENT_COPIED_LABEL: &str = "Copied!";
pub const DOCUMENT_ERROR_LABEL: &str = "Error";
pub const DOCUMENT_REVERT: Duration = Duration::from_millis(2000);

/// Something text can be copied to
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard, via arboard
///
/// On Linux the selection is served by this process, so a write only
/// returns once another program has taken the contents over (a clipboard
/// manager, or the next copy), or once `hold` has elapsed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard {
    hold: Option<Duration>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the selection for at most `hold` after each write
    pub fn holding_for(hold: Duration) -> Self {
        SystemClipboard { hold: Some(hold) }
    }

    pub fn hold(&self) -> Option<Duration> {
        self.hold
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| anyhow!("clipboard access error: {}", e))?;
        write_selection(&mut clipboard, text, self.hold)
            .map_err(|e| anyhow!("clipboard write error: {}", e))
    }
}

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn write_selection(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    hold: Option<Duration>,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    let set = clipboard.set();
    match hold {
        Some(hold) => set.wait_until(std::time::Instant::now() + hold).text(text),
        None => set.wait().text(text),
    }
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn write_selection(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    _hold: Option<Duration>,
) -> Result<(), arboard::Error> {
    clipboard.set_text(text)
}

/// In-process clipboard; clones share contents
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
    fail: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes always fail
    pub fn failing() -> Self {
        MemoryClipboard {
            contents: Arc::default(),
            fail: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("clipboard write error: clipboard unavailable");
        }
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}

/// Visible state of a copy control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Copied,
    Failed,
}

/// Labels shown for each [`ControlState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlLabels {
    pub idle: &'static str,
    pub copied: &'static str,
    pub failed: &'static str,
}

impl ControlLabels {
    pub fn for_state(&self, state: ControlState) -> &'static str {
        match state {
            ControlState::Idle => self.idle,
            ControlState::Copied => self.copied,
            ControlState::Failed => self.failed,
        }
    }
}

/// A copy button: current state plus the delay before it reverts to idle
///
/// Clones observe and drive the same state.
#[derive(Debug, Clone)]
pub struct CopyControl {
    state: Arc<watch::Sender<ControlState>>,
    labels: ControlLabels,
    revert_after: Duration,
}

impl CopyControl {
    pub fn new(labels: ControlLabels, revert_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(ControlState::Idle);
        CopyControl {
            state: Arc::new(tx),
            labels,
            revert_after,
        }
    }

    /// Control attached to a command snippet
    pub fn snippet() -> Self {
        Self::new(
            ControlLabels {
                idle: SNIPPET_IDLE_LABEL,
                copied: SNIPPET_COPIED_LABEL,
                failed: SNIPPET_ERROR_LABEL,
            },
            SNIPPET_REVERT,
        )
    }

    /// The "Copy as Markdown" control for the companion document
    pub fn document() -> Self {
        Self::new(
            ControlLabels {
                idle: DOCUMENT_IDLE_LABEL,
                copied: DOCUMENT_COPIED_LABEL,
                failed: DOCUMENT_ERROR_LABEL,
            },
            DOCUMENT_REVERT,
        )
    }

    pub fn state(&self) -> ControlState {
        *self.state.borrow()
    }

    pub fn label(&self) -> &'static str {
        self.labels.for_state(self.state())
    }

    pub fn labels(&self) -> ControlLabels {
        self.labels
    }

    pub fn revert_after(&self) -> Duration {
        self.revert_after
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ControlState> {
        self.state.subscribe()
    }

    /// Show the outcome of a copy attempt and schedule the revert to idle
    ///
    /// Must be called from within a tokio runtime.
    fn settle<T>(&self, result: &Result<T>) {
        let state = match result {
            Ok(_) => ControlState::Copied,
            Err(e) => {
                log::warn!("copy failed: {:#}", e);
                ControlState::Failed
            }
        };
        self.state.send_replace(state);

        let tx = Arc::clone(&self.state);
        let delay = self.revert_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tx.send_replace(ControlState::Idle);
        });
    }
}

/// Copy a snippet's full text, driving `control` through its states
pub async fn copy_snippet(
    clipboard: &mut dyn Clipboard,
    control: &CopyControl,
    text: &str,
) -> Result<()> {
    let result = clipboard.set_text(text);
    control.settle(&result);
    result
}

/// Where the companion document is served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// A built site directory on disk
    Site(PathBuf),
    /// Base URL of a deployed site
    Remote(String),
}

/// The static Markdown document published next to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionDocument {
    source: DocumentSource,
    path: String,
}

impl CompanionDocument {
    /// `path` is the site path, e.g. `/slag.md`
    pub fn new(source: DocumentSource, path: impl Into<String>) -> Self {
        CompanionDocument {
            source,
            path: path.into(),
        }
    }

    /// File path or URL the document is fetched from
    pub fn location(&self) -> String {
        match &self.source {
            DocumentSource::Site(root) => root
                .join(self.path.trim_start_matches('/'))
                .display()
                .to_string(),
            DocumentSource::Remote(base) => {
                format!("{}/{}", base.trim_end_matches('/'), self.path.trim_start_matches('/'))
            }
        }
    }

    /// Fetch the full document text
    pub async fn fetch(&self) -> Result<String> {
        let location = self.location();
        match &self.source {
            DocumentSource::Site(_) => tokio::fs::read_to_string(&location)
                .await
                .with_context(|| format!("failed to read {}", location)),
            DocumentSource::Remote(_) => {
                let response = reqwest::get(&location)
                    .await
                    .with_context(|| format!("failed to fetch {}", location))?
                    .error_for_status()
                    .with_context(|| format!("failed to fetch {}", location))?;
                response
                    .text()
                    .await
                    .with_context(|| format!("failed to read body of {}", location))
            }
        }
    }
}

/// Fetch the companion document and copy it, driving `control`
///
/// Returns the number of bytes copied.
pub async fn copy_companion_document(
    document: &CompanionDocument,
    clipboard: &mut dyn Clipboard,
    control: &CopyControl,
) -> Result<usize> {
    let result = match document.fetch().await {
        Ok(text) => clipboard.set_text(&text).map(|()| text.len()),
        Err(e) => Err(e),
    };
    control.settle(&result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    const TICK: Duration = Duration::from_millis(1);

    #[test]
    fn test_system_clipboard_hold() {
        assert_eq!(SystemClipboard::new().hold(), None);
        let held = SystemClipboard::holding_for(Duration::from_secs(30));
        assert_eq!(held.hold(), Some(Duration::from_secs(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_snippet_copy_confirms_then_reverts() {
        let mut clipboard = MemoryClipboard::new();
        let control = CopyControl::snippet();
        assert_eq!(control.label(), SNIPPET_IDLE_LABEL);

        copy_snippet(&mut clipboard, &control, "cargo install slag")
            .await
            .unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("cargo install slag"));
        assert_eq!(control.state(), ControlState::Copied);
        assert_eq!(control.label(), SNIPPET_COPIED_LABEL);

        sleep(SNIPPET_REVERT - TICK).await;
        assert_eq!(control.state(), ControlState::Copied);
        sleep(TICK * 2).await;
        assert_eq!(control.state(), ControlState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snippet_copy_failure_reports_then_reverts() {
        let mut clipboard = MemoryClipboard::failing();
        let control = CopyControl::snippet();

        let result = copy_snippet(&mut clipboard, &control, "x").await;
        assert!(result.is_err());
        assert_eq!(control.state(), ControlState::Failed);
        assert_eq!(control.label(), SNIPPET_ERROR_LABEL);
        assert!(clipboard.contents().is_none());

        sleep(SNIPPET_REVERT + TICK).await;
        assert_eq!(control.state(), ControlState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_document_copy_from_site_directory() {
        let site = tempfile::TempDir::new().unwrap();
        std::fs::write(site.path().join("slag.md"), "# slag\n\nforge it\n").unwrap();
        let document =
            CompanionDocument::new(DocumentSource::Site(site.path().to_path_buf()), "/slag.md");
        let mut clipboard = MemoryClipboard::new();
        let control = CopyControl::document();

        let copied = copy_companion_document(&document, &mut clipboard, &control)
            .await
            .unwrap();
        assert_eq!(copied, "# slag\n\nforge it\n".len());
        assert_eq!(clipboard.contents().as_deref(), Some("# slag\n\nforge it\n"));
        assert_eq!(control.label(), DOCUMENT_COPIED_LABEL);

        sleep(DOCUMENT_REVERT + TICK).await;
        assert_eq!(control.label(), DOCUMENT_IDLE_LABEL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_document_fetch_failure_shows_error() {
        let site = tempfile::TempDir::new().unwrap();
        let document =
            CompanionDocument::new(DocumentSource::Site(site.path().to_path_buf()), "/slag.md");
        let mut clipboard = MemoryClipboard::new();
        let control = CopyControl::document();

        let err = copy_companion_document(&document, &mut clipboard, &control)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("slag.md"));
        assert_eq!(control.label(), DOCUMENT_ERROR_LABEL);
        assert!(clipboard.contents().is_none());

        sleep(DOCUMENT_REVERT - TICK).await;
        assert_eq!(control.label(), DOCUMENT_ERROR_LABEL);
        sleep(TICK * 2).await;
        assert_eq!(control.label(), DOCUMENT_IDLE_LABEL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let mut clipboard = MemoryClipboard::new();
        let control = CopyControl::snippet();
        let mut rx = control.subscribe();

        copy_snippet(&mut clipboard, &control, "x").await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ControlState::Copied);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ControlState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_copies_each_schedule_a_revert() {
        let mut clipboard = MemoryClipboard::new();
        let control = CopyControl::snippet();

        copy_snippet(&mut clipboard, &control, "a").await.unwrap();
        sleep(Duration::from_millis(1000)).await;
        copy_snippet(&mut clipboard, &control, "b").await.unwrap();

        // The first revert fires 1500ms after the first copy
        sleep(Duration::from_millis(500) + TICK).await;
        assert_eq!(control.state(), ControlState::Idle);
        assert_eq!(clipboard.contents().as_deref(), Some("b"));
    }

    #[test]
    fn test_document_location() {
        let remote = CompanionDocument::new(
            DocumentSource::Remote("https://slag.dev/".to_string()),
            "/slag.md",
        );
        assert_eq!(remote.location(), "https://slag.dev/slag.md");

        let site = CompanionDocument::new(DocumentSource::Site(PathBuf::from("dist")), "/slag.md");
        assert_eq!(
            PathBuf::from(site.location()),
            PathBuf::from("dist").join("slag.md")
        );
    }

    #[test]
    fn test_labels_for_state() {
        let labels = CopyControl::document().labels();
        assert_eq!(labels.for_state(ControlState::Idle), "Copy as Markdown");
        assert_eq!(labels.for_state(ControlState::Copied), "Copied!");
        assert_eq!(labels.for_state(ControlState::Failed), "Error");
    }

    /// Serve one HTTP response on a local port, returning the base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "{}\r\nContent-Type: text/markdown\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_document_copy_from_remote_site() {
        let base = serve_once("HTTP/1.1 200 OK", "# slag\n").await;
        let document = CompanionDocument::new(DocumentSource::Remote(base), "/slag.md");
        let mut clipboard = MemoryClipboard::new();
        let control = CopyControl::document();

        let copied = copy_companion_document(&document, &mut clipboard, &control)
            .await
            .unwrap();
        assert_eq!(copied, "# slag\n".len());
        assert_eq!(clipboard.contents().as_deref(), Some("# slag\n"));
        assert_eq!(control.label(), DOCUMENT_COPIED_LABEL);
    }

    #[tokio::test]
    async fn test_document_not_found_on_remote_site_is_an_error() {
        let base = serve_once("HTTP/1.1 404 Not Found", "missing").await;
        let document = CompanionDocument::new(DocumentSource::Remote(base), "/slag.md");
        let mut clipboard = MemoryClipboard::new();
        let control = CopyControl::document();

        let result = copy_companion_document(&document, &mut clipboard, &control).await;
        assert!(result.is_err());
        assert_eq!(clipboard.contents(), None);
        assert_eq!(control.label(), DOCUMENT_ERROR_LABEL);
    }
}
