//! The scoped capture lifecycle around one fragment render.
//!
//! A session wraps a single `Idle → Capturing → Idle` pass: probe the
//! store for the fragment's fingerprint, and on a miss capture the
//! rendered text and commit it under that fingerprint. Capture state lives
//! in an explicit [`Capture`] handle rather than an ambient output buffer,
//! so release is visible in the types; [`FragmentSession::capture_with`]
//! additionally guarantees release on error paths.

use std::fmt;

use velum_common::Fingerprint;

use crate::error::CacheError;
use crate::store::CacheStore;

/// Expiration applied to every committed fragment, in seconds.
pub const FRAGMENT_TTL_SECS: u64 = 60;

/// Buffer accumulating rendered output between `start()` and `stop()`.
///
/// The handle is owned by the caller for the duration of the capture and
/// handed back to [`FragmentSession::stop`] (or
/// [`FragmentSession::abort`]) to end it. Implements [`fmt::Write`], so
/// `write!` works directly against it. Only [`FragmentSession::start`]
/// hands one out: a capture always belongs to a running capture scope.
#[derive(Debug)]
pub struct Capture {
    buf: String,
}

impl Capture {
    fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Appends rendered text to the capture.
    pub fn push_str(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Returns the text captured so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Write for Capture {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

/// One fragment's capture lifecycle against the external store.
///
/// Single-shot and non-reentrant: a second `start()` before `stop()` is a
/// programming error. Nested fragment capture needs disjoint sessions per
/// fragment.
#[derive(Debug)]
pub struct FragmentSession {
    fingerprint: Fingerprint,
    content: Option<String>,
    started: bool,
}

impl FragmentSession {
    /// Creates an idle session for the given fragment fingerprint.
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            content: None,
            started: false,
        }
    }

    /// Returns the fragment fingerprint this session is keyed under.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Probes the store for this fragment.
    ///
    /// On a hit the stored content becomes the session content and `false`
    /// is returned; the caller reuses it and skips rendering. On a miss
    /// returns `true` and the caller is expected to `start()` a capture.
    pub fn expired(&mut self, store: &dyn CacheStore) -> Result<bool, CacheError> {
        self.content = store.get(&self.fingerprint.to_string())?;
        Ok(self.content.is_none())
    }

    /// Begins capturing rendered output.
    ///
    /// Fails with [`CacheError::SessionAlreadyStarted`] while a capture is
    /// in flight.
    pub fn start(&mut self) -> Result<Capture, CacheError> {
        if self.started {
            return Err(CacheError::SessionAlreadyStarted);
        }
        self.started = true;
        Ok(Capture::new())
    }

    /// Ends the capture and commits the text to the store.
    ///
    /// The captured text is stored under the session fingerprint with a
    /// fixed [`FRAGMENT_TTL_SECS`] expiration and becomes the session
    /// content. A no-op when the session is not capturing.
    pub fn stop(&mut self, capture: Capture, store: &dyn CacheStore) -> Result<(), CacheError> {
        if !self.started {
            return Ok(());
        }
        self.started = false;

        let content = capture.into_string();
        store.put(&self.fingerprint.to_string(), &content, FRAGMENT_TTL_SECS)?;
        self.content = Some(content);
        Ok(())
    }

    /// Releases a capture without committing anything.
    ///
    /// The error-path counterpart of [`stop`](Self::stop): the session
    /// returns to idle and the buffered text is discarded.
    pub fn abort(&mut self, capture: Capture) {
        drop(capture);
        self.started = false;
    }

    /// Runs `render` inside a capture scope, committing on success.
    ///
    /// The session is guaranteed to be idle afterwards on every exit path:
    /// a render error aborts the capture before propagating, so no
    /// capturing state leaks past the call.
    pub fn capture_with<F>(
        &mut self,
        store: &dyn CacheStore,
        render: F,
    ) -> Result<&str, CacheError>
    where
        F: FnOnce(&mut Capture) -> Result<(), CacheError>,
    {
        let mut capture = self.start()?;
        match render(&mut capture) {
            Ok(()) => {
                self.stop(capture, store)?;
                Ok(self.content.as_deref().unwrap_or_default())
            }
            Err(e) => {
                self.abort(capture);
                Err(e)
            }
        }
    }

    /// Returns the most recently captured or retrieved content.
    ///
    /// `None` before the first successful `expired`/`stop` cycle.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Consumes the session, returning its content.
    pub fn into_content(self) -> Option<String> {
        self.content
    }
}
