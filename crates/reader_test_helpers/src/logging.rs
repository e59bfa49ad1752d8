//! Test logging configuration
//!
//! Global setup for quiet test runs, plus [`LogCapture`] for tests that need
//! to inspect what the crate logged (for example that a token never leaks).

use std::io;
use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Install a global test subscriber at `level` (RUST_LOG wins if set).
///
/// Only the first call in a test process has any effect.
pub fn init_test_logging(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Only errors reach the test output
pub fn suppress_logs() {
    init_test_logging("error");
}

/// In-memory log sink.
///
/// ```rust
/// use reader_test_helpers::logging::LogCapture;
///
/// let capture = LogCapture::new();
/// let _guard = tracing::subscriber::set_default(capture.subscriber());
/// tracing::debug!("hello");
/// assert!(capture.contents().contains("hello"));
/// ```
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriber writing every event at debug level or above into this capture
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new("debug"))
            .with_ansi(false)
            .with_writer(self.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }
}

pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buf: self.buf.clone(),
        }
    }
}
