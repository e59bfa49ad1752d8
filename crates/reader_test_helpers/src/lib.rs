//! Shared test utilities for the Reader MCP test suites
//!
//! # Modules
//!
//! - [`upstream`]: Stub Reader API on a loopback port
//! - [`fixtures`]: Sample document and list payloads
//! - [`cli`]: Command builders with pre-configured environments
//! - [`logging`]: Test logging configuration and log capture
//! - [`assertions`]: Domain-specific assertion helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use reader_test_helpers::prelude::*;
//!
//! # async fn demo() {
//! let upstream = StubUpstream::list(StubResponse::json(200, list_page(vec![sample_document()], None))).await;
//! println!("point the client at {}", upstream.base_url());
//! # }
//! ```

pub mod assertions;
pub mod cli;
pub mod fixtures;
pub mod logging;
pub mod upstream;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::cli::{command_for, reader_mcp_command};
    pub use crate::fixtures::{list_page, minimal_document, sample_document};
    pub use crate::logging::{init_test_logging, suppress_logs, LogCapture};
    pub use crate::upstream::{RecordedRequest, StubResponse, StubUpstream};
}
