//! Command builders for binary tests
//!
//! Commands start from a clean environment so a developer's own token or
//! base URL never leaks into a test run.

use assert_cmd::Command;

/// Variables the server reads, removed from every test command
const READER_ENV_VARS: [&str; 3] = ["ACCESS_TOKEN", "READER_ACCESS_TOKEN", "READER_API_BASE_URL"];

/// Get a Command for the `reader_mcp` binary with clean environment
pub fn reader_mcp_command() -> Command {
    command_for("reader_mcp")
}

/// Get a Command for a specific binary with clean environment
///
/// `RUST_LOG` is forced to `warn` to keep test output quiet.
#[allow(deprecated)]
pub fn command_for(bin_name: &str) -> Command {
    let mut cmd = Command::cargo_bin(bin_name)
        .unwrap_or_else(|_| panic!("Failed to find {} binary", bin_name));
    cmd.env("RUST_LOG", "warn");
    for var in READER_ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}
