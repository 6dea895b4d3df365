//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.
//! clap exits with 2 on its own usage errors, so 2 is not reused here.

/// Success - operation completed without errors
pub const SUCCESS: u8 = 0;

/// General error - unspecified failure
pub const ERROR: u8 = 1;

/// Manifest error - unreadable document, no or several Deployments, bad Deployment shape
pub const MANIFEST_ERROR: u8 = 3;

/// IO error - file not found, permission denied, broken pipe, etc.
pub const IO_ERROR: u8 = 5;

/// Configuration error - invalid option value or resource quantity (sysexits.h EX_USAGE)
pub const CONFIG_ERROR: u8 = 64;
