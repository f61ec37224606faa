//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, bad glob pattern)         |
//! | 3    | Workbook could not be opened                         |
//! | 4    | Sheet configuration or settings invalid              |
//! | 5    | No snapshot history (or unknown sheet in history)    |
//! | 6    | Output could not be written                          |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use qatrack_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Workbook missing, unreadable, or not a spreadsheet.
pub const EXIT_WORKBOOK_OPEN: u8 = 3;

/// Sheet configuration failed to read, parse or validate.
pub const EXIT_CONFIG_INVALID: u8 = 4;

/// No snapshot files matched, or none contained rows.
pub const EXIT_NO_HISTORY: u8 = 5;

/// Report, JSON or CSV output could not be written.
pub const EXIT_WRITE_FAILED: u8 = 6;

/// Map an IoError to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Open { .. } => EXIT_WORKBOOK_OPEN,
        IoError::Write { .. } | IoError::Json(_) => EXIT_WRITE_FAILED,
        IoError::NoHistory { .. } => EXIT_NO_HISTORY,
        IoError::Pattern { .. } => EXIT_USAGE,
        IoError::Read { .. } | IoError::Csv { .. } => EXIT_ERROR,
    }
}
