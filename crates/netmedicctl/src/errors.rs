//! Exit status for netmedicctl

/// Every check passed, every repair succeeded
pub const EXIT_SUCCESS: i32 = 0;

/// General error (bad arguments, unknown id, I/O)
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// At least one check reported a warning
pub const EXIT_WARNINGS: i32 = 2;

/// At least one check errored or one repair failed
pub const EXIT_FAILURES: i32 = 3;

/// The run was cancelled before it finished
pub const EXIT_CANCELLED: i32 = 130;
