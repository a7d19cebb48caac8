//! Error codes and exit status for faqctl

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when daemon returns invalid JSON
pub const EXIT_INVALID_RESPONSE: i32 = 65;

/// Exit code when daemon is unavailable/unreachable
pub const EXIT_DAEMON_UNAVAILABLE: i32 = 70;
