//! Argument sanitization.
//!
//! Every argument token has a fixed set of shell metacharacters removed
//! before it reaches the spawner, which never goes through a shell.
//! The transformation is lossy and applies to every token unconditionally.

/// Characters removed from every argument token.
pub const SHELL_METACHARACTERS: &[char] = &[';', '&', '|', '`', '$', '(', ')'];

/// Whether `token` contains any of [`SHELL_METACHARACTERS`].
pub fn contains_metacharacters(token: &str) -> bool {
    token.contains(SHELL_METACHARACTERS)
}

/// Strip shell metacharacters from a single token.
pub fn sanitize_arg(token: &str) -> String {
    token.chars().filter(|c| !SHELL_METACHARACTERS.contains(c)).collect()
}

/// Sanitize an argument vector, preserving length and order.
///
/// A token made only of metacharacters becomes an empty string rather than
/// disappearing, so positional arguments never shift.
pub fn sanitize_args(args: &[String]) -> Vec<String> {
    args.iter().map(|arg| sanitize_arg(arg)).collect()
}
