//! Placeholder admin credential
//!
//! This is NOT access control. The expected pair is compiled into the
//! binary and compared in plain text, and the resulting session is a
//! `"true"` string in the user's own storage file. Anyone who can read the
//! source or edit that file is "logged in". It only keeps the inbox out of
//! casual view.

/// Username accepted by the admin login.
pub const ADMIN_USERNAME: &str = "admin";

/// Password accepted by the admin login.
pub const ADMIN_PASSWORD: &str = "admin123";

/// Plain equality check against the placeholder pair.
pub fn matches(username: &str, password: &str) -> bool {
    username == ADMIN_USERNAME && password == ADMIN_PASSWORD
}
