//! Role name constants used in JWT claims and authorization checks.

/// Full access: user management, repository and changelog administration.
pub const ROLE_ADMIN: &str = "admin";
/// Can manage repositories, run generations, and edit changelogs.
pub const ROLE_EDITOR: &str = "editor";
/// Read-only access to the internal dashboard.
pub const ROLE_VIEWER: &str = "viewer";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR, ROLE_VIEWER];
