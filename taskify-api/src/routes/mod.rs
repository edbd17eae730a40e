/// API route handlers
///
/// Each module maps one resource to its handlers. Responses wrap their
/// payload in a named envelope (`{"task": ...}`, `{"projects": ...}`)
/// matching what the frontend expects.

pub mod comments;
pub mod health;
pub mod help;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod ws;
