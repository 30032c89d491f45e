// Tier 2: JWT authentication required, handlers receive `Extension<Caller>`
pub mod images;
pub mod news;
pub mod projects;
pub mod teams;
pub mod users;
