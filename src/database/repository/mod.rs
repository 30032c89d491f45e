//! Hand-written SQL for each table. Every function takes the pool it runs on
//! and only ever sees active (`deleted_at IS NULL`) rows unless it says otherwise.

pub mod images;
pub mod memberships;
pub mod news;
pub mod projects;
pub mod teams;
pub mod users;
