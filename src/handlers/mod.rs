// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (JWT auth, `Caller` in request extensions).
// Lead and admin checks happen inside the protected handlers through `access`.
pub mod protected;
pub mod public;
pub mod root;
pub mod utils;
