// Tier 1: no authentication required
pub mod images;
pub mod news;
pub mod users;

pub use images::get_image;
pub use news::{get_news, list_news};
pub use users::{login, signup};
