pub mod image;
pub mod membership;
pub mod news;
pub mod project;
pub mod team;
pub mod user;

pub use image::{public_image_url, Image, ImageBlob, NewImage};
pub use membership::{Membership, TeamProject};
pub use news::{CoverImage, News, NewsDetails, NewsRow, NewNews};
pub use project::{Project, ProjectDetails, ProjectJoinRow, ProjectSummary};
pub use team::{Team, TeamDetails, TeamJoinRow, TeamSummary};
pub use user::{NewUser, User, UserChanges, UserDetails, UserJoinRow, UserSummary};
