//! Service Layer
//!
//! Business logic for users, biodatas, contact requests and favourites, plus
//! the clients for the identity provider and the image host.

pub mod access;
pub mod biodata;
pub mod contact_request;
pub mod favourite;
pub mod identity;
pub mod image_store;
pub mod user;

// Re-export services
pub use access::{AccessPolicy, Viewer};
pub use biodata::BiodataService;
pub use contact_request::ContactRequestService;
pub use favourite::FavouriteService;
pub use identity::{IdentityError, IdentityProvider, JwtIdentityProvider};
pub use image_store::{ImageStore, ImageStoreError, ImageUpload, ImgbbImageStore};
pub use user::UserService;
