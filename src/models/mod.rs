//! Data Models Module
//!
//! Data structures used throughout the biodata service: stored records,
//! request/response payloads and identity types.

pub mod auth;
pub mod biodata;
pub mod contact_request;
pub mod favourite;
pub mod requests;
pub mod user;

// Re-export commonly used types
pub use auth::{IdTokenClaims, Identity, ISSUER_PREFIX};
pub use biodata::{
    Biodata, BiodataFilter, BiodataInput, BiodataPage, BiodataProfile, BiodataType,
    ContactDetails, NewBiodata,
};
pub use contact_request::{
    ContactRequest, ContactRequestDetails, ContactStatus, Decision, MyContactRequest, Transition,
};
pub use favourite::{Favourite, FavouriteWithBiodata};
pub use requests::*;
pub use user::{NewUser, Role, User};
