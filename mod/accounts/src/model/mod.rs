pub mod profile;
pub mod registration;
pub mod token;
pub mod user;

pub use profile::{CreateProfile, Gender, MaritalStatus, Profile, UpdateProfile};
pub use registration::{Principal, RegisterRequest, RegisterResponse};
pub use token::{Claims, TokenPair};
pub use user::{CreateUser, LoginRequest, Role, UpdateUserRole, User, UserPublic};
