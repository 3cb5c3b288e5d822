pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
pub use user::{Account, Chairperson, Rights, User};

mod token;
mod user;
