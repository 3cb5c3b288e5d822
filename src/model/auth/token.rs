use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite, Status},
    outcome::{try_outcome, IntoOutcome},
    request::{FromRequest, Outcome},
    time::Duration,
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::{address::Address, api::session::Session};

use super::user::{Rights, User};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token representing a specific account with specific rights.
#[derive(Serialize, Deserialize)]
pub struct AuthToken<U> {
    #[serde(rename = "adr")]
    pub address: Address,
    #[serde(rename = "rgt")]
    pub rights: Rights,
    #[serde(skip)]
    phantom: PhantomData<U>,
}

impl<U> AuthToken<U> {
    /// Create a token for `address`, with chairperson rights iff it is the
    /// chairperson's address.
    pub fn new(address: Address, chairperson: Address) -> Self {
        let rights = if address == chairperson {
            Rights::Chairperson
        } else {
            Rights::Account
        };
        Self {
            address,
            rights,
            phantom: PhantomData,
        }
    }

    /// Does this token permit the given rights?
    pub fn permits(&self, target: Rights) -> bool {
        self.rights >= target
    }

    /// The session this token represents.
    pub fn session(&self) -> Session {
        Session {
            address: self.address,
            rights: self.rights,
        }
    }

    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>, Error> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self, Error> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<U>>| claims.claims.token)?;
        Ok(token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<U> {
    #[serde(flatten, bound = "")]
    token: AuthToken<U>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r, U> FromRequest<'r> for AuthToken<U>
where
    U: User,
{
    type Error = Error;

    /// Get an AuthToken from the cookie and verify that it has sufficient
    /// rights for this user type.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = req.guard::<&State<Config>>().await.unwrap(); // Valid as `Config` is always managed

        let cookie = try_outcome!(req.cookies().get(AUTH_TOKEN_COOKIE).or_forward(()));
        let token: Self =
            try_outcome!(Self::from_cookie(cookie, config).into_outcome(Status::Unauthorized));

        if token.permits(U::RIGHTS) {
            Outcome::Success(token)
        } else {
            Outcome::Forward(())
        }
    }
}
