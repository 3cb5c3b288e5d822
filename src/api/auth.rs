use log::info;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::session::{AccountCredentials, Session},
        auth::{Account, AuthToken, AUTH_TOKEN_COOKIE},
    },
};

pub fn routes() -> Vec<Route> {
    routes![login, session, no_session, logout]
}

#[post("/auth", data = "<credentials>", format = "json")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<AccountCredentials>,
    config: &State<Config>,
) -> Result<Json<Session>> {
    if credentials.secret.is_empty() {
        return Err(Error::Status(
            Status::BadRequest,
            "Account secret must not be empty".to_string(),
        ));
    }

    let token = AuthToken::<Account>::new(credentials.address(), config.chairperson());
    let session = token.session();
    cookies.add(token.into_cookie(config)?);
    info!("Logged in {} as {}", session.address, session.rights);

    Ok(Json(session))
}

#[get("/auth")]
pub fn session(token: AuthToken<Account>) -> Json<Session> {
    Json(token.session())
}

#[get("/auth", rank = 2)]
fn no_session() -> Error {
    Error::Status(Status::Unauthorized, "Not logged in".to_string())
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
