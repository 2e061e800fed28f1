use ntex::{
    http::Payload,
    web::{Error, FromRequest, HttpRequest},
};
use ntex_identity::RequestIdentity;

use crate::front::errors;
use crate::models;

/// Visitor that may or may not be logged in. Guests resolve to `None`.
pub struct MaybeUser(pub Option<models::user::SessionUser>);

impl MaybeUser {
    /// Username sent with the checkout metadata
    pub fn username(&self) -> String {
        self.0
            .clone()
            .unwrap_or_else(models::user::SessionUser::anonymous)
            .username
    }
}

fn serialize_logged_user(str: &str) -> serde_json::Result<models::user::SessionUser> {
    serde_json::from_str::<models::user::SessionUser>(str)
}

/// Extracts the [SessionUser](models::user::SessionUser) from the identity cookie
fn get_logged_user(auth_cookie: Option<String>) -> Result<models::user::SessionUser, Error> {
    match serialize_logged_user(&auth_cookie.unwrap_or_default()) {
        Ok(user) if !user.is_anonymous() && !user.username.is_empty() => Ok(user),
        _ => Err(errors::UserError::Unauthorized.into()),
    }
}

impl<Err> FromRequest<Err> for models::user::SessionUser {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        let identity_cookie = req.get_identity();
        futures::future::ready(get_logged_user(identity_cookie))
    }
}

impl<Err> FromRequest<Err> for MaybeUser {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        let identity_cookie = req.get_identity();
        futures::future::ready(Ok(Self(get_logged_user(identity_cookie).ok())))
    }
}
