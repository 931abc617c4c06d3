// Bearer-token authentication.
//
// `POST /auth/login` with `{ email, password }` answers with an access
// token and the authenticated user. The token is stored on the client and
// attached to every subsequent request.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};

use crate::client::PodoscanClient;
use crate::error::Error;
use crate::types::AuthSession;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl PodoscanClient {
    /// Authenticate and install the returned bearer token.
    ///
    /// A `401` from the server surfaces as [`Error::Authentication`].
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthSession, Error> {
        debug!(email, "logging in");
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };

        let session: AuthSession = self.post("auth/login", &body).await?;
        self.set_token(session.access_token.clone());
        info!(user = %session.user.fullname, kind = %session.user.kind, "authenticated");
        Ok(session)
    }

    /// Forget the bearer token. The API has no server-side logout.
    pub fn logout(&self) {
        debug!("discarding bearer token");
        self.clear_token();
    }
}
