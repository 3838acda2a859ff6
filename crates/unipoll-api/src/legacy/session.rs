// Legacy session
//
// One cookie-backed session per `LegacyClient`. `login` plants the session
// cookie in the client's jar and keeps the CSRF token the controller hands
// back; `logout` ends the session and drops that token again.

use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;

use crate::auth::Credentials;
use crate::error::Error;
use crate::legacy::client::{LegacyClient, preview};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

impl LegacyClient {
    /// Open a session with `credentials`.
    ///
    /// A 5xx is reported as a (transient) API error; any other refusal is
    /// an authentication failure, which the caller should not retry with
    /// the same credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), Error> {
        let url = self.base_url.join(self.platform.login_path())?;
        debug!(%url, username = %credentials.username, "logging in");

        let body = LoginRequest {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        };
        let resp = self.http.post(url).json(&body).send().await?;
        self.remember_csrf(resp.headers());

        let status = resp.status();
        if status.is_success() {
            debug!("session established");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        if status.is_server_error() {
            return Err(Error::LegacyApi {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
                status: Some(status.as_u16()),
            });
        }
        Err(Error::Authentication {
            message: format!("login rejected (HTTP {status}): {}", preview(&body)),
        })
    }

    /// End the session. The CSRF token is dropped whether or not the
    /// controller accepted the request.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.base_url.join(self.platform.logout_path())?;
        debug!(%url, "logging out");

        let sent = self.with_csrf(self.http.post(url)).send().await;
        self.forget_csrf();
        let status = sent?.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Error::LegacyApi {
            message: format!("logout failed (HTTP {status})"),
            status: Some(status.as_u16()),
        })
    }
}
