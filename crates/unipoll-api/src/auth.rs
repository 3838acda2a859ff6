// Controller platform and login credentials
//
// UniFi OS consoles proxy the Network application under `/proxy/network`
// and authenticate at `/api/auth/*`; a standalone Network application
// serves both at the root. Everything path-related hangs off
// `ControllerPlatform` so the client never branches on it itself.

use reqwest::StatusCode;
use secrecy::SecretString;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Which flavour of controller sits behind the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UniFi OS console (UDM, UCG, Cloud Key Gen2+).
    UnifiOs,
    /// Standalone Network Application, usually on port 8443.
    ClassicController,
}

impl ControllerPlatform {
    /// Prepended to every `/api/s/{site}/...` path.
    pub fn legacy_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    pub fn login_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::ClassicController => "/api/login",
        }
    }

    pub fn logout_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/logout",
            Self::ClassicController => "/api/logout",
        }
    }

    /// Work out the platform from how the controller answers a `GET` on
    /// the UniFi OS login path.
    ///
    /// Any status but 404 there means UniFi OS (it answers 401 or 405). A
    /// 404 or a failed request falls through to the classic login path, which
    /// only has to answer at all.
    pub async fn detect(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;

        let login_url = base_url.join(Self::UnifiOs.login_path())?;
        match http.get(login_url).send().await {
            Ok(resp) if resp.status() != StatusCode::NOT_FOUND => {
                debug!(status = %resp.status(), "UniFi OS login path answered");
                return Ok(Self::UnifiOs);
            }
            Ok(_) => debug!("no UniFi OS login path"),
            Err(e) => debug!(error = %e, "UniFi OS login path unreachable"),
        }

        let login_url = base_url.join(Self::ClassicController.login_path())?;
        let resp = http.get(login_url).send().await?;
        debug!(status = %resp.status(), "classic login path answered");
        Ok(Self::ClassicController)
    }
}

/// Username and password for the legacy session login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ControllerPlatform;

    #[test]
    fn unifi_os_paths_are_proxied() {
        let p = ControllerPlatform::UnifiOs;
        assert_eq!(p.legacy_prefix(), "/proxy/network");
        assert_eq!(p.login_path(), "/api/auth/login");
        assert_eq!(p.logout_path(), "/api/auth/logout");
    }

    #[test]
    fn classic_paths_have_no_prefix() {
        let p = ControllerPlatform::ClassicController;
        assert_eq!(p.legacy_prefix(), "");
        assert_eq!(p.login_path(), "/api/login");
        assert_eq!(p.logout_path(), "/api/logout");
    }
}
