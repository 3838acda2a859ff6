// Legacy API HTTP client
//
// A `LegacyClient` is bound to one controller, one site and one platform.
// It owns the session state the controller hands out (cookie jar inside
// `reqwest`, CSRF token here) and turns every response into either the
// envelope's `data` array or a typed `Error`. Endpoint groups live in
// sibling files as inherent methods.

use std::sync::{PoisonError, RwLock};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::models::LegacyResponse;
use crate::transport::TransportConfig;

/// Header carrying the CSRF token on requests and on the login response.
pub(crate) const CSRF_HEADER: &str = "x-csrf-token";
/// Header UniFi OS uses to hand out a replacement token mid-session.
const CSRF_ROTATED_HEADER: &str = "x-updated-csrf-token";

/// Longest body excerpt carried into error messages.
const BODY_PREVIEW_LEN: usize = 200;

pub struct LegacyClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    /// `{base}{prefix}/api/s/{site}/`; endpoint paths are joined onto it.
    site_root: Url,
    site: String,
    pub(crate) platform: ControllerPlatform,
    csrf: RwLock<Option<HeaderValue>>,
}

impl LegacyClient {
    /// Client with its own `reqwest::Client` built from `transport`. A cookie
    /// jar is added when the transport has none, since the session lives in
    /// a cookie.
    pub fn new(
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut transport = transport.clone();
        if transport.cookie_jar.is_none() {
            transport = transport.with_cookie_jar();
        }
        Ok(Self::with_client(
            transport.build_client()?,
            base_url,
            site,
            platform,
        ))
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
    ) -> Self {
        let mut site_root = base_url.clone();
        site_root.set_path(&format!(
            "{}{}/api/s/{site}/",
            base_url.path().trim_end_matches('/'),
            platform.legacy_prefix(),
        ));
        Self {
            http,
            base_url,
            site_root,
            site,
            platform,
            csrf: RwLock::new(None),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.site_root.join(path)?)
    }

    // ── Session token ────────────────────────────────────────────────

    /// Keep whichever CSRF token the response carries, preferring a
    /// rotated one.
    pub(crate) fn remember_csrf(&self, headers: &HeaderMap) {
        let Some(token) = headers
            .get(CSRF_ROTATED_HEADER)
            .or_else(|| headers.get(CSRF_HEADER))
        else {
            return;
        };
        trace!("CSRF token updated");
        *self.csrf.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
    }

    pub(crate) fn forget_csrf(&self) {
        *self.csrf.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .csrf
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// `GET` a site-scoped path and return the envelope's `data`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, Error> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        self.send(self.http.get(url)).await
    }

    /// `POST` a JSON body to a site-scoped path and return the envelope's
    /// `data`.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        self.send(self.http.post(url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>, Error> {
        let resp = self.with_csrf(request).send().await?;
        self.remember_csrf(resp.headers());
        let status = resp.status();
        let body = resp.text().await?;
        decode(status, &body)
    }
}

/// UniFi OS reports some failures as `{"error": {...}}` with HTTP 200.
#[derive(Deserialize)]
struct ProxyError {
    error: Option<ProxyErrorBody>,
}

#[derive(Deserialize)]
struct ProxyErrorBody {
    code: u16,
    #[serde(default)]
    message: String,
}

/// Map one response onto the envelope's `data` or a typed error.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<Vec<T>, Error> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::SessionExpired);
    }
    if !status.is_success() {
        return Err(Error::LegacyApi {
            message: format!("HTTP {status}: {}", preview(body)),
            status: Some(status.as_u16()),
        });
    }

    if let Ok(ProxyError { error: Some(err) }) = serde_json::from_str(body) {
        return Err(match err.code {
            401 => Error::Authentication {
                message: err.message,
            },
            code => Error::LegacyApi {
                message: format!("UniFi OS error {code}: {}", err.message),
                status: Some(code),
            },
        });
    }

    let envelope: LegacyResponse<T> =
        serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        })?;

    if envelope.meta.rc == "ok" {
        return Ok(envelope.data);
    }
    match envelope.meta.msg {
        // The classic controller reports a lost session inside the envelope.
        Some(msg) if msg == "api.err.LoginRequired" => Err(Error::SessionExpired),
        Some(message) => Err(Error::LegacyApi {
            message,
            status: None,
        }),
        None => Err(Error::LegacyApi {
            message: format!("rc={}", envelope.meta.rc),
            status: None,
        }),
    }
}

/// First `BODY_PREVIEW_LEN` bytes of a body, cut on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(BODY_PREVIEW_LEN);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn client(base: &str, platform: ControllerPlatform) -> LegacyClient {
        LegacyClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            "default".into(),
            platform,
        )
    }

    fn decoded(status: u16, body: &str) -> Result<Vec<Value>, Error> {
        decode(StatusCode::from_u16(status).unwrap(), body)
    }

    #[test]
    fn endpoint_on_unifi_os_is_proxied() {
        let url = client("https://192.168.1.1/", ControllerPlatform::UnifiOs)
            .endpoint("stat/sta")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://192.168.1.1/proxy/network/api/s/default/stat/sta"
        );
    }

    #[test]
    fn endpoint_on_classic_controller_has_no_prefix() {
        let url = client("https://controller:8443", ControllerPlatform::ClassicController)
            .endpoint("rest/wlanconf")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://controller:8443/api/s/default/rest/wlanconf"
        );
    }

    #[test]
    fn endpoint_keeps_a_base_path() {
        let url = client("https://gw.example/unifi/", ControllerPlatform::ClassicController)
            .endpoint("stat/health")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://gw.example/unifi/api/s/default/stat/health"
        );
    }

    #[test]
    fn rotated_csrf_token_wins() {
        let client = client("https://192.168.1.1/", ControllerPlatform::UnifiOs);
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_HEADER, HeaderValue::from_static("login"));
        headers.insert(CSRF_ROTATED_HEADER, HeaderValue::from_static("rotated"));

        client.remember_csrf(&headers);
        assert_eq!(
            client.csrf.read().unwrap().as_ref().unwrap(),
            &HeaderValue::from_static("rotated")
        );

        client.forget_csrf();
        assert!(client.csrf.read().unwrap().is_none());
    }

    #[test]
    fn decode_unwraps_ok_envelope() {
        let data = decoded(200, r#"{"meta":{"rc":"ok"},"data":[{"a":1},{"a":2}]}"#).unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn decode_maps_statuses() {
        assert!(matches!(decoded(401, ""), Err(Error::SessionExpired)));
        assert!(matches!(
            decoded(403, "nope"),
            Err(Error::LegacyApi {
                status: Some(403),
                ..
            })
        ));
        assert!(matches!(
            decoded(502, "bad gateway"),
            Err(Error::LegacyApi {
                status: Some(502),
                ..
            })
        ));
    }

    #[test]
    fn decode_maps_envelope_and_proxy_errors() {
        assert!(matches!(
            decoded(200, r#"{"meta":{"rc":"error","msg":"api.err.LoginRequired"}}"#),
            Err(Error::SessionExpired)
        ));
        assert!(matches!(
            decoded(200, r#"{"meta":{"rc":"error"}}"#),
            Err(Error::LegacyApi { ref message, .. }) if message == "rc=error"
        ));
        assert!(matches!(
            decoded(200, r#"{"error":{"code":401,"message":"Unauthorized"}}"#),
            Err(Error::Authentication { .. })
        ));
        assert!(matches!(
            decoded(200, r#"{"error":{"code":429}}"#),
            Err(Error::LegacyApi {
                status: Some(429),
                ..
            })
        ));
        assert!(matches!(
            decoded(200, "<html>"),
            Err(Error::Deserialization { .. })
        ));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let cut = preview(&body);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(body.starts_with(cut));
    }
}
