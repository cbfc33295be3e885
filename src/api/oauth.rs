//! Google OAuth for the Sheets API.
//!
//! [`TokenProvider::initialize`] runs the consent flow once: it prints the Google consent URL,
//! catches the redirect on a local loopback server, exchanges the code and saves `token.json`.
//! Afterwards [`TokenProvider::load`] reads the saved token and refreshes it as it nears expiry.

use crate::api::files::{File, SecretFile, TokenFile};
use crate::api::OAUTH_SCOPES;
use crate::Result;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Holds a valid access token and knows how to refresh it.
pub(crate) struct TokenProvider {
    client: OAuthClient,
    http: reqwest::Client,
    token_file: File<TokenFile>,
}

impl TokenProvider {
    /// Runs the interactive consent flow and saves the resulting tokens to `token_path`.
    pub(crate) async fn initialize(
        secret_path: impl AsRef<Path>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let secret = SecretFile::load(secret_path.as_ref()).await?;
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Unable to start the local OAuth callback server")?;
        let port = listener
            .local_addr()
            .context("Unable to read the callback server address")?
            .port();
        let redirect = format!("http://127.0.0.1:{port}");
        let client = oauth_client(&secret)?.set_redirect_uri(
            RedirectUrl::new(redirect.clone()).context("Invalid OAuth redirect URL")?,
        );
        let http = http_client()?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Open this URL in your browser to authorize bookwheel:\n\n{auth_url}\n");
        info!("Waiting for the authorization redirect on {redirect}");
        let callback = wait_for_callback(listener).await?;
        if let Some(error) = callback.error {
            bail!("Authorization was not granted: {error}");
        }
        if callback.state.as_deref() != Some(csrf.secret().as_str()) {
            bail!("The OAuth state returned by Google does not match, aborting");
        }
        let code = callback
            .code
            .context("The OAuth callback did not include an authorization code")?;

        let response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http)
            .await
            .context("Unable to exchange the authorization code for a token")?;
        let refresh_token = response
            .refresh_token()
            .context("Google did not return a refresh token")?
            .secret()
            .to_string();
        let scopes = match response.scopes() {
            Some(scopes) => scopes.iter().map(|s| s.to_string()).collect(),
            None => OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
        };
        let token = TokenFile::new(
            scopes,
            response.access_token().secret().to_string(),
            refresh_token,
            expires_at(&response),
        );
        token.validate_scopes()?;
        let token_file = File::new(token_path, token);
        token_file.save().await?;
        info!("Tokens saved to {}", token_file.path().display());

        Ok(Self {
            client,
            http,
            token_file,
        })
    }

    /// Loads previously saved tokens. Never opens a browser.
    pub(crate) async fn load(
        secret_path: impl AsRef<Path>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let secret = SecretFile::load(secret_path.as_ref()).await?;
        let token_file: File<TokenFile> = File::load(token_path)
            .await
            .context("Unable to load the OAuth token file")?;
        token_file.data().validate_scopes()?;
        Ok(Self {
            client: oauth_client(&secret)?,
            http: http_client()?,
            token_file,
        })
    }

    /// The current access token, which may be expired.
    pub(crate) fn token(&self) -> &str {
        self.token_file.data().access_token()
    }

    /// Uses the refresh token to get a new access token and saves it.
    pub(crate) async fn refresh(&mut self) -> Result<()> {
        let refresh_token = RefreshToken::new(self.token_file.data().refresh_token().to_string());
        let response = self
            .client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .context("Unable to refresh the OAuth token, you may need to run 'bookwheel auth'")?;
        self.token_file.data_mut().update(
            response.access_token().secret().to_string(),
            expires_at(&response),
            response.refresh_token().map(|rt| rt.secret().to_string()),
        );
        self.token_file.save().await?;
        debug!("Refreshed the OAuth access token");
        Ok(())
    }

    /// Returns an access token, refreshing it first if it is about to expire.
    pub(crate) async fn token_with_refresh(&mut self) -> Result<&str> {
        if self.token_file.data().is_expired() {
            self.refresh().await?;
        }
        Ok(self.token())
    }
}

fn oauth_client(secret: &SecretFile) -> Result<OAuthClient> {
    Ok(BasicClient::new(ClientId::new(secret.client_id().to_string()))
        .set_client_secret(ClientSecret::new(secret.client_secret().to_string()))
        .set_auth_uri(AuthUrl::new(secret.auth_uri().to_string()).context("Invalid auth_uri")?)
        .set_token_uri(
            TokenUrl::new(secret.token_uri().to_string()).context("Invalid token_uri")?,
        ))
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Unable to build the HTTP client")
}

fn expires_at(response: &BasicTokenResponse) -> DateTime<Utc> {
    let lifetime = response
        .expires_in()
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .unwrap_or_else(|| chrono::Duration::hours(1));
    Utc::now() + lifetime
}

/// The query parameters Google appends to the redirect.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
struct Callback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl Callback {
    fn from_query(query: &str) -> Self {
        let mut callback = Callback::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => callback.code = Some(value.into_owned()),
                "state" => callback.state = Some(value.into_owned()),
                "error" => callback.error = Some(value.into_owned()),
                _ => {}
            }
        }
        callback
    }

    fn is_complete(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }
}

/// Serves requests on `listener` one connection at a time until one of them carries the OAuth
/// redirect. Anything else, such as a favicon request, gets a short reply and is ignored.
async fn wait_for_callback(listener: TcpListener) -> Result<Callback> {
    let (tx, mut rx) = mpsc::channel::<Callback>(1);
    loop {
        let (stream, _) = listener
            .accept()
            .await
            .context("The OAuth callback server failed to accept a connection")?;
        let tx = tx.clone();
        let service = service_fn(move |req: Request<Incoming>| {
            let tx = tx.clone();
            async move {
                let callback = Callback::from_query(req.uri().query().unwrap_or_default());
                let body = if callback.is_complete() {
                    let _ = tx.send(callback).await;
                    "bookwheel received the authorization, you can close this window."
                } else {
                    "bookwheel is waiting for the Google authorization redirect."
                };
                Ok::<_, Infallible>(Response::new(body.to_string()))
            }
        });
        if let Err(e) = http1::Builder::new()
            .keep_alive(false)
            .serve_connection(TokioIo::new(stream), service)
            .await
        {
            warn!("Error while serving the OAuth callback: {e}");
        }
        if let Ok(callback) = rx.try_recv() {
            return Ok(callback);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[test]
    fn test_callback_from_query() {
        let callback = Callback::from_query("state=abc%3D&code=4%2F0Ad&scope=x");
        assert_eq!(callback.code.as_deref(), Some("4/0Ad"));
        assert_eq!(callback.state.as_deref(), Some("abc="));
        assert!(callback.is_complete());

        let denied = Callback::from_query("error=access_denied&state=abc");
        assert_eq!(denied.error.as_deref(), Some("access_denied"));
        assert!(denied.is_complete());

        assert!(!Callback::from_query("").is_complete());
    }

    async fn get(port: u16, path: &str) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_wait_for_callback() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(wait_for_callback(listener));

        let favicon = get(port, "/favicon.ico").await;
        assert!(favicon.contains("waiting"));
        let done = get(port, "/?state=s1&code=c1").await;
        assert!(done.contains("you can close this window"));

        let callback = server.await.unwrap().unwrap();
        assert_eq!(callback.code.as_deref(), Some("c1"));
        assert_eq!(callback.state.as_deref(), Some("s1"));
    }
}
