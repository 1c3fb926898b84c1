//! OAuth2 client configuration and flows

use std::fmt;
use std::sync::Arc;

use tern_domain::{GrantKind, HttpMethod, OAuth2Error, OAuth2Result, RequestDescriptor, Token};
use tracing::{debug, warn};
use url::Url;

use crate::oauth2::codec::{self, ExchangeGrant};
use crate::ports::HttpTransport;

/// OAuth2 client configuration for one protected resource.
///
/// The config owns the grant parameters, the anti-forgery state, and the
/// current [`Token`], and drives the flows against an injected
/// [`HttpTransport`]. Flow methods take `&mut self`, so at most one exchange
/// can be in flight per config at a time; callers that share a config across
/// tasks must serialize access themselves.
///
/// Stored state only changes on full success: a failed exchange or a
/// rejected redirect leaves the previous token and state untouched.
#[derive(Clone)]
pub struct OAuth2Config {
    transport: Arc<dyn HttpTransport>,
    client_id: String,
    client_secret: String,
    authorization_endpoint: String,
    token_endpoint: String,
    redirect_uri: String,
    scope: String,
    state: String,
    grant: GrantKind,
    http_basic_auth: bool,
    bearer_auth: bool,
    access_token_query_key: String,
    token: Token,
}

impl OAuth2Config {
    /// Creates a configuration for the given client registration.
    ///
    /// Defaults: authorization code grant, HTTP Basic client authentication,
    /// bearer-header credential placement, query key `access_token`, no
    /// scope, no state, and an invalid token.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorization_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: token_endpoint.into(),
            redirect_uri: redirect_uri.into(),
            scope: String::new(),
            state: String::new(),
            grant: GrantKind::default(),
            http_basic_auth: true,
            bearer_auth: true,
            access_token_query_key: "access_token".to_string(),
            token: Token::default(),
        }
    }

    /// Builds the authorization request URI for this configuration.
    ///
    /// With `generate_state`, a fresh unguessable state value replaces the
    /// stored one before the URI is assembled. Without it, the output is
    /// deterministic for a fixed configuration.
    pub fn build_authorization_uri(&mut self, generate_state: bool) -> String {
        if generate_state {
            self.state = codec::generate_state();
        }
        codec::build_authorization_uri(
            &self.authorization_endpoint,
            self.grant,
            &self.client_id,
            &self.redirect_uri,
            &self.state,
            &self.scope,
        )
    }

    /// Completes authorization from the redirected URI.
    ///
    /// For the implicit grant the access token is read from the URI fragment
    /// with no network round-trip; for the authorization code grant the code
    /// is read from the URI query and exchanged at the token endpoint. In
    /// both cases the echoed `state` must match the stored state.
    ///
    /// # Errors
    ///
    /// Fails with [`OAuth2Error::StateMismatch`] on a state that does not
    /// match, [`OAuth2Error::MalformedRedirect`] on a missing required
    /// parameter, or any exchange error. The stored token is unchanged on
    /// failure.
    pub async fn token_from_redirected_uri(
        &mut self,
        redirected_uri: &str,
    ) -> OAuth2Result<Token> {
        let url = Url::parse(redirected_uri)
            .map_err(|e| OAuth2Error::MalformedRedirect(format!("invalid redirect URI: {e}")))?;

        if self.grant.is_implicit() {
            let params = codec::fragment_params(&url);
            let state = codec::find_param(&params, "state")
                .ok_or_else(|| missing_redirect_param("state"))?;
            self.verify_state(state)?;
            let access_token = codec::find_param(&params, "access_token")
                .ok_or_else(|| missing_redirect_param("access_token"))?;

            let mut token = Token::new(access_token);
            if let Some(token_type) = codec::find_param(&params, "token_type") {
                token = token.with_token_type(token_type);
            }
            if let Some(expires_in) = codec::find_param(&params, "expires_in")
                .and_then(|value| value.parse::<i64>().ok())
            {
                token = token.with_expires_in(expires_in);
            }

            debug!("accepting token from implicit-grant redirect");
            self.token = token.clone();
            Ok(token)
        } else {
            let params = codec::query_params(&url);
            let state = codec::find_param(&params, "state")
                .ok_or_else(|| missing_redirect_param("state"))?;
            self.verify_state(state)?;
            let code = codec::find_param(&params, "code")
                .ok_or_else(|| missing_redirect_param("code"))?
                .to_string();

            self.token_from_code(&code).await
        }
    }

    /// Exchanges an authorization code for a token and stores the result.
    ///
    /// # Errors
    ///
    /// Fails with a network-class error when the transport fails or the
    /// token endpoint answers with a non-success status, or a protocol-class
    /// error when the response body cannot be parsed. The stored token is
    /// unchanged on failure.
    pub async fn token_from_code(&mut self, code: &str) -> OAuth2Result<Token> {
        let grant = ExchangeGrant::AuthorizationCode {
            code: code.to_string(),
            redirect_uri: self.redirect_uri.clone(),
        };
        self.exchange(grant).await
    }

    /// Obtains a fresh token from the stored refresh token.
    ///
    /// If the response carries a new refresh token it replaces the stored
    /// one; otherwise the previous refresh token is retained.
    ///
    /// # Errors
    ///
    /// Fails with [`OAuth2Error::MissingRefreshToken`] when no refresh token
    /// is stored, otherwise like [`Self::token_from_code`].
    pub async fn token_from_refresh(&mut self) -> OAuth2Result<Token> {
        let refresh_token = self.token.refresh_token().to_string();
        if refresh_token.is_empty() {
            return Err(OAuth2Error::MissingRefreshToken);
        }
        let grant = ExchangeGrant::RefreshToken {
            refresh_token,
            scope: self.scope.clone(),
        };
        self.exchange(grant).await
    }

    /// Obtains a token directly from the client credentials.
    ///
    /// # Errors
    ///
    /// Like [`Self::token_from_code`].
    pub async fn token_from_client_credentials(&mut self) -> OAuth2Result<Token> {
        let grant = ExchangeGrant::ClientCredentials {
            scope: self.scope.clone(),
        };
        self.exchange(grant).await
    }

    /// One shared exchange primitive for every grant.
    async fn exchange(&mut self, grant: ExchangeGrant) -> OAuth2Result<Token> {
        let body_credentials = (!self.http_basic_auth)
            .then_some((self.client_id.as_str(), self.client_secret.as_str()));
        let body = grant.form_body(body_credentials)?;

        let mut request = RequestDescriptor::new(HttpMethod::Post, self.token_endpoint.clone())
            .with_header("Content-Type", codec::FORM_CONTENT_TYPE)
            .with_body(body.into_bytes());
        if self.http_basic_auth {
            request.set_header(
                "Authorization",
                codec::basic_authorization(&self.client_id, &self.client_secret),
            );
        }

        debug!(grant_type = grant.grant_type(), "requesting token");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| OAuth2Error::Network(e.to_string()))?;
        if !response.status.is_success() {
            return Err(codec::error_from_response(&response));
        }

        let mut token = Token::from_json(&response.text())?;
        if token.scope().is_empty() && !self.scope.is_empty() {
            // An absent scope in the response means the server granted
            // exactly what was requested.
            token.set_scope(self.scope.clone());
        }
        if grant.is_refresh() && token.refresh_token().is_empty() {
            // Servers are not required to rotate the refresh token on every
            // refresh; keep the one that still works.
            token.set_refresh_token(self.token.refresh_token());
        }

        debug!(grant_type = grant.grant_type(), "replacing stored token");
        self.token = token.clone();
        Ok(token)
    }

    fn verify_state(&self, echoed: &str) -> OAuth2Result<()> {
        if echoed == self.state {
            Ok(())
        } else {
            warn!("redirect state does not match, rejecting credential");
            Err(OAuth2Error::StateMismatch)
        }
    }

    /// Returns true when a valid token is stored.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.token.is_valid()
    }

    /// The current token, invalid until a flow completes.
    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    /// Replaces the current token wholesale.
    pub fn set_token(&mut self, token: Token) {
        self.token = token;
    }

    /// The client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Sets the client identifier.
    pub fn set_client_id(&mut self, client_id: impl Into<String>) {
        self.client_id = client_id.into();
    }

    /// The client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Sets the client secret.
    pub fn set_client_secret(&mut self, client_secret: impl Into<String>) {
        self.client_secret = client_secret.into();
    }

    /// The authorization endpoint.
    #[must_use]
    pub fn authorization_endpoint(&self) -> &str {
        &self.authorization_endpoint
    }

    /// Sets the authorization endpoint.
    pub fn set_authorization_endpoint(&mut self, endpoint: impl Into<String>) {
        self.authorization_endpoint = endpoint.into();
    }

    /// The token endpoint.
    #[must_use]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Sets the token endpoint.
    pub fn set_token_endpoint(&mut self, endpoint: impl Into<String>) {
        self.token_endpoint = endpoint.into();
    }

    /// The redirect URI registered for this client.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Sets the redirect URI.
    pub fn set_redirect_uri(&mut self, redirect_uri: impl Into<String>) {
        self.redirect_uri = redirect_uri.into();
    }

    /// The requested scope, empty when none is requested.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Sets the requested scope.
    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.scope = scope.into();
    }

    /// The current anti-forgery state value.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Sets the anti-forgery state value.
    pub fn set_state(&mut self, state: impl Into<String>) {
        self.state = state.into();
    }

    /// The configured grant.
    #[must_use]
    pub const fn grant_kind(&self) -> GrantKind {
        self.grant
    }

    /// Selects the grant.
    pub const fn set_grant_kind(&mut self, grant: GrantKind) {
        self.grant = grant;
    }

    /// Returns true when the implicit grant is selected.
    #[must_use]
    pub const fn implicit_grant(&self) -> bool {
        self.grant.is_implicit()
    }

    /// Selects between the implicit and authorization code grants.
    pub const fn set_implicit_grant(&mut self, implicit: bool) {
        self.grant = if implicit {
            GrantKind::Implicit
        } else {
            GrantKind::AuthorizationCode
        };
    }

    /// Whether client credentials travel in a Basic header.
    #[must_use]
    pub const fn http_basic_auth(&self) -> bool {
        self.http_basic_auth
    }

    /// Chooses between Basic-header and body client authentication.
    pub const fn set_http_basic_auth(&mut self, http_basic_auth: bool) {
        self.http_basic_auth = http_basic_auth;
    }

    /// Whether the credential is attached as a bearer header.
    #[must_use]
    pub const fn bearer_auth(&self) -> bool {
        self.bearer_auth
    }

    /// Chooses between bearer-header and query-parameter placement.
    pub const fn set_bearer_auth(&mut self, bearer_auth: bool) {
        self.bearer_auth = bearer_auth;
    }

    /// The query key used when the credential travels in the URI.
    #[must_use]
    pub fn access_token_query_key(&self) -> &str {
        &self.access_token_query_key
    }

    /// Sets the query key used when the credential travels in the URI.
    pub fn set_access_token_query_key(&mut self, key: impl Into<String>) {
        self.access_token_query_key = key.into();
    }
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("grant", &self.grant)
            .field("http_basic_auth", &self.http_basic_auth)
            .field("bearer_auth", &self.bearer_auth)
            .field("access_token_query_key", &self.access_token_query_key)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

fn missing_redirect_param(name: &str) -> OAuth2Error {
    OAuth2Error::MalformedRedirect(format!("missing `{name}` parameter"))
}
