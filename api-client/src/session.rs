//! Login and logout flows layered on the request wrapper.

use hirelane_auth::TokenNamespace;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::client::Client;
use crate::client::RequestOptions;
use crate::error::Result;
use crate::wire::extract_access_token;

pub const USER_LOGIN_PATH: &str = "/api/auth/login";
pub const COMPANY_LOGIN_PATH: &str = "/api/auth/company/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// Credentials for the password login flows.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Client {
    /// Signs `credentials` in under `namespace` and persists the returned
    /// access token to the session store.
    ///
    /// The call itself skips bearer attachment: a stale token must never
    /// gate a fresh login. The parsed response body is returned so callers
    /// can pick up profile data delivered alongside the token.
    pub async fn login(
        &self,
        credentials: &LoginRequest,
        namespace: TokenNamespace,
    ) -> Result<Value> {
        let path = match namespace {
            TokenNamespace::User => USER_LOGIN_PATH,
            TokenNamespace::Company => COMPANY_LOGIN_PATH,
        };
        let options = RequestOptions {
            method: Method::POST,
            body: Some(serde_json::to_value(credentials)?),
            skip_auth: true,
            namespace,
            ..RequestOptions::default()
        };

        let body = self.request_value(path, options).await?;
        match extract_access_token(&body) {
            Some(token) => self.store.set(&token, namespace),
            None => warn!(%namespace, "login response carried no access token"),
        }
        Ok(body)
    }

    /// Ends the session server-side, then clears every namespace's token
    /// regardless of the server's answer.
    pub async fn logout(&self) -> Result<()> {
        let options = RequestOptions {
            method: Method::POST,
            skip_auth: true,
            ..RequestOptions::default()
        };
        let result = self.request_value(LOGOUT_PATH, options).await;
        self.store.clear_all();
        result?;
        Ok(())
    }
}
