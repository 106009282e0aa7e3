// SPDX-License-Identifier: MIT

//! Google OAuth client.
//!
//! Handles the code-for-token exchange and the OpenID userinfo lookup.
//! The rest of the sign-in flow (state signing, session minting) lives in
//! `routes/auth.rs`.

use crate::error::AppError;
use serde::Deserialize;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleAuthService {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

/// Tokens returned by the code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// OpenID userinfo profile.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Google account id
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl GoogleAuthService {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
        }
    }

    /// Build the authorization URL the sign-in flow redirects to.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "https://accounts.google.com/o/oauth2/v2/auth?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope=openid%20email%20profile&\
             access_type=offline&\
             state={}",
            self.client_id,
            urlencoding::encode(redirect_uri),
            state
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleTokens, AppError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::IdentitySync(format!("Token exchange request failed: {}", e)))?;

        Self::check_response_json(response, "token exchange").await
    }

    /// Fetch the signed-in user's OpenID profile.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, AppError> {
        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentitySync(format!("Userinfo request failed: {}", e)))?;

        Self::check_response_json(response, "userinfo").await
    }

    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Google {} failed", context);
            return Err(AppError::IdentitySync(format!(
                "Google {} failed with status {}",
                context, status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::IdentitySync(format!("Invalid {} response: {}", context, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_encodes_redirect() {
        let service = GoogleAuthService::new("cid".to_string(), "secret".to_string());
        let url = service.authorize_url("http://localhost:8080/auth/google/callback", "st4te");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=cid"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("state=st4te"));
    }
}
