use serde_json::json;

use super::client::ApiClient;
use super::envelope::Envelope;
use super::error::ApiError;
use super::transport::ApiRequest;
use super::types::User;
use crate::storage::AuthSession;

impl ApiClient {
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        let value = self
            .request(ApiRequest::post(
                "/auth/signup",
                json!({ "name": name, "email": email, "password": password }),
            ))
            .await?;
        parse_session(value)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let value = self
            .request(ApiRequest::post(
                "/auth/login",
                json!({ "email": email, "password": password }),
            ))
            .await?;
        parse_session(value)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, ApiError> {
        let value = self
            .request(ApiRequest::post(
                "/auth/forgot-password",
                json!({ "email": email }),
            ))
            .await?;
        Ok(Envelope::parse(value).message)
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        self.request(ApiRequest::post(
            "/auth/reset-password",
            json!({ "token": token, "password": password }),
        ))
        .await?;
        Ok(())
    }

    pub async fn verify_reset_token(&self, token: &str) -> Result<bool, ApiError> {
        let value = self
            .request(ApiRequest::post(
                "/auth/verify-reset-token",
                json!({ "token": token }),
            ))
            .await?;
        Ok(Envelope::parse(value).success)
    }

    /// Cached reads that are scoped to the signed-in user must not leak
    /// across a login/logout boundary.
    pub fn invalidate_user_scope(&self) {
        self.invalidate(&["GET:/wishlist", "GET:/orders", "GET:/admin/"]);
    }
}

fn parse_session(value: serde_json::Value) -> Result<AuthSession, ApiError> {
    let envelope = Envelope::parse(value);
    if !envelope.success {
        return Err(ApiError::Server {
            status: 200,
            message: envelope
                .message
                .unwrap_or_else(|| "Authentication failed".to_string()),
        });
    }

    let token = envelope
        .str_field(&["token", "accessToken"])
        .ok_or_else(|| ApiError::Malformed("auth response without a token".to_string()))?;
    let user: User = serde_json::from_value(envelope.entity(&["user"]))
        .map_err(|e| ApiError::Malformed(format!("bad user object: {}", e)))?;

    Ok(AuthSession { token, user })
}
