use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::client::Api;
use crate::common::debug;
use crate::identity::{Employee, PrincipalPayload, Role, SignInArea};
use crate::protocol::{path, ChangeRoleRequest, ErrorBody, SignInRequest, SignInResponse};
use crate::{HrGateError, Result};

/// Api client speaking json over http to the gatekeeper.
///
/// The bearer token obtained by `sign_in` is attached to every later request
/// and dropped on `sign_out`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HttpClient::DEFAULT_TIMEOUT)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn from_addr(host: impl AsRef<str>, port: u16) -> Result<Self> {
        HttpClient::new(format!("http://{}:{}", host.as_ref(), port))
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.message);
        debug!(%status, ?message, "Api request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => HrGateError::Unauthenticated { message },
            StatusCode::FORBIDDEN => HrGateError::Forbidden { message },
            StatusCode::NOT_FOUND => HrGateError::NotFound { message },
            status => HrGateError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl Api for HttpClient {
    async fn sign_in(
        &mut self,
        area: SignInArea,
        request: SignInRequest,
    ) -> Result<SignInResponse> {
        let response = self
            .http
            .post(self.url(path::sign_in(area)))
            .json(&request)
            .send()
            .await?;
        let signed_in: SignInResponse = HttpClient::decode(response).await?;

        self.token = Some(signed_in.token.clone());
        Ok(signed_in)
    }

    async fn sign_out(&mut self) -> Result<()> {
        let request = self.authorized(self.http.post(self.url(path::SIGN_OUT)));
        // The token is useless to us after this point whatever the outcome.
        self.token = None;

        let response = request.send().await?;
        HttpClient::decode::<serde_json::Value>(response)
            .await
            .map(|_| ())
    }

    async fn me(&mut self) -> Result<PrincipalPayload> {
        let response = self
            .authorized(self.http.get(self.url(path::ME)))
            .send()
            .await?;
        HttpClient::decode(response).await
    }

    async fn list_employees(&mut self) -> Result<Vec<Employee>> {
        let response = self
            .authorized(self.http.get(self.url(path::EMPLOYEES)))
            .send()
            .await?;
        HttpClient::decode(response).await
    }

    async fn get_employee(&mut self, id: u64) -> Result<Employee> {
        let response = self
            .authorized(self.http.get(self.url(&path::employee(id))))
            .send()
            .await?;
        HttpClient::decode(response).await
    }

    async fn change_role(&mut self, id: u64, role: Role) -> Result<Employee> {
        let response = self
            .authorized(self.http.put(self.url(&path::employee_role(id))))
            .json(&ChangeRoleRequest { role })
            .send()
            .await?;
        HttpClient::decode(response).await
    }

    fn credential(&self) -> Option<String> {
        self.token.clone()
    }

    fn set_credential(&mut self, credential: Option<String>) {
        self.token = credential;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = HttpClient::new("http://localhost:7878/").unwrap();
        assert_eq!(client.url(path::ME), "http://localhost:7878/api/auth/me");

        let client = HttpClient::from_addr("127.0.0.1", 80).unwrap();
        assert_eq!(
            client.url(&path::employee(4)),
            "http://127.0.0.1:80/api/employees/4"
        );
        assert!(client.token().is_none());
        let mut client = client.with_token("abc");
        assert_eq!(client.token(), Some("abc"));
        client.set_credential(None);
        assert!(client.credential().is_none());
    }
}
