//! PostgREST client.
//!
//! Tables are read from `<url>/rest/v1/<table>` with the projection in
//! `select` and the row range expressed as `offset`/`limit` query parameters.
//! An offset past the last row returns an empty array rather than a
//! range-not-satisfiable error, which is what the bulk reader's termination
//! rule relies on.
//!
//! Every request carries the public key in `apikey`. The bearer token is the
//! session's access token when one is attached, the public key otherwise, so
//! row-level security sees the signed-in user.

use super::{RemoteReadError, TableSource};
use crate::config::StoreConfig;
use crate::session::{AuthError, Session, SessionSource, User};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::future::Future;

#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            access_token: None,
        })
    }

    /// A copy of this store that reads on behalf of `session`.
    pub fn for_session(&self, session: &Session) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            ..self.clone()
        }
    }

    fn authorize(&self, request: RequestBuilder, bearer: &str) -> RequestBuilder {
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }
}

impl TableSource for RestStore {
    fn fetch_range(
        &self,
        table: &str,
        columns: &str,
        start: usize,
        end: usize,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteReadError>> + Send {
        async move {
            let url = format!("{}/rest/v1/{}", self.base_url, table);
            let limit = end.saturating_sub(start) + 1;
            let transport = |source| RemoteReadError::Transport {
                table: table.to_string(),
                source,
            };

            let request = self.client.get(&url).query(&[
                ("select", columns.to_string()),
                ("offset", start.to_string()),
                ("limit", limit.to_string()),
            ]);
            let response = self
                .authorize(request, self.bearer())
                .send()
                .await
                .map_err(transport)?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(RemoteReadError::Status {
                    table: table.to_string(),
                    start,
                    end,
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.bytes().await.map_err(transport)?;
            serde_json::from_slice(&body).map_err(|source| RemoteReadError::Decode {
                table: table.to_string(),
                source,
            })
        }
    }
}

impl SessionSource for RestStore {
    fn current_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<User, AuthError>> + Send {
        async move {
            let url = format!("{}/auth/v1/user", self.base_url);
            let response = self
                .authorize(self.client.get(&url), access_token)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(AuthError::Status {
                    status: status.as_u16(),
                    message,
                });
            }
            Ok(response.json::<User>().await?)
        }
    }
}
