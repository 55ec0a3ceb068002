// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::common::config::{AppConfig, CollectorConfig};
use crate::error::{Error, Result};

struct Credentials {
    username: String,
    password: String,
}

/// HTTP client for the controller's Redfish API.
///
/// Cheap to clone: the connection pool and credentials are shared, and none
/// of it is mutated after construction, so worker tasks each take a clone.
#[derive(Clone)]
pub struct ControllerClient {
    client: reqwest::Client,
    base_url: Url,
    credentials: Arc<Credentials>,
}

impl ControllerClient {
    /// Build a client for the configured controller. Certificate
    /// verification is disabled: BMCs ship with self-signed certificates.
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.request_timeout)
            .pool_idle_timeout(Duration::from_secs(AppConfig::POOL_IDLE_TIMEOUT_SECS))
            .tcp_keepalive(Duration::from_secs(AppConfig::TCP_KEEPALIVE_SECS))
            .build()
            .map_err(|e| Error::Request {
                path: config.base_url.to_string(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            credentials: Arc::new(Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            }),
        })
    }

    /// GET `path` (relative to the controller root) and decode the JSON body.
    ///
    /// Non-2xx statuses, transport failures and undecodable bodies are all
    /// reported as errors carrying `path`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).map_err(|e| Error::InvalidAddress {
            address: format!("{}{path}", self.base_url),
            reason: e.to_string(),
        })?;

        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .basic_auth(
                &self.credentials.username,
                Some(&self.credentials.password),
            )
            .send()
            .await
            .map_err(|e| Error::Request {
                path: path.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                path: path.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|e| Error::Request {
            path: path.to_string(),
            source: e,
        })?;

        serde_json::from_slice(&body).map_err(|e| Error::Decode {
            path: path.to_string(),
            source: e,
        })
    }
}
