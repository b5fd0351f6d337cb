// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use blobsign_core::hash::{HmacSha256Signer, SignString};
use blobsign_core::time::{format_iso8601, now, DateTime};
use blobsign_core::utils::RedactQuery;
use blobsign_core::{Context, Error, ProvideCredential, Result, Signer};
use chrono::TimeDelta;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::request::Parts;
use http::Method;
use log::{debug, warn};

use crate::constants::*;
use crate::provide_credential::{ConfigCredentialProvider, DefaultCredentialProvider};
use crate::{BlobUrl, Config, Credential, RequestSigner, SasPermissions, ServiceSharedAccessSignature};

/// A blob url carrying a service SAS.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// `{blob url without query}?{sas token}`.
    pub url: String,
    /// The instant after which Azure rejects the url.
    pub expires_at: DateTime,
}

impl Debug for SignedUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedUrl")
            .field("url", &RedactQuery::new(&self.url, &["sig"]))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// BlobUrlSigner hands out time-limited urls for private blobs.
///
/// Downloads get a read-only service SAS appended to the blob url, uploads
/// get a Shared Key signed `PUT` request. The account key only ever feeds
/// the HMAC, it never shows up in the output.
///
/// ```no_run
/// use blobsign_azure_blob::{BlobUrlSigner, Config};
///
/// # async fn example() -> blobsign_core::Result<()> {
/// let signer = BlobUrlSigner::from_config(Config {
///     account_name: Some("coachpro".to_string()),
///     account_key: Some("a2V5".to_string()),
///     ..Default::default()
/// });
///
/// let signed = signer
///     .sign(
///         "https://coachpro.blob.core.windows.net/progress-photos/user123/front.jpg",
///         None,
///     )
///     .await?;
/// println!("valid until {}", signed.expires_at);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BlobUrlSigner {
    config: Config,
    loader: Arc<dyn ProvideCredential<Credential = Credential>>,
    signer: Signer<Credential>,
    string_signer: Arc<dyn SignString>,
    permissions: SasPermissions,
}

impl Debug for BlobUrlSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobUrlSigner")
            .field("config", &self.config)
            .field("loader", &self.loader)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

impl BlobUrlSigner {
    /// Create a signer that loads its credential from `loader`.
    ///
    /// `config` only supplies the default container and endpoint here.
    pub fn new(
        ctx: Context,
        config: Config,
        loader: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        let loader: Arc<dyn ProvideCredential<Credential = Credential>> = Arc::new(loader);
        let string_signer: Arc<dyn SignString> = Arc::new(HmacSha256Signer);

        Self {
            signer: build_signer(ctx, loader.clone(), string_signer.clone()),
            config,
            loader,
            string_signer,
            permissions: SasPermissions::read(),
        }
    }

    /// Create a signer over an explicit config, no environment is read.
    pub fn from_config(config: Config) -> Self {
        let loader = ConfigCredentialProvider::new(config.clone());
        Self::new(Context::new(), config, loader)
    }

    /// Create a signer from the environment of `ctx`.
    ///
    /// Fails with `ConfigInvalid` if the connection string in env is malformed.
    pub fn from_env(ctx: Context) -> Result<Self> {
        let config = Config::default().from_env(&ctx)?;
        let loader = DefaultCredentialProvider::new(config.clone());
        Ok(Self::new(ctx, config, loader))
    }

    /// Replace the signing primitive used for both SAS urls and uploads.
    pub fn with_string_signer(mut self, string_signer: Arc<dyn SignString>) -> Self {
        self.signer = build_signer(
            self.signer.context().clone(),
            self.loader.clone(),
            string_signer.clone(),
        );
        self.string_signer = string_signer;
        self
    }

    /// Replace the permissions granted by signed urls, read-only by default.
    pub fn with_permissions(mut self, permissions: SasPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Sign `blob_url` for read access during the next `expires_in_minutes`
    /// (60 if `None`).
    pub async fn sign(&self, blob_url: &str, expires_in_minutes: Option<i64>) -> Result<SignedUrl> {
        self.sign_at(blob_url, expires_in_minutes, now()).await
    }

    /// Same as [`BlobUrlSigner::sign`] with an explicit start instead of now.
    ///
    /// The returned `expires_at` is exactly `start + expires_in_minutes`.
    pub async fn sign_at(
        &self,
        blob_url: &str,
        expires_in_minutes: Option<i64>,
        start: DateTime,
    ) -> Result<SignedUrl> {
        let expires_in = expires_in(expires_in_minutes)?;
        let url = self.parse_url(blob_url)?;
        let cred = self.signer.credential().await?;

        if let Some(account) = url.account() {
            if account != cred.account_name {
                warn!(
                    "blob url account {account} differs from credential account {}, azure will reject the signature",
                    cred.account_name
                );
            }
        }

        let expiry = start.checked_add_signed(expires_in).ok_or_else(|| {
            Error::request_invalid(format!(
                "expiry overflows when signing at {}",
                format_iso8601(start)
            ))
        })?;
        let query = ServiceSharedAccessSignature::new(
            &cred.account_name,
            &cred.account_key,
            url.container(),
            url.blob_path(),
            start,
            expiry,
        )
        .with_permissions(self.permissions.clone())
        .with_version(self.config.sas_version.as_deref().unwrap_or(AZURE_STORAGE_VERSION))
        .with_string_signer(self.string_signer.clone())
        .query_string()?;

        debug!(
            "signed blob url {} until {}",
            url.as_str(),
            format_iso8601(expiry)
        );
        Ok(SignedUrl {
            url: format!("{}?{query}", url.as_str()),
            expires_at: expiry,
        })
    }

    /// Sign a blob addressed by name.
    ///
    /// `container` falls back to [`Config::container_name`], the endpoint to
    /// [`Config::endpoint`] or the default endpoint of the credential account.
    pub async fn sign_blob(
        &self,
        container: Option<&str>,
        blob_path: &str,
        expires_in_minutes: Option<i64>,
    ) -> Result<SignedUrl> {
        let url = self.blob_url(container, blob_path).await?;
        self.sign(url.as_str(), expires_in_minutes).await
    }

    /// Build a Shared Key signed `PUT` for uploading a block blob to `blob_url`.
    ///
    /// The caller attaches the body and sends the request.
    pub async fn sign_for_upload(
        &self,
        blob_url: &str,
        content_length: u64,
        content_type: &str,
    ) -> Result<Parts> {
        let url = self.parse_url(blob_url)?;

        let mut builder = http::Request::builder()
            .method(Method::PUT)
            .uri(url.as_str())
            .header(CONTENT_LENGTH, content_length.to_string())
            .header(X_MS_BLOB_TYPE, BLOCK_BLOB)
            .header(X_MS_VERSION, AZURE_STORAGE_VERSION);
        if !content_type.is_empty() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let (mut parts, _) = builder.body(())?.into_parts();

        self.signer.sign(&mut parts, None).await?;
        Ok(parts)
    }

    /// Parse `blob_url` against the configured endpoint, so an account
    /// carried in the endpoint path (emulator proxies) is not taken for the
    /// container.
    fn parse_url(&self, blob_url: &str) -> Result<BlobUrl> {
        match self.config.blob_endpoint() {
            Some(endpoint) => BlobUrl::parse_with_endpoint(blob_url, &endpoint),
            None => BlobUrl::parse(blob_url),
        }
    }

    async fn blob_url(&self, container: Option<&str>, blob_path: &str) -> Result<BlobUrl> {
        let Some(container) = container.or(self.config.container_name.as_deref()) else {
            return Err(Error::config_invalid(
                "container is neither given nor configured",
            ));
        };

        let endpoint = match self.config.blob_endpoint() {
            Some(v) => v,
            None => {
                let cred = self.signer.credential().await?;
                format!(
                    "https://{}.blob.{DEFAULT_ENDPOINT_SUFFIX}",
                    cred.account_name
                )
            }
        };

        BlobUrl::new(&endpoint, container, blob_path)
    }
}

fn build_signer(
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = Credential>>,
    string_signer: Arc<dyn SignString>,
) -> Signer<Credential> {
    Signer::new(
        ctx,
        loader,
        RequestSigner::new().with_string_signer(string_signer),
    )
}

fn expires_in(minutes: Option<i64>) -> Result<TimeDelta> {
    let minutes = minutes.unwrap_or(DEFAULT_EXPIRES_IN_MINUTES);
    if minutes <= 0 {
        return Err(Error::request_invalid(format!(
            "expires in must be a positive number of minutes, got {minutes}"
        )));
    }

    TimeDelta::try_minutes(minutes)
        .ok_or_else(|| Error::request_invalid(format!("expires in {minutes} minutes is too far")))
}
