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

use blobsign_core::utils::Redact;
use blobsign_core::{Context, Result};
use serde::Deserialize;

use crate::connection_string;
use crate::constants::*;

/// Config carries all the configuration for Azure Blob Storage signing.
///
/// Config is passed to signers explicitly. Nothing in this crate reads the
/// process environment on its own, use [`Config::from_env`] with a
/// [`Context`] for that.
#[derive(Clone, Default, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
#[serde(default)]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_NAME`] or [`AZBLOB_ACCOUNT_NAME`]
    /// - `AccountName` in [`AZURE_STORAGE_CONNECTION_STRING`]
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_KEY`] or [`AZBLOB_ACCOUNT_KEY`]
    /// - `AccountKey` in [`AZURE_STORAGE_CONNECTION_STRING`]
    pub account_key: Option<String>,
    /// Default container used by [`crate::BlobUrlSigner::sign_blob`].
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_CONTAINER_NAME`]
    pub container_name: Option<String>,
    /// Blob service endpoint, like `https://account.blob.core.windows.net`.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ENDPOINT`]
    /// - `BlobEndpoint` (or protocol + suffix) in [`AZURE_STORAGE_CONNECTION_STRING`]
    ///
    /// If still unset, it's derived from `account_name`.
    pub endpoint: Option<String>,
    /// Storage service version (`sv`) written into SAS tokens.
    ///
    /// Defaults to [`AZURE_STORAGE_VERSION`] when unset.
    pub sas_version: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("container_name", &self.container_name)
            .field("endpoint", &self.endpoint)
            .field("sas_version", &self.sas_version)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on `self` are kept. Individual env values take
    /// precedence over the connection string.
    pub fn from_env(self, ctx: &Context) -> Result<Self> {
        let from_conn_str = match ctx.env_var(AZURE_STORAGE_CONNECTION_STRING) {
            Some(v) if !v.trim().is_empty() => connection_string::parse(&v)?,
            _ => Config::default(),
        };

        Ok(Config {
            account_name: self
                .account_name
                .or_else(|| ctx.env_var_any(&[AZURE_STORAGE_ACCOUNT_NAME, AZBLOB_ACCOUNT_NAME]))
                .or(from_conn_str.account_name),
            account_key: self
                .account_key
                .or_else(|| ctx.env_var_any(&[AZURE_STORAGE_ACCOUNT_KEY, AZBLOB_ACCOUNT_KEY]))
                .or(from_conn_str.account_key),
            container_name: self
                .container_name
                .or_else(|| ctx.env_var_any(&[AZURE_STORAGE_CONTAINER_NAME])),
            endpoint: self
                .endpoint
                .or_else(|| ctx.env_var_any(&[AZBLOB_ENDPOINT]))
                .or(from_conn_str.endpoint),
            sas_version: self.sas_version,
        })
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to specify all required parameters
    /// because the user is still allowed to set them later directly on the object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Set the default container.
    pub fn with_container_name(mut self, container_name: impl Into<String>) -> Self {
        self.container_name = Some(container_name.into());
        self
    }

    /// Blob service endpoint without trailing slash.
    ///
    /// Falls back to `https://{account_name}.blob.core.windows.net`.
    pub fn blob_endpoint(&self) -> Option<String> {
        if let Some(endpoint) = &self.endpoint {
            return Some(endpoint.trim_end_matches('/').to_string());
        }

        self.account_name
            .as_ref()
            .filter(|v| !v.is_empty())
            .map(|v| format!("https://{v}.blob.{DEFAULT_ENDPOINT_SUFFIX}"))
    }
}
