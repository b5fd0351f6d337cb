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

use async_trait::async_trait;
use blobsign_core::{Context, ProvideCredential, Result};
use log::warn;

use crate::{Config, Credential};

/// ConfigCredentialProvider provides the shared key held by a [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigCredentialProvider {
    config: Config,
}

impl ConfigCredentialProvider {
    /// Create a provider over `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(credential_from_config(&self.config))
    }
}

/// Both account name and key must be present and non-empty.
pub(crate) fn credential_from_config(config: &Config) -> Option<Credential> {
    let account_name = config.account_name.as_deref().filter(|v| !v.is_empty());
    let account_key = config.account_key.as_deref().filter(|v| !v.is_empty());

    match (account_name, account_key) {
        (Some(name), Some(key)) => Some(Credential::with_shared_key(name, key)),
        (Some(name), None) => {
            warn!("account key for storage account {name} is not configured");
            None
        }
        (None, Some(_)) => {
            warn!("account key is configured without an account name");
            None
        }
        (None, None) => None,
    }
}
