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

use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Signer is the main struct used to sign the request.
///
/// It pairs a credential provider with a request signer and caches the last
/// valid credential, so the provider is only consulted again once the cached
/// credential stops being valid.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// The context this signer loads credentials with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Get a valid credential, loading it from the provider if needed.
    ///
    /// Returns a `ConfigInvalid` error when no provider yields a valid
    /// credential.
    pub async fn credential(&self) -> Result<K> {
        let cached = self.lock().clone();
        if let Some(cred) = cached.filter(|c| c.is_valid()) {
            return Ok(cred);
        }

        let loaded = self.loader.provide_credential(&self.ctx).await?;
        match loaded {
            Some(cred) if cred.is_valid() => {
                *self.lock() = Some(cred.clone());
                Ok(cred)
            }
            Some(_) => Err(Error::config_invalid(
                "loaded credential is incomplete or invalid",
            )),
            None => Err(Error::config_invalid("no credential available")),
        }
    }

    /// Signing request.
    pub async fn sign(
        &self,
        req: &mut http::request::Parts,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let credential = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, Some(&credential), expires_in)
            .await
    }

    fn lock(&self) -> MutexGuard<'_, Option<K>> {
        // Poisoning only affects the cache.
        self.credential
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
