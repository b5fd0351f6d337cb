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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use blobsign_azure_blob::{BlobUrlSigner, Config, Credential};
use blobsign_core::{Context, Error, ErrorKind, ProvideCredential, ProvideCredentialChain, Result};
use pretty_assertions::assert_eq;

/// Mock provider that tracks how many times it was called.
#[derive(Debug)]
struct CountingProvider {
    result: std::result::Result<Option<Credential>, ErrorKind>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ProvideCredential for CountingProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .map_err(|kind| Error::new(kind, "mock provider failed"))
    }
}

fn counting(
    result: std::result::Result<Option<Credential>, ErrorKind>,
) -> (CountingProvider, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (
        CountingProvider {
            result,
            calls: calls.clone(),
        },
        calls,
    )
}

#[tokio::test]
async fn test_chain_stops_at_first_success() {
    let (p1, c1) = counting(Ok(None));
    let (p2, c2) = counting(Err(ErrorKind::ConfigInvalid));
    let (p3, c3) = counting(Ok(Some(Credential::with_shared_key("third", "dGhpcmQ="))));
    let (p4, c4) = counting(Ok(Some(Credential::with_shared_key("fourth", "Zm91cnRo"))));

    let chain = ProvideCredentialChain::new()
        .push(p1)
        .push(p2)
        .push(p3)
        .push(p4);
    let cred = chain
        .provide_credential(&Context::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(cred.account_name, "third");
    assert_eq!(
        [c1, c2, c3, c4].map(|c| c.load(Ordering::SeqCst)),
        [1, 1, 1, 0]
    );
}

#[tokio::test]
async fn test_signer_loads_credential_once() {
    let (provider, calls) = counting(Ok(Some(Credential::with_shared_key("coachpro", "a2V5"))));
    let signer = BlobUrlSigner::new(Context::new(), Config::default(), provider);

    for _ in 0..3 {
        signer
            .sign("https://coachpro.blob.core.windows.net/c/b.jpg", None)
            .await
            .unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
