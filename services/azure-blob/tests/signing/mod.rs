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

use blobsign_core::hash::{HmacSha256Signer, SignString};
use blobsign_core::Result;

mod sas_url;
mod shared_key;

/// Well-known account key of the Azurite emulator.
pub const AZURITE_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

/// SignString that counts how often it's asked to sign.
#[derive(Debug, Default)]
pub struct CountingSigner {
    calls: AtomicUsize,
}

impl CountingSigner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SignString for CountingSigner {
    fn sign_string(&self, key: &[u8], string_to_sign: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HmacSha256Signer.sign_string(key, string_to_sign)
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
