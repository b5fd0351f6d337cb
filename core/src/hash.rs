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

//! Hash related utils.

use crate::Error;
use crate::Result;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;
use std::fmt::Debug;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::crypto_failed("base64 decode failed").with_source(e))
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Result<Vec<u8>> {
    let mut h = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| Error::crypto_failed("hmac key import failed").with_source(e))?;
    h.update(content);

    Ok(h.finalize().into_bytes().to_vec())
}

/// Base64 encoded HMAC with SHA256 hash.
pub fn base64_hmac_sha256(key: &[u8], content: &[u8]) -> Result<String> {
    hmac_sha256(key, content).map(|v| base64_encode(&v))
}

/// SignString computes the signature for a canonical string-to-sign.
///
/// This is the only place where key material meets content. Every signing
/// scheme builds its own string and hands it over here, so the primitive
/// can be swapped out (for example, to count invocations in tests).
pub trait SignString: Debug + Send + Sync + 'static {
    /// Sign `string_to_sign` with the raw (already decoded) `key` and return
    /// the base64 encoded signature.
    fn sign_string(&self, key: &[u8], string_to_sign: &str) -> Result<String>;
}

/// HmacSha256Signer signs with HMAC-SHA256 and encodes the digest in base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Signer;

impl SignString for HmacSha256Signer {
    fn sign_string(&self, key: &[u8], string_to_sign: &str) -> Result<String> {
        base64_hmac_sha256(key, string_to_sign.as_bytes())
    }
}
