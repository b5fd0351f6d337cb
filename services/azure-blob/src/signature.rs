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

//! Signing primitive shared by every Azure signing scheme.

use blobsign_core::hash::{base64_decode, SignString};
use blobsign_core::{Error, Result};
use log::error;

/// Sign `string_to_sign` with the base64 encoded `account_key`.
///
/// SAS tokens and Shared Key headers only differ in how they build the
/// string to sign. Both end up here.
pub(crate) fn compute_signature(
    signer: &dyn SignString,
    account_key: &str,
    string_to_sign: &str,
) -> Result<String> {
    let key = base64_decode(account_key).map_err(|e| {
        error!("failed to import account key: {e}");
        Error::crypto_failed("account key is not valid base64").with_source(e)
    })?;

    signer.sign_string(&key, string_to_sign).map_err(|e| {
        error!("failed to compute signature: {e}");
        e
    })
}
