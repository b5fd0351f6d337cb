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

use blobsign_core::utils::Redact;
use blobsign_core::SigningCredential;
use std::fmt::{Debug, Formatter};

/// Credential for Azure Blob Storage Shared Key signing.
///
/// Both SAS urls and upload `Authorization` headers are derived from the
/// account key. The key itself never leaves the process.
#[derive(Clone, Default)]
pub struct Credential {
    /// Azure storage account name.
    pub account_name: String,
    /// Azure storage account key, base64 encoded as shown in the portal.
    pub account_key: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.account_name.is_empty() && !self.account_key.is_empty()
    }
}

impl Credential {
    /// Create a new credential with shared key authentication.
    pub fn with_shared_key(account_name: &str, account_key: &str) -> Self {
        Self {
            account_name: account_name.to_string(),
            account_key: account_key.to_string(),
        }
    }
}
