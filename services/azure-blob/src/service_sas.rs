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

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use blobsign_core::hash::{HmacSha256Signer, SignString};
use blobsign_core::time::{format_iso8601, DateTime};
use blobsign_core::utils::Redact;
use blobsign_core::{Error, Result};
use log::debug;

use crate::constants::*;
use crate::signature::compute_signature;

/// Permission letters accepted for a blob, in the order Azure expects them.
const BLOB_PERMISSIONS: &str = "racwdl";

/// Permissions (`sp`) granted by a blob SAS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasPermissions(String);

impl SasPermissions {
    /// Read-only access, the only permission handed out for downloads.
    pub fn read() -> Self {
        Self("r".to_string())
    }

    /// The `sp` value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SasPermissions {
    type Err = Error;

    /// Letters may come in any order and repeat, they are normalized into
    /// the canonical `racwdl` order.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(c) = s.chars().find(|c| !BLOB_PERMISSIONS.contains(*c)) {
            return Err(Error::request_invalid(format!(
                "unknown sas permission '{c}', expected letters of {BLOB_PERMISSIONS}"
            )));
        }

        let normalized: String = BLOB_PERMISSIONS.chars().filter(|c| s.contains(*c)).collect();
        if normalized.is_empty() {
            return Err(Error::request_invalid("sas permissions must not be empty"));
        }

        Ok(Self(normalized))
    }
}

impl Display for SasPermissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Service SAS for a single blob.
///
/// - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)
pub struct ServiceSharedAccessSignature {
    account: String,
    key: String,
    container: String,
    blob_path: String,
    permissions: SasPermissions,
    start: DateTime,
    expiry: DateTime,
    protocol: String,
    version: String,
    signer: Arc<dyn SignString>,
}

impl Debug for ServiceSharedAccessSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceSharedAccessSignature")
            .field("account", &self.account)
            .field("key", &Redact::from(&self.key))
            .field("container", &self.container)
            .field("blob_path", &self.blob_path)
            .field("permissions", &self.permissions)
            .field("start", &self.start)
            .field("expiry", &self.expiry)
            .field("protocol", &self.protocol)
            .field("version", &self.version)
            .field("signer", &self.signer)
            .finish()
    }
}

impl ServiceSharedAccessSignature {
    /// Create a read-only, https-only SAS for one blob valid in `[start, expiry]`.
    pub fn new(
        account: &str,
        key: &str,
        container: &str,
        blob_path: &str,
        start: DateTime,
        expiry: DateTime,
    ) -> Self {
        Self {
            account: account.to_string(),
            key: key.to_string(),
            container: container.to_string(),
            blob_path: blob_path.to_string(),
            permissions: SasPermissions::read(),
            start,
            expiry,
            protocol: SAS_PROTOCOL_HTTPS.to_string(),
            version: AZURE_STORAGE_VERSION.to_string(),
            signer: Arc::new(HmacSha256Signer),
        }
    }

    /// Replace the granted permissions.
    pub fn with_permissions(mut self, permissions: SasPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Replace the storage service version (`sv`).
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Replace the signing primitive.
    pub fn with_string_signer(mut self, signer: Arc<dyn SignString>) -> Self {
        self.signer = signer;
        self
    }

    /// When the SAS stops being accepted.
    pub fn expiry(&self) -> DateTime {
        self.expiry
    }

    fn validate(&self) -> Result<()> {
        if self.container.is_empty() {
            return Err(Error::request_invalid("sas container must not be empty"));
        }
        if self.blob_path.is_empty() {
            return Err(Error::request_invalid("sas blob path must not be empty"));
        }
        if self.version.is_empty() {
            return Err(Error::request_invalid("sas version must not be empty"));
        }
        if self.start >= self.expiry {
            return Err(Error::request_invalid(format!(
                "sas start {} must be before expiry {}",
                format_iso8601(self.start),
                format_iso8601(self.expiry)
            )));
        }
        Ok(())
    }

    /// Construct string to sign
    ///
    /// ## Format
    ///
    /// ```text
    /// signedPermissions + "\n" +
    /// signedStart + "\n" +
    /// signedExpiry + "\n" +
    /// canonicalizedResource + "\n" +
    /// signedIdentifier + "\n" +
    /// signedIP + "\n" +
    /// signedProtocol + "\n" +
    /// signedVersion + "\n" +
    /// signedResource + "\n" +
    /// rscc + "\n" +
    /// rscd + "\n" +
    /// rsce + "\n" +
    /// rscl + "\n" +
    /// rsct
    /// ```
    ///
    /// Identifier, IP, resource and the response header overrides are always
    /// empty, but their slots must stay.
    pub fn string_to_sign(&self) -> String {
        let start = format_iso8601(self.start);
        let expiry = format_iso8601(self.expiry);
        let canonicalized_resource = format!(
            "/blob/{}/{}/{}",
            self.account, self.container, self.blob_path
        );

        let fields: [&str; 14] = [
            self.permissions.as_str(),
            &start,
            &expiry,
            &canonicalized_resource,
            "",
            "",
            &self.protocol,
            &self.version,
            "",
            "",
            "",
            "",
            "",
            "",
        ];
        fields.join("\n")
    }

    fn signature(&self) -> Result<String> {
        let string_to_sign = self.string_to_sign();
        debug!("sas string to sign: {:?}", &string_to_sign);

        compute_signature(self.signer.as_ref(), &self.key, &string_to_sign)
    }

    /// SAS query parameters in order: `sv, st, se, sr, sp, spr, sig`.
    ///
    /// Values are url encoded and ready to be joined with `&`.
    pub fn token(&self) -> Result<Vec<(String, String)>> {
        self.validate()?;
        let sig = self.signature()?;

        Ok(vec![
            ("sv".to_string(), urlencoded(&self.version)),
            ("st".to_string(), urlencoded(&format_iso8601(self.start))),
            ("se".to_string(), urlencoded(&format_iso8601(self.expiry))),
            ("sr".to_string(), SAS_RESOURCE_BLOB.to_string()),
            ("sp".to_string(), self.permissions.to_string()),
            ("spr".to_string(), urlencoded(&self.protocol)),
            ("sig".to_string(), urlencoded(&sig)),
        ])
    }

    /// The token joined into a query string, without leading `?`.
    pub fn query_string(&self) -> Result<String> {
        Ok(self
            .token()?
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&"))
    }
}

fn urlencoded(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
