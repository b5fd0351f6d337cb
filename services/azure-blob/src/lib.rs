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

//! Azure Blob Storage signer
//!
//! This crate hands out time-limited access to private blobs without ever
//! exposing the storage account key:
//! - Service SAS urls for read access (`sign`)
//! - Shared Key signed `PUT` requests for uploads (`sign_for_upload`)
//!
//! Nothing here talks to the network. Signing is a pure function of the
//! blob url, the credential and the current time.
//!
//! # Example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use blobsign_azure_blob::BlobUrlSigner;
//! use blobsign_core::{Context, OsEnv};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Read AZURE_STORAGE_CONNECTION_STRING or account name/key from the process env.
//!     let ctx = Context::new().with_env(OsEnv);
//!     let signer = BlobUrlSigner::from_env(ctx)?;
//!
//!     let signed = signer
//!         .sign(
//!             "https://coachpro.blob.core.windows.net/progress-photos/user123/1700000000000-front.jpg",
//!             Some(60),
//!         )
//!         .await?;
//!
//!     println!("{} (expires at {})", signed.url, signed.expires_at);
//!     Ok(())
//! }
//! ```

mod constants;
pub use constants::{
    AZBLOB_ACCOUNT_KEY, AZBLOB_ACCOUNT_NAME, AZBLOB_ENDPOINT, AZURE_STORAGE_ACCOUNT_KEY,
    AZURE_STORAGE_ACCOUNT_NAME, AZURE_STORAGE_CONNECTION_STRING, AZURE_STORAGE_CONTAINER_NAME,
    AZURE_STORAGE_VERSION,
};

mod config;
pub use config::Config;
mod connection_string;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod blob_url;
pub use blob_url::BlobUrl;

mod signature;

mod service_sas;
pub use service_sas::{SasPermissions, ServiceSharedAccessSignature};

mod sign_request;
pub use sign_request::RequestSigner;

mod presign;
pub use presign::{BlobUrlSigner, SignedUrl};
