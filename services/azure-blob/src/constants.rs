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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure blob requests.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_BLOB_TYPE: &str = "x-ms-blob-type";
pub const CONTENT_MD5: &str = "content-md5";

/// Storage service version used for both SAS tokens and Shared Key requests.
pub const AZURE_STORAGE_VERSION: &str = "2020-10-02";
pub const BLOCK_BLOB: &str = "BlockBlob";

/// `sr` value for a single blob.
pub const SAS_RESOURCE_BLOB: &str = "b";
pub const SAS_PROTOCOL_HTTPS: &str = "https";
pub const DEFAULT_EXPIRES_IN_MINUTES: i64 = 60;

// Env values used to load config.
pub const AZURE_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const AZURE_STORAGE_CONTAINER_NAME: &str = "AZURE_STORAGE_CONTAINER_NAME";
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZBLOB_ENDPOINT: &str = "AZBLOB_ENDPOINT";

pub const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b'~');
