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

use std::collections::HashMap;

use blobsign_core::{Error, Result};

use crate::constants::DEFAULT_ENDPOINT_SUFFIX;
use crate::Config;

// Azurite defaults.
const AZURITE_DEFAULT_STORAGE_ACCOUNT_NAME: &str = "devstoreaccount1";
const AZURITE_DEFAULT_STORAGE_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const AZURITE_DEFAULT_BLOB_URI: &str = "http://127.0.0.1:10000";

/// Parses an [Azure connection string][1].
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let key_values = parse_into_key_values(conn_str)?;

    if key_values.get("UseDevelopmentStorage").map(String::as_str) == Some("true") {
        return Ok(development_config(&key_values));
    }

    if key_values.contains_key("SharedAccessSignature") {
        log::debug!("connection string carries a SharedAccessSignature, ignored for signing");
    }

    Ok(Config {
        account_name: key_values.get("AccountName").cloned(),
        account_key: key_values.get("AccountKey").cloned(),
        endpoint: collect_endpoint(&key_values),
        ..Default::default()
    })
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .filter(|field| !field.trim().is_empty())
        .map(|field| {
            let (key, value) = field.trim().split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn development_config(key_values: &HashMap<String, String>) -> Config {
    let account_name = key_values
        .get("AccountName")
        .cloned()
        .unwrap_or_else(|| AZURITE_DEFAULT_STORAGE_ACCOUNT_NAME.to_string());
    let account_key = key_values
        .get("AccountKey")
        .cloned()
        .unwrap_or_else(|| AZURITE_DEFAULT_STORAGE_ACCOUNT_KEY.to_string());
    let proxy_uri = key_values
        .get("DevelopmentStorageProxyUri")
        .map(String::as_str)
        .unwrap_or(AZURITE_DEFAULT_BLOB_URI);

    Config {
        endpoint: Some(format!("{}/{account_name}", proxy_uri.trim_end_matches('/'))),
        account_name: Some(account_name),
        account_key: Some(account_key),
        ..Default::default()
    }
}

/// An explicit `BlobEndpoint` wins, otherwise the endpoint is assembled from
/// protocol, account name and suffix. Missing parts leave the endpoint unset,
/// callers may still derive it from the account name later.
fn collect_endpoint(key_values: &HashMap<String, String>) -> Option<String> {
    if let Some(endpoint) = key_values.get("BlobEndpoint") {
        return Some(endpoint.trim_end_matches('/').to_string());
    }

    let account_name = key_values.get("AccountName")?;
    let protocol = key_values
        .get("DefaultEndpointsProtocol")
        .map(String::as_str)
        .unwrap_or("https");
    let suffix = key_values
        .get("EndpointSuffix")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ENDPOINT_SUFFIX);

    Some(format!("{protocol}://{account_name}.blob.{suffix}"))
}
