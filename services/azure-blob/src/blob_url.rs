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

use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;

use blobsign_core::{Error, Result};
use http::Uri;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::constants::AZURE_QUERY_ENCODE_SET;

/// A url pointing at exactly one blob: `{scheme}://{host}/{container}/{blob_path}`.
///
/// Query and fragment are dropped, a stored url that already carries an old
/// SAS token can be parsed and signed again.
///
/// For IP hosts and single-label hosts like `localhost` or `azurite`
/// (emulators and their proxies) the url is path-style: the first path
/// segment is the account name. [`BlobUrl::parse_with_endpoint`] also
/// handles endpoints that carry the account in their path under any host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUrl {
    base: String,
    account: Option<String>,
    container: String,
    blob_path: String,
}

impl BlobUrl {
    /// Parse a blob url.
    ///
    /// Characters `http::Uri` refuses (spaces, non-ASCII) are percent
    /// encoded first, so `https://acct.blob.core.windows.net/c/fotó.jpg` is
    /// accepted and its blob path decodes back to `fotó.jpg`.
    ///
    /// Fails with `RequestInvalid` if the url has no scheme or host, or the
    /// path does not split into a non-empty container and a non-empty blob path.
    pub fn parse(url: &str) -> Result<Self> {
        Self::parse_inner(url, None)
    }

    /// Parse a blob url served under `endpoint`.
    ///
    /// When `endpoint` has a path, like `http://azurite:10000/devstoreaccount1`,
    /// and `url` lives under it, that path is the account prefix and the
    /// container starts right after it. Otherwise this is [`BlobUrl::parse`].
    pub fn parse_with_endpoint(url: &str, endpoint: &str) -> Result<Self> {
        Self::parse_inner(url, Some(endpoint))
    }

    fn parse_inner(url: &str, endpoint: Option<&str>) -> Result<Self> {
        let url = url.trim();
        let url = url.split_once('#').map_or(url, |(v, _)| v);
        let uri = parse_absolute(url)?;
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(Error::request_invalid(format!(
                "blob url must be absolute: {url}"
            )));
        };

        let path = uri.path().trim_start_matches('/');
        let (account, rest) = match endpoint.and_then(|e| account_prefix(e, &uri)) {
            Some((account, len)) => (Some(account), path[len..].trim_start_matches('/')),
            None if is_path_style(authority.host()) => {
                let (account, tail) = path.split_once('/').unwrap_or((path, ""));
                (Some(decode(account)?), tail.trim_start_matches('/'))
            }
            None => (
                authority
                    .host()
                    .split_once('.')
                    .map(|(account, _)| account.to_string()),
                path,
            ),
        };

        let (container, blob_path) = rest.split_once('/').unwrap_or((rest, ""));
        if container.is_empty() {
            return Err(Error::request_invalid(format!(
                "blob url has no container: {url}"
            )));
        }
        if blob_path.trim_matches('/').is_empty() {
            return Err(Error::request_invalid(format!(
                "blob url has no blob path: {url}"
            )));
        }

        Ok(Self {
            base: format!("{scheme}://{authority}{}", uri.path()),
            account,
            container: decode(container)?,
            blob_path: decode(blob_path)?,
        })
    }

    /// Build the url of `blob_path` inside `container` under a blob service endpoint.
    ///
    /// Container and blob path are percent encoded, `/` in the blob path is kept
    /// as the virtual directory separator.
    pub fn new(endpoint: &str, container: &str, blob_path: &str) -> Result<Self> {
        let url = format!(
            "{}/{}/{}",
            endpoint.trim_end_matches('/'),
            utf8_percent_encode(container, &AZURE_QUERY_ENCODE_SET),
            utf8_percent_encode(blob_path.trim_start_matches('/'), &AZURE_QUERY_ENCODE_SET),
        );
        Self::parse_with_endpoint(&url, endpoint)
    }

    /// The url without query and fragment.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Account name derived from the host (or first segment for path-style urls).
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Decoded container name.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Decoded blob path inside the container, may contain `/`.
    pub fn blob_path(&self) -> &str {
        &self.blob_path
    }
}

impl Display for BlobUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

impl FromStr for BlobUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Characters a WHATWG url parser would percent encode in a path.
const URL_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn parse_absolute(url: &str) -> Result<Uri> {
    let encoded = utf8_percent_encode(url, URL_ENCODE_SET).to_string();
    Uri::from_str(&encoded)
        .map_err(|e| Error::request_invalid(format!("malformed blob url: {url}")).with_source(e))
}

/// Returns the decoded account and the length of the endpoint path prefix
/// inside `uri`'s path (without the leading `/`), if `uri` lives under `endpoint`.
fn account_prefix(endpoint: &str, uri: &Uri) -> Option<(String, usize)> {
    let endpoint = parse_absolute(endpoint.trim()).ok()?;
    if endpoint.authority() != uri.authority() {
        return None;
    }

    let prefix = endpoint.path().trim_matches('/');
    let account = prefix.rsplit('/').next().filter(|v| !v.is_empty())?;
    let path = uri.path().trim_start_matches('/');
    if !path.starts_with(prefix) || !path[prefix.len()..].starts_with('/') {
        return None;
    }

    let account = percent_decode_str(account).decode_utf8().ok()?.into_owned();
    Some((account, prefix.len()))
}

/// IP hosts and hosts without a dot (`localhost`, docker service names)
/// never carry the account in a subdomain.
fn is_path_style(host: &str) -> bool {
    !host.contains('.') || host.parse::<IpAddr>().is_ok()
}

fn decode(s: &str) -> Result<String> {
    percent_decode_str(s)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|e| Error::request_invalid(format!("blob url is not valid utf-8: {s}")).with_source(e))
}
