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

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blobsign_core::hash::{HmacSha256Signer, SignString};
use blobsign_core::time::{format_http_date, now, DateTime};
use blobsign_core::{Context, Error, Result, SignRequest, SigningMethod, SigningRequest};
use http::header::{self, HeaderName, HeaderValue};
use http::request::Parts;
use log::debug;
use percent_encoding::percent_encode;

use crate::constants::*;
use crate::signature::compute_signature;
use crate::Credential;

/// RequestSigner that implement Azure Storage Shared Key Authorization.
///
/// Used to authorize uploads (`PUT`) and other direct calls. Read access for
/// third parties goes through [`crate::BlobUrlSigner::sign`] instead.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    time: Option<DateTime>,
    signer: Arc<dyn SignString>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new Shared Key request signer.
    pub fn new() -> Self {
        Self {
            time: None,
            signer: Arc::new(HmacSha256Signer),
        }
    }

    /// Replace the signing primitive.
    pub fn with_string_signer(mut self, signer: Arc<dyn SignString>) -> Self {
        self.signer = signer;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::config_invalid("credential is required"));
        };

        if let SigningMethod::Query(_) = SigningMethod::from(expires_in) {
            return Err(Error::request_invalid(
                "shared key can't be used in query string, use a SAS url instead",
            ));
        }

        let mut ctx = SigningRequest::build(req)?;

        let now_time = self.time.unwrap_or_else(now);
        let string_to_sign = string_to_sign(&mut ctx, &cred.account_name, now_time)?;
        let signature =
            compute_signature(self.signer.as_ref(), &cred.account_key, &string_to_sign)?;

        ctx.headers.insert(header::AUTHORIZATION, {
            let mut value: HeaderValue =
                format!("SharedKey {}:{signature}", cred.account_name).parse()?;
            value.set_sensitive(true);
            value
        });

        for (_, v) in ctx.query.iter_mut() {
            *v = percent_encode(v.as_bytes(), &AZURE_QUERY_ENCODE_SET).to_string();
        }

        ctx.apply(req)
    }
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// ## Reference
///
/// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
fn string_to_sign(
    ctx: &mut SigningRequest,
    account_name: &str,
    now_time: DateTime,
) -> Result<String> {
    let mut s = String::with_capacity(256);

    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&header::CONTENT_LENGTH)
            .map(|v| if v == "0" { "" } else { v })?
    )?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::DATE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&header::RANGE)?)?;
    writeln!(&mut s, "{}", canonicalize_header(ctx, now_time)?)?;
    write!(&mut s, "{}", canonicalize_resource(ctx, account_name))?;

    debug!("shared key string to sign: {:?}", &s);

    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
fn canonicalize_header(ctx: &mut SigningRequest, now_time: DateTime) -> Result<String> {
    ctx.headers
        .insert(X_MS_DATE, format_http_date(now_time).parse()?);

    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_prefix("x-ms-")?,
        ":",
        "\n",
    ))
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(ctx: &SigningRequest, account_name: &str) -> String {
    if ctx.query.is_empty() {
        return format!("/{}{}", account_name, ctx.path);
    }

    let query = ctx
        .query
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();

    format!(
        "/{}{}\n{}",
        account_name,
        ctx.path,
        SigningRequest::query_to_percent_decoded_string(query, ":", "\n")
    )
}
