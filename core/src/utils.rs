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

//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a string by replacing all but the first and last three characters with asterisks.
///
/// - If the input string has fewer than 12 characters, it should be entirely redacted.
/// - If the input string has 12 or more characters, only the first three and the last three.
///
/// This allows users to distinguish between different redacted strings without
/// leaking the account key.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            None => Redact(""),
            Some(v) => Redact(v),
        }
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.len();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 {
            f.write_str("***")
        } else {
            f.write_str(&self.0[..3])?;
            f.write_str("***")?;
            f.write_str(&self.0[length - 3..])
        }
    }
}

/// Redacts the values of selected query parameters in a url.
///
/// Signed urls are bearer credentials: anyone holding `sig` can read the blob
/// until expiry. Use this whenever a signed url ends up in logs or `Debug`.
///
/// ```
/// use blobsign_core::utils::RedactQuery;
///
/// let url = "https://a.blob.core.windows.net/c/b?sp=r&sig=abcdefghijklmnop";
/// assert_eq!(
///     format!("{:?}", RedactQuery::new(url, &["sig"])),
///     "https://a.blob.core.windows.net/c/b?sp=r&sig=abc***nop"
/// );
/// ```
pub struct RedactQuery<'a> {
    url: &'a str,
    keys: &'a [&'a str],
}

impl<'a> RedactQuery<'a> {
    /// Redact the values of `keys` found in the query of `url`.
    pub fn new(url: &'a str, keys: &'a [&'a str]) -> Self {
        Self { url, keys }
    }
}

impl Debug for RedactQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some((base, query)) = self.url.split_once('?') else {
            return f.write_str(self.url);
        };

        f.write_str(base)?;
        f.write_str("?")?;
        for (idx, pair) in query.split('&').enumerate() {
            if idx != 0 {
                f.write_str("&")?;
            }
            match pair.split_once('=') {
                Some((k, v)) if self.keys.contains(&k) => {
                    write!(f, "{k}={:?}", Redact::from(v))?;
                }
                _ => f.write_str(pair)?,
            }
        }
        Ok(())
    }
}
