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

use std::collections::BTreeSet;

use blobsign_azure_blob::{
    BlobUrlSigner, Config, ServiceSharedAccessSignature, StaticCredentialProvider,
};
use blobsign_core::time::parse_iso8601;
use blobsign_core::{Context, ErrorKind};
use chrono::{TimeDelta, TimeZone, Utc};
use pretty_assertions::assert_eq;
use test_case::test_case;

use super::{init_logger, CountingSigner, AZURITE_KEY};

const PHOTO_URL: &str =
    "https://coachpro.blob.core.windows.net/progress-photos/user123/1700000000000-front.jpg";

fn coachpro_signer() -> BlobUrlSigner {
    BlobUrlSigner::from_config(Config {
        account_name: Some("coachpro".to_string()),
        account_key: Some(AZURITE_KEY.to_string()),
        ..Default::default()
    })
}

fn query_pairs(url: &str) -> Vec<(String, String)> {
    let (_, query) = url.split_once('?').expect("signed url must carry a query");
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn query_value(url: &str, key: &str) -> String {
    query_pairs(url)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
        .unwrap_or_else(|| panic!("query {key} must exist in {url}"))
}

#[tokio::test]
async fn test_golden_string_to_sign_and_signature() {
    init_logger();

    let start = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
    let sas = ServiceSharedAccessSignature::new(
        "coachpro",
        AZURITE_KEY,
        "progress-photos",
        "user123/1700000000000-front.jpg",
        start,
        start + TimeDelta::try_minutes(60).unwrap(),
    );

    assert_eq!(
        sas.string_to_sign(),
        "r\n2023-11-14T22:13:20Z\n2023-11-14T23:13:20Z\n\
         /blob/coachpro/progress-photos/user123/1700000000000-front.jpg\n\n\nhttps\n2020-10-02\n\n\n\n\n\n"
    );

    let token = sas.token().unwrap();
    assert_eq!(
        token.last().unwrap(),
        &(
            "sig".to_string(),
            "RqSHai2Th05AX%2FbwKOKmpAspTZQWkjmnJPNhzEZv%2Bqw%3D".to_string()
        )
    );
}

#[tokio::test]
async fn test_coachpro_scenario() {
    init_logger();

    let before = Utc::now();
    let signed = coachpro_signer().sign(PHOTO_URL, None).await.unwrap();
    let after = Utc::now();

    assert!(signed.url.starts_with(&format!("{PHOTO_URL}?")));
    assert_eq!(query_value(&signed.url, "sr"), "b");
    assert_eq!(query_value(&signed.url, "sp"), "r");
    assert_eq!(query_value(&signed.url, "spr"), "https");
    assert_eq!(query_value(&signed.url, "sv"), "2020-10-02");

    let sig = query_value(&signed.url, "sig");
    assert_eq!(blobsign_core::hash::base64_decode(&sig).unwrap().len(), 32);

    let st = parse_iso8601(&query_value(&signed.url, "st")).unwrap();
    let se = parse_iso8601(&query_value(&signed.url, "se")).unwrap();
    assert_eq!(se, signed.expires_at);
    assert_eq!(se - st, TimeDelta::try_minutes(60).unwrap());

    // st drops sub-second precision.
    let floor = before - TimeDelta::try_seconds(1).unwrap();
    assert!(st >= floor && st <= after);
}

#[test_case(1; "one minute")]
#[test_case(15; "quarter")]
#[test_case(60 * 24 * 7; "one week")]
#[tokio::test]
async fn test_window_matches_requested_minutes(minutes: i64) {
    let start = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    let signed = coachpro_signer()
        .sign_at(PHOTO_URL, Some(minutes), start)
        .await
        .unwrap();

    let st = parse_iso8601(&query_value(&signed.url, "st")).unwrap();
    let se = parse_iso8601(&query_value(&signed.url, "se")).unwrap();
    assert_eq!(st, start);
    assert_eq!(se - st, TimeDelta::try_minutes(minutes).unwrap());
    assert_eq!(signed.expires_at, se);
}

#[tokio::test]
async fn test_resign_changes_only_signature() {
    let signer = coachpro_signer();
    let t1 = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
    let t2 = t1 + TimeDelta::try_seconds(1).unwrap();

    let first = signer.sign_at(PHOTO_URL, None, t1).await.unwrap();
    let second = signer.sign_at(PHOTO_URL, None, t2).await.unwrap();

    let keys = |url: &str| -> BTreeSet<String> {
        query_pairs(url).into_iter().map(|(k, _)| k).collect()
    };
    assert_eq!(keys(&first.url), keys(&second.url));
    assert_ne!(
        query_value(&first.url, "sig"),
        query_value(&second.url, "sig")
    );
}

#[tokio::test]
async fn test_existing_query_is_replaced() {
    let start = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
    let signer = coachpro_signer();

    let clean = signer.sign_at(PHOTO_URL, None, start).await.unwrap();
    let stale = signer
        .sign_at(&format!("{PHOTO_URL}?sv=2019-01-01&sig=old#frag"), None, start)
        .await
        .unwrap();
    assert_eq!(clean, stale);
}

#[test_case("https://coachpro.blob.core.windows.net/"; "no container")]
#[test_case("https://coachpro.blob.core.windows.net/progress-photos"; "no blob")]
#[test_case("https://coachpro.blob.core.windows.net/progress-photos/"; "empty blob")]
#[test_case("progress-photos/user123/front.jpg"; "relative")]
#[test_case("not a url"; "garbage")]
#[tokio::test]
async fn test_malformed_url_is_rejected(url: &str) {
    let signer = CountingSigner::new();
    let err = coachpro_signer()
        .with_string_signer(signer.clone())
        .sign(url, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert_eq!(signer.calls(), 0);
}

#[test_case(0; "zero")]
#[test_case(-1; "negative")]
#[tokio::test]
async fn test_non_positive_expiry_is_rejected(minutes: i64) {
    let signer = CountingSigner::new();
    let err = coachpro_signer()
        .with_string_signer(signer.clone())
        .sign(PHOTO_URL, Some(minutes))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert_eq!(signer.calls(), 0);
}

#[test_case(None, None; "nothing")]
#[test_case(Some("coachpro"), None; "no key")]
#[test_case(None, Some(AZURITE_KEY); "no account")]
#[test_case(Some("coachpro"), Some(""); "empty key")]
#[tokio::test]
async fn test_missing_credential_never_signs(account_name: Option<&str>, account_key: Option<&str>) {
    let signer = CountingSigner::new();
    let err = BlobUrlSigner::from_config(Config {
        account_name: account_name.map(str::to_string),
        account_key: account_key.map(str::to_string),
        ..Default::default()
    })
    .with_string_signer(signer.clone())
    .sign(PHOTO_URL, None)
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_bad_key_is_crypto_failure() {
    let signer = CountingSigner::new();
    let err = BlobUrlSigner::new(
        Context::new(),
        Config::default(),
        StaticCredentialProvider::new_shared_key("coachpro", "not base64!"),
    )
    .with_string_signer(signer.clone())
    .sign(PHOTO_URL, None)
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CryptoFailed);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_signing_invokes_primitive_once() {
    let signer = CountingSigner::new();
    coachpro_signer()
        .with_string_signer(signer.clone())
        .sign(PHOTO_URL, None)
        .await
        .unwrap();

    assert_eq!(signer.calls(), 1);
}
