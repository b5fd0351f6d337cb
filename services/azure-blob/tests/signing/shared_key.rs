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

use blobsign_azure_blob::{BlobUrlSigner, Config, RequestSigner, StaticCredentialProvider};
use blobsign_core::hash::{base64_decode, base64_hmac_sha256};
use blobsign_core::{Context, ErrorKind, Signer};
use http::header::AUTHORIZATION;
use http::Method;
use pretty_assertions::assert_eq;
use std::time::Duration;

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

#[tokio::test]
async fn test_upload_request_is_signed() {
    init_logger();

    let parts = coachpro_signer()
        .sign_for_upload(PHOTO_URL, 11, "image/jpeg")
        .await
        .unwrap();

    assert_eq!(parts.method, Method::PUT);
    assert_eq!(parts.uri.to_string(), PHOTO_URL);
    assert_eq!(parts.headers["x-ms-blob-type"], "BlockBlob");
    assert_eq!(parts.headers["x-ms-version"], "2020-10-02");
    assert_eq!(parts.headers["content-length"], "11");
    assert_eq!(parts.headers["content-type"], "image/jpeg");

    // Recompute the signature from the date the signer picked.
    let date = parts.headers["x-ms-date"].to_str().unwrap();
    let string_to_sign = format!(
        "PUT\n\n\n11\n\nimage/jpeg\n\n\n\n\n\n\n\
         x-ms-blob-type:BlockBlob\nx-ms-date:{date}\nx-ms-version:2020-10-02\n\
         /coachpro/progress-photos/user123/1700000000000-front.jpg"
    );
    let expected = base64_hmac_sha256(
        &base64_decode(AZURITE_KEY).unwrap(),
        string_to_sign.as_bytes(),
    )
    .unwrap();

    assert_eq!(
        parts.headers[AUTHORIZATION].to_str().unwrap(),
        format!("SharedKey coachpro:{expected}")
    );
}

#[tokio::test]
async fn test_upload_without_content_type() {
    let parts = coachpro_signer()
        .sign_for_upload(PHOTO_URL, 0, "")
        .await
        .unwrap();

    assert!(!parts.headers.contains_key("content-type"));
    assert!(parts.headers.contains_key(AUTHORIZATION));
}

#[tokio::test]
async fn test_upload_shares_primitive_with_sas() {
    let signer = CountingSigner::new();
    let blob_signer = coachpro_signer().with_string_signer(signer.clone());

    blob_signer
        .sign_for_upload(PHOTO_URL, 11, "image/jpeg")
        .await
        .unwrap();
    blob_signer.sign(PHOTO_URL, None).await.unwrap();

    assert_eq!(signer.calls(), 2);
}

#[tokio::test]
async fn test_upload_with_missing_credential() {
    let signer = CountingSigner::new();
    let err = BlobUrlSigner::from_config(Config::default())
        .with_string_signer(signer.clone())
        .sign_for_upload(PHOTO_URL, 11, "image/jpeg")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn test_upload_with_malformed_url() {
    let err = coachpro_signer()
        .sign_for_upload("https://coachpro.blob.core.windows.net/progress-photos", 1, "")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
}

#[tokio::test]
async fn test_request_signer_refuses_query_signing() {
    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new_shared_key("coachpro", AZURITE_KEY),
        RequestSigner::new(),
    );

    let mut parts = http::Request::get(PHOTO_URL)
        .body(())
        .unwrap()
        .into_parts()
        .0;
    let err = signer
        .sign(&mut parts, Some(Duration::from_secs(60)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
}
