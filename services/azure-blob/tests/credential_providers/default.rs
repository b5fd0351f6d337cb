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

use blobsign_azure_blob::{
    BlobUrlSigner, Config, DefaultCredentialProvider, AZURE_STORAGE_CONNECTION_STRING,
    AZURE_STORAGE_CONTAINER_NAME,
};
use blobsign_core::{Context, ErrorKind, ProvideCredential, StaticEnv};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_default_provider_without_env() {
    let cred = DefaultCredentialProvider::default()
        .provide_credential(&Context::new())
        .await
        .unwrap();
    assert!(cred.is_none());
}

#[tokio::test]
async fn test_default_provider_config_first() {
    let ctx = Context::new().with_env(StaticEnv::from_pairs([(
        AZURE_STORAGE_CONNECTION_STRING,
        "AccountName=fromconn;AccountKey=Y29ubg==",
    )]));

    let provider = DefaultCredentialProvider::new(Config {
        account_name: Some("explicit".to_string()),
        account_key: Some("ZXhwbGljaXQ=".to_string()),
        ..Default::default()
    });
    let cred = provider.provide_credential(&ctx).await.unwrap().unwrap();
    assert_eq!(cred.account_name, "explicit");
}

#[tokio::test]
async fn test_signer_from_connection_string_env() {
    let ctx = Context::new().with_env(StaticEnv::from_pairs([
        (
            AZURE_STORAGE_CONNECTION_STRING,
            "DefaultEndpointsProtocol=https;AccountName=coachpro;AccountKey=a2V5;EndpointSuffix=core.windows.net",
        ),
        (AZURE_STORAGE_CONTAINER_NAME, "progress-photos"),
    ]));

    let signed = BlobUrlSigner::from_env(ctx)
        .unwrap()
        .sign_blob(None, "user123/front.jpg", None)
        .await
        .unwrap();
    assert!(signed.url.starts_with(
        "https://coachpro.blob.core.windows.net/progress-photos/user123/front.jpg?sv=2020-10-02&"
    ));
}

#[tokio::test]
async fn test_signer_from_broken_connection_string() {
    let ctx = Context::new().with_env(StaticEnv::from_pairs([(
        AZURE_STORAGE_CONNECTION_STRING,
        "AccountName=coachpro;AccountKey",
    )]));

    let err = BlobUrlSigner::from_env(ctx).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}
