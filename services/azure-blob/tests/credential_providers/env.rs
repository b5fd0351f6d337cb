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
    EnvCredentialProvider, AZBLOB_ACCOUNT_KEY, AZBLOB_ACCOUNT_NAME, AZURE_STORAGE_ACCOUNT_KEY,
    AZURE_STORAGE_ACCOUNT_NAME, AZURE_STORAGE_CONNECTION_STRING,
};
use blobsign_core::{Context, ProvideCredential, StaticEnv};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_env_provider_prefers_individual_values() {
    let ctx = Context::new().with_env(StaticEnv::from_pairs([
        (AZURE_STORAGE_ACCOUNT_NAME, "direct"),
        (AZURE_STORAGE_ACCOUNT_KEY, "ZGlyZWN0"),
        (
            AZURE_STORAGE_CONNECTION_STRING,
            "AccountName=fromconn;AccountKey=Y29ubg==",
        ),
    ]));

    let cred = EnvCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cred.account_name, "direct");
    assert_eq!(cred.account_key, "ZGlyZWN0");
}

#[tokio::test]
async fn test_env_provider_accepts_azblob_names() {
    let ctx = Context::new().with_env(StaticEnv::from_pairs([
        (AZBLOB_ACCOUNT_NAME, "azblob"),
        (AZBLOB_ACCOUNT_KEY, "YXpibG9i"),
    ]));

    let cred = EnvCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cred.account_name, "azblob");
}

#[tokio::test]
async fn test_env_provider_mixes_sources() {
    // Name from env, key from the connection string.
    let ctx = Context::new().with_env(StaticEnv::from_pairs([
        (AZURE_STORAGE_ACCOUNT_NAME, "direct"),
        (AZURE_STORAGE_CONNECTION_STRING, "AccountKey=Y29ubg=="),
    ]));

    let cred = EnvCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cred.account_name, "direct");
    assert_eq!(cred.account_key, "Y29ubg==");
}
