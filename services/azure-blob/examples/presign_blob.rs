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

use anyhow::Result;
use blobsign_azure_blob::BlobUrlSigner;
use blobsign_core::{Context, OsEnv};
use reqwest::Client;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    // Reads AZURE_STORAGE_CONNECTION_STRING, or AZURE_STORAGE_ACCOUNT_NAME and
    // AZURE_STORAGE_ACCOUNT_KEY.
    let ctx = Context::new().with_env(OsEnv);
    let signer = BlobUrlSigner::from_env(ctx)?;

    let Some(blob_url) = std::env::args().nth(1) else {
        println!("usage: presign_blob <blob url> [expires in minutes]");
        println!(
            "example: presign_blob https://coachpro.blob.core.windows.net/progress-photos/user123/front.jpg 15"
        );
        return Ok(());
    };
    let minutes = std::env::args().nth(2).map(|v| v.parse()).transpose()?;

    let signed = signer.sign(&blob_url, minutes).await?;
    println!("{}", signed.url);
    println!("expires at {}", signed.expires_at);

    // Only fetch when explicitly asked, signing itself never touches the network.
    if std::env::var("BLOBSIGN_FETCH").unwrap_or_default() == "on" {
        let resp = Client::new().head(&signed.url).send().await?;
        println!("HEAD {}", resp.status());
    }

    Ok(())
}
