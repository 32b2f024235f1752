//! List every campaign in the configured organization
//!
//! Reads credentials from `~/.aads/config.yaml`, overridden by `AADS_*`
//! environment variables, then pages through `/campaigns`.
//!
//! ## Usage
//!
//! ```bash
//! export AADS_CLIENT_ID=SEARCHADS.xxxx
//! export AADS_TEAM_ID=SEARCHADS.xxxx
//! export AADS_KEY_ID=xxxx
//! export AADS_ORG_ID=123456
//! export AADS_PRIVATE_KEY_PATH=~/.aads/private-key.pem
//! cargo run --example list_campaigns --features trace -- --verbose
//! ```

use searchads::{Client, ClientConfig, Credentials};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Campaign {
    id: i64,
    name: String,
    #[serde(default)]
    status: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let verbose = std::env::args().any(|a| a == "--verbose" || a == "-v");
    searchads::observability::init_tracing(verbose);

    let credentials = Credentials::load()?;
    credentials.validate()?;

    let client = Client::from_config(ClientConfig::with_credentials(credentials))?;
    let campaigns: Vec<Campaign> = client.list_all("/campaigns", 0, 0).await?;

    for campaign in &campaigns {
        println!("{:>12}  {:<10}  {}", campaign.id, campaign.status, campaign.name);
    }
    println!("{} campaigns", campaigns.len());
    Ok(())
}
