use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "fakeapi-cli")]
#[command(about = "Management CLI for the fake API server", long_about = None)]
struct Cli {
    #[arg(short, long, env = "FAKEAPI_URL", default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "FAKEAPI_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Status,
    /// Create or replace a tenant
    PutTenant {
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Delete a tenant and its endpoints
    DeleteTenant { id: String },
    /// List a tenant's endpoints
    Endpoints { tenant: String },
    /// Create an endpoint from a JSON definition file
    CreateEndpoint { file: PathBuf },
    /// Delete an endpoint
    DeleteEndpoint { id: String },
    /// Show the most recent captured webhooks
    Webhooks {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Show one captured webhook
    Webhook { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request = match cli.command {
        Commands::Status => client.get(format!("{base}/admin/status")),
        Commands::PutTenant { id, name, domain } => client
            .put(format!("{base}/admin/tenants"))
            .json(&json!({ "id": id, "name": name, "customDomain": domain })),
        Commands::DeleteTenant { id } => client.delete(format!("{base}/admin/tenants/{id}")),
        Commands::Endpoints { tenant } => client.get(format!("{base}/admin/tenants/{tenant}/endpoints")),
        Commands::CreateEndpoint { file } => {
            let definition: Value = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            client.post(format!("{base}/admin/endpoints")).json(&definition)
        }
        Commands::DeleteEndpoint { id } => client.delete(format!("{base}/admin/endpoints/{id}")),
        Commands::Webhooks { limit } => client
            .get(format!("{base}/admin/webhooks"))
            .query(&[("limit", limit)]),
        Commands::Webhook { id } => client.get(format!("{base}/admin/webhooks/{id}")),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
