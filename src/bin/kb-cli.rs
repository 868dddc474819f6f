use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "kb-cli")]
#[command(about = "Query a running knowledge-base gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Sent as X-Forwarded-For, to exercise per-client rate limits
    #[arg(long)]
    client: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gateway liveness
    Health,
    /// Upstream system info (cached)
    Info,
    /// List knowledge-base documents (cached)
    List,
    /// Fetch a document by path
    Doc {
        /// Document path, e.g. "getting-started"
        slug: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let path = match &cli.command {
        Commands::Health => "/healthz".to_string(),
        Commands::Info => "/api/kb/info".to_string(),
        Commands::List => "/api/kb/list".to_string(),
        Commands::Doc { slug } => format!("/api/kb/doc/{}", slug.trim_start_matches('/')),
    };

    let mut request = client.get(format!("{base}{path}"));
    if let Some(addr) = &cli.client {
        request = request.header("x-forwarded-for", addr);
    }

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let cache = res
        .headers()
        .get("x-cache")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    if let Some(error) = failure(status) {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(error.into());
    }

    if let Some(cache) = cache {
        eprintln!("X-Cache: {}", cache);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Non-2xx answers become errors so the process exits non-zero.
fn failure(status: reqwest::StatusCode) -> Option<String> {
    (!status.is_success()).then(|| format!("gateway returned status {}", status))
}
