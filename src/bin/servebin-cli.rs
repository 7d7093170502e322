use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::ACCEPT;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "servebin-cli")]
#[command(about = "Query a running ServeBin instance", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8888")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the address the server sees for this client
    Ip,
    /// Show the headers the server received
    Headers,
    /// Show host statistics
    Heartbeat,
    /// Download a generated image
    Image {
        /// Format token (png, svg, gif, ...); omitted means Accept negotiation
        #[arg(short, long)]
        format: Option<String>,

        /// Accept header sent when no format is given
        #[arg(short, long)]
        accept: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Ip => {
            let res = client.get(format!("{}/ip", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Headers => {
            let res = client.get(format!("{}/headers", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Heartbeat => {
            let res = client.get(format!("{}/heartbeat", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Image {
            format,
            accept,
            output,
        } => {
            let url = match &format {
                Some(token) => format!("{}/image/{}", base, token),
                None => format!("{}/image", base),
            };
            let mut request = client.get(url);
            if let Some(accept) = accept {
                request = request.header(ACCEPT, accept);
            }

            let res = request.send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: server returned status {}", status);
                if let Ok(text) = res.text().await {
                    if !text.is_empty() {
                        eprintln!("Response: {}", text);
                    }
                }
                return Ok(());
            }

            let content_type = res
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string();
            let bytes = res.bytes().await?;
            tokio::fs::write(&output, &bytes).await?;
            println!("Wrote {} bytes of {} to {}", bytes.len(), content_type, output.display());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
