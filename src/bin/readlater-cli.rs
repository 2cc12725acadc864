use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "readlater-cli")]
#[command(about = "Drive a running read-later proxy through its legacy API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:80")]
    url: String,

    /// Account token; the proxy's fallback credential is used when omitted.
    #[arg(short, long, env = "READLATER_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the proxy is up
    Beep,
    /// List saved articles
    List,
    /// Fetch the text of one article
    Text { url: String },
    /// Archive items by id
    Archive { item_ids: Vec<String> },
    /// Delete items by id
    Delete { item_ids: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut body = json!({});
    if let Some(token) = &cli.token {
        body["access_token"] = json!(token);
    }

    let res = match cli.command {
        Commands::Beep => {
            let res = client.get(format!("{}/beep", cli.url)).send().await?;
            println!("{} {}", res.status(), res.text().await?);
            return Ok(());
        }
        Commands::List => client.post(format!("{}/v3/get", cli.url)).json(&body),
        Commands::Text { url } => {
            body["url"] = json!(url);
            client.post(format!("{}/v3beta/text", cli.url)).json(&body)
        }
        Commands::Archive { item_ids } => {
            body["actions"] = actions("archive", &item_ids);
            client.post(format!("{}/v3/send", cli.url)).json(&body)
        }
        Commands::Delete { item_ids } => {
            body["actions"] = actions("delete", &item_ids);
            client.post(format!("{}/v3/send", cli.url)).json(&body)
        }
    }
    .send()
    .await?;

    print_response(res).await
}

fn actions(action: &str, item_ids: &[String]) -> Value {
    item_ids
        .iter()
        .map(|id| json!({ "action": action, "item_id": id }))
        .collect()
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
