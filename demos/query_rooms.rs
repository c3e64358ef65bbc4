//! Query Example
//!
//! This example reads the gateway configuration and runs a parameterized
//! query against the chat database, deserializing rows into a struct.
//!
//! # Running
//!
//! ```bash
//! IRIS_ENDPOINT=http://127.0.0.1:3000 cargo run --example query_rooms
//! ```

use iris_client::Client;
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct RecentMessage {
    chat_id: serde_json::Value,
    message: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    println!("=== QUERY EXAMPLE ===\n");

    let info = client.get_info().await?;
    println!("--- Gateway config ---");
    for (key, value) in info.as_map() {
        println!("{key}: {value}");
    }
    println!();

    let rows: Vec<RecentMessage> = client
        .query_as(
            "SELECT chat_id, message FROM chat_logs ORDER BY created_at DESC LIMIT ?",
            Some(vec![json!(5)]),
        )
        .await?;

    println!("--- Last {} messages ---", rows.len());
    for row in rows {
        println!("[{}] {}", row.chat_id, row.message.unwrap_or_default());
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
