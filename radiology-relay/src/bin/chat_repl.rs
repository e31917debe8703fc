use std::sync::Arc;
use std::time::Duration;

use radiology_core::{ChatSession, ConversationState, HttpChatClient, SendOutcome};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Interactive chat against a running relay.
/// Usage: CHAT_ENDPOINT_URL=http://localhost:3000/chat cargo run --bin chat_repl
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let endpoint = std::env::var("CHAT_ENDPOINT_URL")
        .unwrap_or_else(|_| "http://localhost:3000/chat".to_string());

    let mut client = HttpChatClient::new(endpoint);
    if let Ok(key) = std::env::var("CHAT_API_KEY") {
        client = client.with_api_key(key);
    }

    info!("Chatting with {}", client.endpoint());
    println!(
        "Radiology assistant ({}). Commands: /clear, /quit",
        client.endpoint()
    );

    let mut session = ChatSession::new(Arc::new(client));
    if let Some(secs) = std::env::var("CHAT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        session = session.with_timeout(Duration::from_secs(secs));
    }

    let mut state = ConversationState::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" => break,
            "/clear" => {
                session.clear_chat(&mut state);
                println!("(conversation cleared)");
            }
            _ => {
                if session.send_message(&mut state, &line).await != SendOutcome::Ignored {
                    if let Some(turn) = state.last() {
                        println!("\n{}\n", turn.content);
                    }
                }
            }
        }
    }

    Ok(())
}
