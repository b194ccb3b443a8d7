// Terminal chat against the same pipeline the HTTP server uses.
// The web front end lives in ../api.

use anyhow::{Context, Result};
use nova_rag::{build_chat_service, Settings, Speaker};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env().context("failed to load settings")?;
    let chat = build_chat_service(&settings).context("failed to initialize Nova")?;
    let session_id = chat.sessions().create().await;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Nova is listening. Type a question, /reset to clear, /quit to leave.");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                chat.sessions().reset(session_id).await?;
                println!("Transcript cleared.");
            }
            _ => {
                let outcome = chat.run_turn(session_id, &line).await?;
                println!("{}: {}", Speaker::Assistant.label(), outcome.answer);
            }
        }
    }

    Ok(())
}
