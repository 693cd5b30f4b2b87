use anyhow::Result;
use recite::audio::{default_output, AudioOutput, NullOutput};
use recite::integration::{AppConfig, ChatSession};
use recite::speech::{PlaybackQueue, TTSClient};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recite=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recite voice chat");

    let config = AppConfig::from_env();
    config.validate()?;

    let tts = TTSClient::new()?;

    // Surface backend availability early; failures are warnings, not fatal.
    match tts.probe(&config.tts.base_url).await {
        Ok(server) => info!(
            "TTS backend: {} {} ({})",
            server.service, server.version, server.status
        ),
        Err(e) => warn!("TTS backend probe failed: {}", e),
    }

    let output: Arc<dyn AudioOutput> = if config.enable_audio_output {
        default_output()
    } else {
        Arc::new(NullOutput)
    };

    let queue = Arc::new(PlaybackQueue::new(
        Arc::new(tts.clone()),
        output,
        config.tts.clone(),
    ));
    let mut session = ChatSession::new(&config, Arc::clone(&queue))?;

    println!("Type a message and press enter. Commands: :stop, :voices, :character <id>, :clear, :quit");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":stop" => session.stop_speaking(),
            ":clear" => {
                session.clear();
                println!("(history cleared)");
            }
            ":voices" => match tts.fetch_voices(&config.tts.base_url).await {
                Ok(voices) => {
                    for voice in voices {
                        match voice.description {
                            Some(description) => println!("{}  {}", voice.id, description),
                            None => println!("{}", voice.id),
                        }
                    }
                }
                Err(e) => warn!("Could not list voices: {}", e),
            },
            command if command.starts_with(":character ") => {
                let id = command.trim_start_matches(":character ").trim();
                match tts.fetch_characters(&config.tts.base_url).await {
                    Ok(characters) => match characters.iter().find(|c| c.id == id) {
                        Some(character) => {
                            session.apply_character(character);
                            println!("(speaking as {})", character.name);
                        }
                        None => println!("(no character named {id})"),
                    },
                    Err(e) => warn!("Could not list characters: {}", e),
                }
            }
            text => match session.send(text).await {
                Ok(reply) => println!("{reply}"),
                Err(e) => warn!("Chat turn failed: {}", e),
            },
        }
    }

    session.stop_speaking();
    info!("Goodbye");
    Ok(())
}
