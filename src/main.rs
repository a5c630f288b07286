use ai_stylist::media::{self, MediaPart};
use ai_stylist::models::{Config, Product};
use ai_stylist::session::ChatSession;
use ai_stylist::stylist::{persist_image, Stylist};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ai-stylist")]
#[command(about = "AI Stylist: chat, try furniture in your room, and preview it in 3D")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chat with the stylist. `/image <path>` attaches a photo, `/quit` exits.
    Chat,
    /// Place a product into a photo of your room.
    TryInRoom {
        /// Photo of the room.
        #[arg(long, value_name = "PATH")]
        room: PathBuf,
        #[arg(long)]
        product_name: String,
        /// Product image URL from the catalog.
        #[arg(long, value_name = "URL")]
        product_image: String,
    },
    /// Animate a product photo into a short parallax video.
    Visualize {
        #[arg(long, default_value = "Product")]
        product_name: String,
        #[arg(long, value_name = "URL")]
        product_image: String,
        #[arg(long, default_value = "16:9", value_parser = parse_aspect_ratio)]
        aspect_ratio: String,
    },
}

fn parse_aspect_ratio(input: &str) -> std::result::Result<String, String> {
    match input {
        "16:9" | "9:16" => Ok(input.to_string()),
        _ => Err(format!(
            "Invalid aspect ratio '{}'. Expected 16:9 or 9:16",
            input
        )),
    }
}

async fn run_chat(stylist: &Stylist) -> Result<()> {
    let mut session = ChatSession::new();
    println!("{}", session.greeting());

    let mut pending_image: Option<MediaPart> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if let Some(path) = line.strip_prefix("/image ") {
            match media::encode_file(path.trim()).await {
                Ok(part) => {
                    pending_image = Some(part);
                    println!("(photo attached)");
                }
                Err(e) => println!("{}", e),
            }
            continue;
        }
        if line.is_empty() && pending_image.is_none() {
            continue;
        }

        match stylist.chat(&mut session, line, pending_image.clone()).await {
            Ok(reply) => {
                pending_image = None;
                println!("{}", reply);
            }
            Err(e) => {
                error!("Chat turn failed ({}): {}", e.kind(), e);
                println!("{}", e);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ai_stylist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };
    let stylist = Stylist::new(&config);

    let outcome = match args.command {
        Command::Chat => run_chat(&stylist).await,
        Command::TryInRoom {
            room,
            product_name,
            product_image,
        } => {
            let product = Product {
                name: product_name,
                image_url: product_image,
            };
            async {
                let room = media::encode_file(&room).await?;
                let image = stylist.try_in_room(&room, &product).await?;
                let location = persist_image(&image, &config.output_dir).await?;
                println!("{}", location);
                Ok::<_, ai_stylist::Error>(())
            }
            .await
            .map_err(anyhow::Error::from)
        }
        Command::Visualize {
            product_name,
            product_image,
            aspect_ratio,
        } => {
            let product = Product {
                name: product_name,
                image_url: product_image,
            };
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received, cancelling video generation");
                    on_interrupt.cancel();
                }
            });

            stylist
                .visualize_in_3d(&product, &aspect_ratio, &cancel)
                .await
                .map(|video| println!("{}", video.path.display()))
                .map_err(anyhow::Error::from)
        }
    };

    if let Err(e) = outcome {
        error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}
