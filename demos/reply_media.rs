//! Media Reply Example
//!
//! This example sends a text reply followed by image and audio replies to an
//! Iris room, mixing the accepted input kinds: a URL, a decoded image, raw
//! bytes and a local file. Inputs that fail to load are logged and skipped.
//!
//! # Running
//!
//! ```bash
//! IRIS_ENDPOINT=http://127.0.0.1:3000 IRIS_ROOM=18219201472247343 \
//!     RUST_LOG=iris_client=debug cargo run --example reply_media -- ./jingle.mp3
//! ```
//!
//! Set `IRIS_LOUD_WIRE=1` as well to see the raw requests.

use image::{DynamicImage, Rgba, RgbaImage};
use iris_client::{Client, MediaInput};
use std::env;
use tracing_subscriber::EnvFilter;

const SAMPLE_IMAGE_URL: &str = "https://www.rust-lang.org/logos/rust-logo-512x512.png";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;
    let room_id: i64 = env::var("IRIS_ROOM")
        .expect("IRIS_ROOM environment variable not set")
        .parse()?;

    println!("=== MEDIA REPLY EXAMPLE ===\n");

    client.reply(room_id, "Sending some media...", None).await?;

    // A 16x16 orange square, drawn in memory
    let square = RgbaImage::from_pixel(16, 16, Rgba([255, 140, 0, 255]));

    let response = client
        .reply_media(
            room_id,
            vec![
                MediaInput::location(SAMPLE_IMAGE_URL),
                MediaInput::Image(DynamicImage::ImageRgba8(square)),
            ],
            None,
        )
        .await?;
    println!("Image reply: {:?}", response);

    match env::args().nth(1) {
        Some(path) => {
            let response = client.reply_audio(room_id, MediaInput::path(path), None).await?;
            match response {
                Some(response) => println!("Audio reply: {:?}", response.message()),
                None => println!("Audio file could not be loaded; nothing was sent"),
            }
        }
        None => println!("No audio path given; skipping audio reply"),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
