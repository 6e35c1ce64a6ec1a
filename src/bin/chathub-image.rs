//! Ask Gemini questions about a local image until a quit keyword is entered.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chathub::http::reqwest::default_dyn_transport;
use chathub::image_query::{GOODBYE, ImageQueryHandler};
use chathub::{ClientSettings, logging};

fn prompt(input: &mut impl BufRead, text: &str) -> Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    logging::init();

    let settings = ClientSettings::from_env().context("invalid client settings")?;
    let transport = default_dyn_transport(&settings).context("failed to build HTTP client")?;
    let handler = ImageQueryHandler::from_env(transport).with_max_attempts(settings.max_attempts);

    println!("=== Gemini Image Analysis ===");
    println!("Type 'quit', 'q' or 'exit' as the question to leave.");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut image_path = String::new();
    loop {
        let path_prompt = if image_path.is_empty() {
            "\nImage path: ".to_string()
        } else {
            format!("\nImage path [{image_path}]: ")
        };
        let Some(path) = prompt(&mut input, &path_prompt)? else {
            break;
        };
        if !path.is_empty() {
            image_path = path;
        }
        let Some(question) = prompt(&mut input, "Question: ")? else {
            break;
        };

        let answer = handler.answer(&image_path, &question, None).await;
        println!("\n{answer}");
        if answer == GOODBYE {
            break;
        }
    }
    Ok(())
}
