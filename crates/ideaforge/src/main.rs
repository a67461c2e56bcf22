//! A terminal front end for interviewing yourself about an idea.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::pin::pin;
use std::time::Duration;

use ideaforge::SessionBuilder;
use ideaforge::core::{Error, GatewayConfig};
use ideaforge_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";
const NEW_IDEA_TITLE: &str = "New Idea";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // A missing key is reported on the first model call instead.
    let mut config = OpenAIConfigBuilder::new()
        .with_optional_api_key(env::var("OPENAI_API_KEY").ok());
    if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    if let Ok(model) = env::var("OPENAI_MODEL") {
        config = config.with_model(model);
    }
    let model_provider = OpenAIProvider::new(config.build());

    let session = SessionBuilder::with_model_provider(model_provider)
        .with_gateway_config(gateway_config_from_env())
        .build();
    let mut interview = match session.start(NEW_IDEA_TITLE).await {
        Ok(interview) => interview,
        Err(err) => {
            print_error(&err);
            return;
        }
    };

    println!(
        "{}💡 Describe your idea. Commands: {}, {}, {}",
        BAR_CHAR.bright_cyan(),
        "/report".bold(),
        "/json".bold(),
        "/quit".bold()
    );

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };

        match line.trim() {
            "/quit" => break,
            "/report" => {
                let result = with_spinner(
                    &progress_style,
                    "📝 Writing the report...",
                    interview.end_interview(),
                )
                .await;
                match result {
                    Ok(Some(generated)) => println!("\n{}", generated.markdown),
                    Ok(None) => println!(
                        "{}{}",
                        BAR_CHAR.bright_cyan(),
                        "Nothing to report yet, describe your idea first.".dimmed()
                    ),
                    Err(err) => print_error(&err),
                }
            }
            "/json" => match interview.export_json() {
                Ok((file_name, json)) => {
                    println!("{}{}", BAR_CHAR.bright_cyan(), file_name.dimmed());
                    println!("{json}");
                }
                Err(err) => print_error(&err),
            },
            text => {
                let result = with_spinner(
                    &progress_style,
                    "🤔 Thinking...",
                    interview.send_message(text),
                )
                .await;
                match result {
                    Ok(Some(reply)) => println!(
                        "{}🤖 {}",
                        BAR_CHAR.bright_cyan(),
                        reply.bright_white()
                    ),
                    Ok(None) => {}
                    Err(err) => print_error(&err),
                }
            }
        }
    }
}

fn gateway_config_from_env() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    if let Some(max_retries) = parse_env::<u32>("IDEAFORGE_MAX_RETRIES") {
        config = config.with_max_retries(max_retries);
    }
    if let Some(delay_ms) = parse_env::<u64>("IDEAFORGE_RETRY_DELAY_MS") {
        config = config.with_retry_delay(Duration::from_millis(delay_ms));
    }
    config
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring invalid {name}: {value:?}");
            None
        }
    }
}

async fn with_spinner<T>(
    style: &ProgressStyle,
    message: &'static str,
    fut: impl Future<Output = T>,
) -> T {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(style.clone());
    progress_bar.set_message(message);

    let mut fut = pin!(fut);
    loop {
        select! {
            output = &mut fut => {
                // Finish the progress bar before printing anything else.
                progress_bar.finish_and_clear();
                return output;
            }
            _ = sleep(Duration::from_millis(100)) => {
                progress_bar.inc(1);
            }
        }
    }
}

fn print_error(err: &Error) {
    let bar = BAR_CHAR.bright_red();
    eprintln!("{bar}⚠️  {}", err.bright_red());
    eprintln!("{bar}{}", err.user_hint().dimmed());
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
