//! narrator main entry point
//!
//! Speaks one line of text with a configured character voice:
//!
//!   narrator [--debug] [--locale <L>] [--character <C>] <text>...
//!
//! The voice preset comes from the `[voice.<locale>.<character>]` section of
//! the config file; the synthesized audio plays on the default output device.

use anyhow::{anyhow, Context};
use log::{error, info};
use narrator::config::Config;
use narrator::speech::{SpeechPlayer, VoiceProfile};
use std::process;
use std::time::Duration;

/// Trailing delay after natural playback end
///
/// Gives the output device a beat to drain before the process exits.
const TRAILING_DELAY: Duration = Duration::from_millis(100);

/// Parsed command line
struct Args {
    debug_mode: bool,
    locale: String,
    character: String,
    text: String,
}

fn print_usage() {
    eprintln!("Usage: narrator [--debug] [--locale <locale>] [--character <name>] <text>...");
    eprintln!();
    eprintln!("  --locale     Voice locale (default: vi-VN)");
    eprintln!("  --character  Character preset name (default: male)");
    eprintln!("  --debug      Log debug output to narrator.log");
}

fn parse_args() -> anyhow::Result<Args> {
    let mut debug_mode = false;
    let mut locale = "vi-VN".to_string();
    let mut character = "male".to_string();
    let mut text_parts: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => debug_mode = true,
            "--locale" | "-l" => {
                locale = args.next().ok_or_else(|| anyhow!("--locale needs a value"))?;
            }
            "--character" | "-c" => {
                character = args
                    .next()
                    .ok_or_else(|| anyhow!("--character needs a value"))?;
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            _ => text_parts.push(arg),
        }
    }

    if text_parts.is_empty() {
        return Err(anyhow!("No text to speak"));
    }

    Ok(Args {
        debug_mode,
        locale,
        character,
        text: text_parts.join(" "),
    })
}

fn init_logger(debug_mode: bool) {
    if debug_mode {
        // Debug mode: write to narrator.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("narrator.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open narrator.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "narrator version {} starting (debug mode, logging to narrator.log)",
            narrator::VERSION
        );
    } else {
        // Normal mode: minimal logging to stderr, only errors
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }
}

#[tokio::main]
async fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    init_logger(args.debug_mode);

    if let Err(e) = run(args).await {
        error!("Fatal error: {}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    info!("Config loaded from {:?}", config.path());

    let preset = config.preset(&args.locale, &args.character).ok_or_else(|| {
        anyhow!(
            "No voice preset [voice.{}.{}] in {:?} (configured locales: {:?})",
            args.locale,
            args.character,
            config.path(),
            config.locales()
        )
    })?;

    let profile = VoiceProfile::from_preset(&args.locale, preset);
    info!(
        "Speaking as {}/{} (voice {})",
        args.locale, args.character, profile.voice
    );

    let mut player = SpeechPlayer::new(profile, &config)?;
    player
        .speak(&args.text, TRAILING_DELAY)
        .await
        .context("Speech playback failed")?;

    Ok(())
}
