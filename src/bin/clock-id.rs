/// Command-line client for the day clock API.
///
/// Usage:
///   clock-id generate [--attempts N] [--wordlist PATH]
///   clock-id show <ID> [--day MON | --today]
///   clock-id set <ID> --message TEXT
///   clock-id set <ID> --day MON=Walk --day FRI=Pizza

use std::path::PathBuf;

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use dayclock_api::{
    models::clock::{DayCode, PostClockRequest},
    services::{
        client::HttpClockClient,
        generator::{ClockIdGenerator, Wordlist, DEFAULT_MAX_ATTEMPTS},
    },
};

#[derive(Parser)]
#[command(name = "clock-id", about = "Generate clock ids and read or set day clock messages")]
struct Args {
    /// Base URL of the clock API
    #[arg(long, env = "DAYCLOCK_API_URL", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a fresh three-word clock id that is not yet in use
    Generate {
        /// Give up after this many taken candidates
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        attempts: u32,
        /// Newline-separated word file (defaults to the bundled list)
        #[arg(long)]
        wordlist: Option<PathBuf>,
    },
    /// Print the stored record for a clock
    Show {
        clock_id: String,
        /// Only print the message shown on this day (MON..SUN)
        #[arg(long, conflicts_with = "today")]
        day: Option<DayCode>,
        /// Only print the message shown today, in local time
        #[arg(long)]
        today: bool,
    },
    /// Replace the message for a clock
    Set {
        clock_id: String,
        /// One message for every day
        #[arg(long, conflicts_with = "day")]
        message: Option<String>,
        /// Per-day message as DAY=TEXT, repeatable
        #[arg(long, value_parser = parse_day_message)]
        day: Vec<(DayCode, String)>,
        #[arg(long)]
        image_url: Option<String>,
    },
}

fn parse_day_message(raw: &str) -> Result<(DayCode, String), String> {
    let (day, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DAY=TEXT, got '{raw}'"))?;
    let day = day.parse::<DayCode>().map_err(|e| e.to_string())?;
    Ok((day, text.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = HttpClockClient::new(args.endpoint);

    match args.command {
        Command::Generate { attempts, wordlist } => {
            let words = match wordlist {
                Some(path) => Wordlist::load(&path)?,
                None => Wordlist::bundled()?,
            };
            let generator = ClockIdGenerator::new(client, words).with_max_attempts(attempts);
            println!("{}", generator.generate_unique().await?);
        }
        Command::Show {
            clock_id,
            day,
            today,
        } => {
            let day = day.or_else(|| today.then(|| DayCode::from_weekday(Local::now().weekday())));
            let Some(record) = client.get(&clock_id).await? else {
                anyhow::bail!("No message set for clock '{clock_id}'");
            };
            match day {
                Some(day) => println!("{}", record.message_for(day).unwrap_or_default()),
                None => println!("{}", serde_json::to_string_pretty(&record)?),
            }
        }
        Command::Set {
            clock_id,
            message,
            day,
            image_url,
        } => {
            let messages = if day.is_empty() {
                None
            } else {
                let map: serde_json::Map<String, serde_json::Value> = day
                    .into_iter()
                    .map(|(d, text)| (d.to_string(), serde_json::Value::String(text)))
                    .collect();
                Some(serde_json::Value::Object(map))
            };
            if message.is_none() && messages.is_none() {
                anyhow::bail!("Pass --message or at least one --day");
            }
            let resp = client
                .post(&PostClockRequest {
                    clock_id: Some(clock_id),
                    single_message: message,
                    message: None,
                    messages,
                    image_url,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }

    Ok(())
}
