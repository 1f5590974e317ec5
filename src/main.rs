//! pitchscrape CLI entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use pitchscrape::table::{events_table, matches_table};
use pitchscrape::whoscored::{fixtures::team_fixtures, Scraper};
use pitchscrape::{export, ScraperConfig};

#[derive(Debug, Parser)]
#[command(name = "pitchscrape", version, about = "WhoScored match and event scraper")]
struct Cli {
    /// Run the browser headless
    #[arg(long, global = true)]
    headless: bool,

    /// Explicit Chrome/Chromium executable path
    #[arg(long, global = true, value_name = "FILE")]
    chrome: Option<String>,

    /// Minimum pause between page actions, in milliseconds
    #[arg(long, global = true, default_value_t = 2000)]
    min_delay_ms: u64,

    /// Maximum pause between page actions, in milliseconds
    #[arg(long, global = true, default_value_t = 5000)]
    max_delay_ms: u64,

    /// Page operation timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,

    /// Browser window width
    #[arg(long, global = true, default_value_t = 1920)]
    window_width: u32,

    /// Browser window height
    #[arg(long, global = true, default_value_t = 1080)]
    window_height: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the popular tournaments and their URLs
    Competitions,

    /// Scrape a season's fixtures into a matches CSV
    Matches {
        /// Competition name as shown in the popular tournaments list
        #[arg(long)]
        competition: String,

        /// Season label, e.g. "2023/2024"
        #[arg(long)]
        season: String,

        /// Only fixtures involving this team
        #[arg(long)]
        team: Option<String>,

        /// Output CSV path
        #[arg(short, long, value_name = "FILE", default_value = "matches.csv")]
        output: PathBuf,
    },

    /// Scrape a season's play-by-play events into an events CSV
    Events {
        /// Competition name as shown in the popular tournaments list
        #[arg(long)]
        competition: String,

        /// Season label, e.g. "2023/2024"
        #[arg(long)]
        season: String,

        /// Only matches involving this team
        #[arg(long)]
        team: Option<String>,

        /// Output CSV path
        #[arg(short, long, value_name = "FILE", default_value = "events.csv")]
        output: PathBuf,
    },

    /// Scrape a single match's events into a CSV
    Match {
        /// Match page URL
        #[arg(long)]
        url: String,

        /// Output CSV path
        #[arg(short, long, value_name = "FILE", default_value = "events.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = pitchscrape::init_logging();

    let cli = Cli::parse();

    info!("Starting pitchscrape");
    if let Some(dir) = pitchscrape::log_dir() {
        info!("Log files saved to: {}", dir.display());
    }

    let config = ScraperConfig::default()
        .headless(cli.headless)
        .chrome_path(cli.chrome.clone())
        .timeout(cli.timeout_secs)
        .delays(cli.min_delay_ms, cli.max_delay_ms)
        .window(cli.window_width, cli.window_height);

    let scraper = Scraper::new(config)
        .await
        .context("failed to launch browser")?;

    let result = run(&cli.command, &scraper).await;

    // Close the browser regardless of how the command went
    let _ = scraper.close().await;

    result
}

async fn run(command: &Command, scraper: &Scraper) -> Result<()> {
    match command {
        Command::Competitions => {
            let competitions = scraper
                .competition_urls()
                .await
                .context("failed to read popular tournaments")?;
            for (name, url) in &competitions {
                println!("{}\t{}", name, url);
            }
        }

        Command::Matches {
            competition,
            season,
            team,
            output,
        } => {
            let fixtures = scraper
                .fixtures(competition, season)
                .await
                .context("failed to harvest fixtures")?;
            let fixtures = match team {
                Some(team) => team_fixtures(team, &fixtures),
                None => fixtures,
            };
            export::write_matches_csv(output, &matches_table(&fixtures))
                .with_context(|| format!("failed to write {}", output.display()))?;
        }

        Command::Events {
            competition,
            season,
            team,
            output,
        } => {
            let rows = scraper
                .season_events(competition, season, team.as_deref())
                .await
                .context("failed to harvest season events")?;
            export::write_events_csv(output, &rows)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }

        Command::Match { url, output } => {
            let (match_id, centre) = scraper
                .match_centre(url)
                .await
                .context("failed to read match centre")?;
            export::write_events_csv(output, &events_table(match_id, &centre))
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
    }

    Ok(())
}
