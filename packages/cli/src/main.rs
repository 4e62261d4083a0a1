#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line runner for the Clayton meeting scraper.
//!
//! `crawl` walks the live site and writes one JSON object per meeting;
//! `parse` runs the event extractor on a saved detail page.

mod output;
mod progress;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use clayton_meetings_scraper::{HttpFetcher, Page};
use clayton_meetings_spider::crawl::{CrawlOptions, crawl};
use clayton_meetings_spider::registry::{DEFAULT_SPIDER, all_spiders, find_spider};
use clayton_meetings_spider::{Spider, agenda, event, pipeline};
use tokio::sync::mpsc;

use crate::output::{JsonLinesWriter, drain};
use crate::progress::{CrawlProgress, init_logger};

#[derive(Parser)]
#[command(name = "clayton_meetings", about = "Clayton public meeting scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the calendar and write every matching meeting as JSON Lines
    Crawl {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Maximum number of event pages to visit
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        spider: SpiderArgs,
    },
    /// Parse a saved event detail page
    Parse {
        /// HTML file of the detail page
        file: PathBuf,
        /// URL the page was served from
        #[arg(long)]
        url: String,
        /// Also fetch the commission listing and attach agenda links
        #[arg(long)]
        agenda: bool,
        #[command(flatten)]
        spider: SpiderArgs,
    },
    /// List the embedded spider definitions
    Spiders,
}

#[derive(clap::Args)]
struct SpiderArgs {
    /// Embedded spider to run
    #[arg(long, default_value = DEFAULT_SPIDER)]
    name: String,
    /// Load the spider definition from a TOML file instead
    #[arg(long)]
    config: Option<PathBuf>,
    /// Apply AM/PM markers when building timestamps
    #[arg(long)]
    honor_meridiem: bool,
}

impl SpiderArgs {
    fn load(&self) -> Result<Spider, Box<dyn std::error::Error>> {
        let spider = if let Some(path) = &self.config {
            Spider::from_file(path)?
        } else {
            let def = find_spider(&self.name)
                .ok_or_else(|| format!("Unknown spider: {}", self.name))?;
            Spider::new(def)?
        };
        Ok(if self.honor_meridiem {
            spider.with_honor_meridiem(true)
        } else {
            spider
        })
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write + Send>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

async fn run_crawl(
    spider: &Spider,
    output: Option<&Path>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let multi = init_logger();
    let fetcher = HttpFetcher::new()?;
    let mut options = CrawlOptions::new(now());
    options.limit = limit;

    let mut writer = JsonLinesWriter::new(open_output(output)?);
    let progress = CrawlProgress::new(&multi, &format!("{}: reading calendar", spider.name()));
    let (tx, rx) = mpsc::channel(16);

    let producer = async {
        let result = crawl(spider, &fetcher, &options, &tx, &progress).await;
        drop(tx);
        result
    };
    let consumer = drain(rx, &mut writer);

    let (crawled, drained) = tokio::join!(producer, consumer);
    drained?;
    let sent = crawled?;

    log::info!(
        "{}: wrote {} of {sent} meeting(s) to {}",
        spider.name(),
        writer.written(),
        output.map_or_else(|| "stdout".to_string(), |p| p.display().to_string())
    );
    writer.finish()?;
    Ok(())
}

async fn run_parse(
    spider: &Spider,
    file: &Path,
    url: &str,
    with_agenda: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let page = Page::from_file(file, url)?;

    let mut meeting = event::parse_event(spider, &page, None);
    if with_agenda {
        if let Some(start) = meeting.start {
            let fetcher = HttpFetcher::new()?;
            meeting.links = agenda::resolve(spider, &fetcher, start.date()).await;
        } else {
            log::warn!("{}: no start date, skipping agenda lookup", spider.name());
        }
    }
    let meeting = pipeline::process(spider.name(), meeting, now());

    let mut writer = JsonLinesWriter::new(io::stdout().lock());
    writer.write(&meeting)?;
    let _stdout = writer.finish()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            output,
            limit,
            spider,
        } => {
            let spider = spider.load()?;
            run_crawl(&spider, output.as_deref(), limit).await?;
        }
        Commands::Parse {
            file,
            url,
            agenda,
            spider,
        } => {
            let spider = spider.load()?;
            run_parse(&spider, &file, &url, agenda).await?;
        }
        Commands::Spiders => {
            println!("{:<16} {:<16} AGENCY", "NAME", "TIMEZONE");
            println!("{}", "-".repeat(72));
            for def in all_spiders() {
                println!("{:<16} {:<16} {}", def.name, def.timezone, def.agency);
            }
        }
    }

    Ok(())
}
