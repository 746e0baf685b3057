use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lectio_core::{
    validate, Canon, Direction, InsightDataset, InsightIndex, Lens, LensPartition, Location,
    NavigationResolver, ParsedReference, ReferenceParser, Testament,
};

mod config;
mod mcp;

use config::Config;

#[derive(Parser)]
#[command(name = "lectio")]
#[command(version, about = "Resolve Bible references and browse verse-level study insights")]
struct Cli {
    /// Insight dataset (.json, or .sqlite/.db for a commentary_insights table)
    #[arg(long, global = true, env = "LECTIO_DATASET")]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a reference and show what it resolves to
    Parse {
        /// Reference text (e.g., John 3:16-18)
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
    },
    /// List the books of the canon
    Books {
        /// Only list one testament (OT or NT)
        #[arg(short, long)]
        testament: Option<String>,
    },
    /// Show the insights for a verse, grouped by lens
    Insights {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
        /// Only show one lens (theology, question, connection, greek)
        #[arg(short, long)]
        lens: Option<String>,
    },
    /// Show how many insights cover each verse of a chapter
    Counts {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
    },
    /// Find the nearest verse in the chapter that has insights
    Nearest {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
        /// Search backwards instead of forwards
        #[arg(short, long)]
        backward: bool,
    },
    /// Resolve a reference to a navigation target
    Resolve {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
    },
    /// Split a verse's connection insights by the testament they point into
    Split {
        #[arg(required = true, num_args = 1..)]
        reference: Vec<String>,
    },
    /// Check the dataset for broken spans, citations and Strong's numbers
    Check,
    /// Serve the tools as JSON-RPC over stdio
    Serve,
    /// Remember a dataset path in the config file
    SetDataset {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectio=info,lectio_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Could not read config, using defaults: {}", e);
        Config::new()
    });
    let canon = Canon::standard();
    let dataset_flag = cli.dataset.as_deref();

    match cli.command {
        Commands::Parse { reference } => parse_reference(&canon, &reference.join(" "))?,
        Commands::Books { testament } => list_books(&canon, testament.as_deref())?,
        Commands::Insights { reference, lens } => {
            let index = load_index(&canon, &config.dataset_path(dataset_flag)?).await?;
            show_insights(&canon, &index, &reference.join(" "), lens.as_deref())?
        }
        Commands::Counts { reference } => {
            let index = load_index(&canon, &config.dataset_path(dataset_flag)?).await?;
            show_counts(&canon, &index, &reference.join(" "))?
        }
        Commands::Nearest { reference, backward } => {
            let direction = if backward {
                Direction::Backward
            } else {
                config.direction()
            };
            let index = load_index(&canon, &config.dataset_path(dataset_flag)?).await?;
            show_nearest(&canon, &index, &reference.join(" "), direction)?
        }
        Commands::Resolve { reference } => resolve_reference(&canon, &reference.join(" "))?,
        Commands::Split { reference } => {
            let index = load_index(&canon, &config.dataset_path(dataset_flag)?).await?;
            show_split(&canon, &index, &reference.join(" "))?
        }
        Commands::Check => check_dataset(&canon, &config.dataset_path(dataset_flag)?).await?,
        Commands::Serve => {
            let index = load_index(&canon, &config.dataset_path(dataset_flag)?).await?;
            mcp::run_mcp_server(&canon, &index);
        }
        Commands::SetDataset { path } => {
            Config::save_dataset_path(&path)?;
            println!("Dataset set to {}", path.display());
        }
    }

    Ok(())
}

async fn load_dataset(path: &Path) -> Result<InsightDataset> {
    let owned = path.to_path_buf();
    let dataset = tokio::task::spawn_blocking(move || InsightDataset::load(&owned))
        .await?
        .with_context(|| format!("Failed to load insight dataset {}", path.display()))?;
    Ok(dataset)
}

async fn load_index(canon: &Canon, path: &Path) -> Result<InsightIndex> {
    let mut dataset = load_dataset(path).await?;
    let dropped = dataset.retain_valid(canon);
    if dropped > 0 {
        tracing::warn!("Dropped {} insights that fall outside the canon", dropped);
    }
    Ok(dataset.into_index())
}

fn parse<'c>(canon: &'c Canon, reference: &str) -> Result<ParsedReference<'c>> {
    ReferenceParser::new(canon)
        .parse(reference)
        .map_err(|e| anyhow!("Could not parse '{}': {}", reference, e))
}

fn parse_verse<'c>(canon: &'c Canon, reference: &str) -> Result<(ParsedReference<'c>, Location)> {
    let parsed = parse(canon, reference)?;
    let location = parsed
        .location()
        .ok_or_else(|| anyhow!("'{}' names a whole chapter; give a verse", reference))?;
    Ok((parsed, location))
}

fn parse_reference(canon: &Canon, reference: &str) -> Result<()> {
    let parsed = parse(canon, reference)?;
    println!("{}", parsed);
    println!("  book:      {} ({}, id {})", parsed.book.name, parsed.book.abbreviation, parsed.book_id());
    println!("  testament: {}", Testament::of(parsed.book_id()).display_name());
    println!("  chapter:   {}", parsed.chapter);
    if let (Some(start), Some(end)) = (parsed.verse_start, parsed.verse_end) {
        println!("  verses:    {}-{}", start, end);
    }
    Ok(())
}

fn list_books(canon: &Canon, filter: Option<&str>) -> Result<()> {
    let testaments = match filter {
        Some(f) => vec![Testament::from_str(f)
            .ok_or_else(|| anyhow!("Unknown testament '{}'. Use OT or NT", f))?],
        None => vec![Testament::Old, Testament::New],
    };

    for testament in testaments {
        println!("\n{}", testament.display_name());
        println!("{}", "=".repeat(40));
        for book in canon.books_in(testament) {
            println!(
                "  {:>2}. {:<18} {:<6} {} chapters",
                book.id, book.name, book.abbreviation, book.chapter_count
            );
        }
    }
    Ok(())
}

fn show_insights(canon: &Canon, index: &InsightIndex, reference: &str, lens: Option<&str>) -> Result<()> {
    let (parsed, location) = parse_verse(canon, reference)?;
    let partition = LensPartition::classify(index.insights_for(location));

    if partition.is_empty() {
        println!("No insights for {}", parsed);
        return Ok(());
    }

    let lenses = match lens {
        Some(name) => vec![Lens::from_str(name).ok_or_else(|| anyhow!("Unknown lens '{}'", name))?],
        None => partition.available_lenses(),
    };

    println!("{}", parsed);
    for lens in lenses {
        let insights = partition.get(lens);
        if insights.is_empty() {
            println!("\n{}: nothing here", lens.display_name());
            continue;
        }
        println!("\n{} ({})", lens.display_name(), insights.len());
        for insight in insights {
            println!("  • {}", insight.title);
            println!("    {}", insight.content);
            for source in &insight.sources {
                println!("    [{}] {}", source.kind.as_str(), source.reference);
            }
        }
    }
    Ok(())
}

fn show_counts(canon: &Canon, index: &InsightIndex, reference: &str) -> Result<()> {
    let parsed = parse(canon, reference)?;
    let chapter = parsed.chapter_ref();
    let counts = index.insight_counts(chapter);

    println!("{}", chapter.display(canon));
    if counts.is_empty() {
        println!("  no insights in this chapter");
    }
    for (verse, count) in counts {
        println!("  {:>3}: {}", verse, count);
    }
    Ok(())
}

fn show_nearest(canon: &Canon, index: &InsightIndex, reference: &str, direction: Direction) -> Result<()> {
    let (parsed, location) = parse_verse(canon, reference)?;
    let chapter = location.chapter_ref();
    let verses = chapter.verses(canon);

    match index.nearest_verse_with_insights(location, direction, &verses) {
        Some(verse) => println!("{}:{}", chapter.display(canon), verse),
        None => {
            let side = match direction {
                Direction::Forward => "after",
                Direction::Backward => "before",
            };
            println!("No verse {} {} has insights", side, parsed)
        }
    }
    Ok(())
}

fn resolve_reference(canon: &Canon, reference: &str) -> Result<()> {
    let resolver = NavigationResolver::new(canon);
    match resolver.resolve(reference) {
        Some(target) => println!("{}", serde_json::to_string_pretty(&target)?),
        None => println!("'{}' does not resolve; navigation is a no-op", reference),
    }
    Ok(())
}

fn show_split(canon: &Canon, index: &InsightIndex, reference: &str) -> Result<()> {
    let (parsed, location) = parse_verse(canon, reference)?;
    let parser = ReferenceParser::new(canon);
    let partition = LensPartition::classify(index.insights_for(location));
    let split = partition.connection_split(&parser);

    println!("{}: {} connections", parsed, partition.connection_count());
    for testament in [Testament::Old, Testament::New] {
        let insights = split.get(testament);
        println!("\n{} ({})", testament.display_name(), insights.len());
        for insight in insights {
            let target = insight
                .first_cross_reference()
                .map(|s| s.reference.as_str())
                .unwrap_or_default();
            println!("  • {} -> {}", insight.title, target);
        }
    }
    if !split.unresolved.is_empty() {
        println!("\nUnresolved ({})", split.unresolved.len());
        for insight in &split.unresolved {
            println!("  • {}", insight.title);
        }
    }
    Ok(())
}

async fn check_dataset(canon: &Canon, path: &Path) -> Result<()> {
    let dataset = load_dataset(path).await?;
    let report = validate(canon, dataset.insights());

    for issue in &report.errors {
        println!("error   [{}] {}", issue.insight_id, issue.message);
    }
    for issue in &report.warnings {
        println!("warning [{}] {}", issue.insight_id, issue.message);
    }
    println!(
        "\n{} insights checked, {} valid, {} errors, {} warnings",
        report.insights_checked,
        report.insights_valid,
        report.errors.len(),
        report.warnings.len()
    );

    if !report.is_ok() {
        bail!("{} has {} errors", path.display(), report.errors.len());
    }
    Ok(())
}
