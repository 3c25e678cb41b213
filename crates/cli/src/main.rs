use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{DescriptorField, UserId};
use engine::{EngineConfig, HybridRecommendation, Recommendation, RecommendationEngine};
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Content-based movie recommendations with optional rating re-ranking", long_about = None)]
struct Cli {
    /// Catalog file (`movies.dat` or a CSV with id/title/descriptor columns)
    #[arg(short, long, default_value = "data/ml-1m/movies.dat")]
    catalog: PathBuf,

    /// Ratings file; enables hybrid ranking and evaluation
    #[arg(short, long)]
    ratings: Option<PathBuf>,

    /// Catalog column used as the item descriptor (CSV only)
    #[arg(long, value_enum)]
    descriptor: Option<Descriptor>,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Descriptor {
    Genres,
    Overview,
}

impl From<Descriptor> for DescriptorField {
    fn from(value: Descriptor) -> Self {
        match value {
            Descriptor::Genres => DescriptorField::Genres,
            Descriptor::Overview => DescriptorField::Overview,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Movies most similar to a title
    Recommend {
        /// Exact catalog title, e.g. "Toy Story (1995)"
        #[arg(long)]
        title: String,

        /// Number of recommendations (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Similar movies re-ranked by a user's predicted rating
    Hybrid {
        #[arg(long)]
        title: String,

        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Print the rating model's training report
    Evaluate {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(descriptor) = cli.descriptor {
        config = config.with_descriptor(descriptor.into());
    }

    // Build the engine (training may take a moment)
    println!("Loading catalog from {}...", cli.catalog.display());
    let start = Instant::now();
    let catalog_path = cli.catalog.clone();
    let ratings_path = cli.ratings.clone();
    let engine = tokio::task::spawn_blocking(move || {
        RecommendationEngine::load_from_files(&catalog_path, ratings_path.as_deref(), config)
    })
    .await?
    .context("Failed to build recommendation engine")?;
    println!(
        "{} Built engine over {} movies in {:?}",
        "✓".green(),
        engine.catalog().len(),
        start.elapsed()
    );

    let default_limit = engine.config().default_limit;
    match cli.command {
        Commands::Recommend { title, limit } => {
            handle_recommend(&engine, &title, limit.unwrap_or(default_limit))?
        }
        Commands::Hybrid {
            title,
            user_id,
            limit,
        } => handle_hybrid(&engine, &title, user_id, limit.unwrap_or(default_limit))?,
        Commands::Search { title } => handle_search(&engine, &title),
        Commands::Evaluate { json } => handle_evaluate(&engine, json)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(engine, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(engine: &RecommendationEngine, title: &str, limit: usize) -> Result<()> {
    let recommendations = match engine.recommend(title, limit) {
        Ok(recs) => recs,
        Err(e) if e.is_not_found() => {
            print_not_found(engine, title);
            return Ok(());
        }
        Err(e) => return Err(e).context("Recommendation failed"),
    };

    print_recommendations(title, &recommendations);
    Ok(())
}

/// Handle the 'hybrid' command
fn handle_hybrid(
    engine: &RecommendationEngine,
    title: &str,
    user_id: UserId,
    limit: usize,
) -> Result<()> {
    if !engine.is_hybrid() {
        bail!("Hybrid ranking needs a ratings file (pass --ratings)");
    }

    let recommendations = match engine.hybrid_recommend(title, user_id, limit) {
        Ok(recs) => recs,
        Err(e) if e.is_not_found() => {
            print_not_found(engine, title);
            return Ok(());
        }
        Err(e) => return Err(e).context("Hybrid recommendation failed"),
    };

    print_hybrid(title, user_id, &recommendations);
    Ok(())
}

/// Titles matching `query`: exact matches first, then substrings, in catalog order
fn search_titles<'a>(engine: &'a RecommendationEngine, query: &str) -> Vec<(u32, &'a str, &'a str)> {
    let query = query.to_lowercase();
    let mut matches: Vec<(usize, u32, &str, &str)> = engine
        .catalog()
        .iter()
        .filter_map(|item| {
            let lower = item.title.to_lowercase();
            let rank = if lower == query {
                0
            } else if lower.contains(&query) {
                1
            } else {
                return None;
            };
            Some((rank, item.id, item.title.as_str(), item.descriptor.as_str()))
        })
        .collect();

    matches.sort_by_key(|m| m.0);
    matches
        .into_iter()
        .map(|(_, id, title, descriptor)| (id, title, descriptor))
        .collect()
}

/// Handle the 'search' command
fn handle_search(engine: &RecommendationEngine, title: &str) {
    let matches = search_titles(engine, title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
        return;
    }
    for (id, movie_title, descriptor) in matches.iter().take(20) {
        println!("{}: {} [{}]", id, movie_title, descriptor);
    }
    if matches.len() > 20 {
        println!("  ... and {} more", matches.len() - 20);
    }
}

/// Handle the 'evaluate' command
fn handle_evaluate(engine: &RecommendationEngine, json: bool) -> Result<()> {
    let Some(report) = engine.training_report() else {
        bail!("No rating model was trained (pass --ratings)");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{}", "Rating model training report:".bold().blue());
    println!("{}Users: {}", "• ".green(), report.users);
    println!("{}Items: {}", "• ".green(), report.items);
    println!("{}Epochs: {}", "• ".green(), report.epochs);
    println!(
        "{}Train / validation ratings: {} / {}",
        "• ".cyan(),
        report.train_size,
        report.validation_size
    );
    println!("{}Train RMSE: {:.4}", "• ".cyan(), report.train_rmse);
    match report.validation_rmse {
        Some(rmse) => println!("{}Validation RMSE: {:.4}", "• ".cyan(), rmse),
        None => println!("{}Validation RMSE: n/a (no held-out ratings)", "• ".cyan()),
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: RecommendationEngine,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    // Random query titles; hybrid when a model is available
    let titles: Vec<String> = {
        let mut rng = rand::rng();
        let catalog = engine.catalog();
        (0..requests)
            .filter_map(|_| catalog.get(rng.random_range(0..catalog.len())))
            .map(|item| item.title.clone())
            .collect()
    };
    let hybrid = engine.is_hybrid();
    let limit = engine.config().default_limit;
    info!("Running {} queries (hybrid: {})", titles.len(), hybrid);

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall = Instant::now();
    let mut handles = vec![];
    for (i, title) in titles.into_iter().enumerate() {
        let engine = engine.clone();
        let permit = permits.clone().acquire_owned().await?;
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let start = Instant::now();
            if hybrid {
                engine.hybrid_recommend(&title, (i % 6040 + 1) as UserId, limit)?;
            } else {
                engine.recommend(&title, limit)?;
            }
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall = wall.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f32 / wall.as_secs_f32();

    println!(
        "{}",
        format!(
            "Benchmark results ({} {} queries, {} concurrent):",
            timings.len(),
            if hybrid { "hybrid" } else { "content" },
            concurrent.max(1)
        )
        .bold()
        .blue()
    );
    println!("Total time: {:?}", wall);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

fn print_not_found(engine: &RecommendationEngine, title: &str) {
    println!("{} '{}' is not in the catalog", "✗".red(), title);
    let suggestions = search_titles(engine, title);
    if !suggestions.is_empty() {
        println!("Did you mean:");
        for (_, suggestion, _) in suggestions.iter().take(5) {
            println!("  - {}", suggestion);
        }
    }
}

fn print_recommendations(title: &str, recommendations: &[Recommendation]) {
    println!("{}", format!("Movies similar to '{}':", title).bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Similarity: {:.3}",
            (rank + 1).to_string().green(),
            rec.title,
            rec.score
        );
    }
}

fn print_hybrid(title: &str, user_id: UserId, recommendations: &[HybridRecommendation]) {
    println!(
        "{}",
        format!("Movies similar to '{}' for user {}:", title, user_id)
            .bold()
            .blue()
    );
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - Predicted: {:.2} (similarity {:.3}, content rank {})",
            (rank + 1).to_string().green(),
            rec.title,
            rec.predicted_rating,
            rec.similarity,
            rec.content_rank + 1
        );
    }
}
