use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DEFAULT_MIN_VOTES, MatrixBuilder, UserId, parser};
use rand::seq::IndexedRandom;
use recommender::{
    ClusterRecommender, DEFAULT_CLUSTERS, DEFAULT_PROFILE_SIZE, DEFAULT_SEED, Recommender,
    RecommenderState, persistence,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Cluster-based movie recommendations from MovieLens ratings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the rating matrix, train the clustering model and save it
    Train {
        /// Directory holding movies.csv and ratings.csv
        #[arg(short, long, default_value = "data/raw")]
        data_dir: PathBuf,

        /// Number of user clusters
        #[arg(short = 'k', long, default_value_t = DEFAULT_CLUSTERS)]
        clusters: usize,

        /// RNG seed for reproducible clustering
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Keep only titles with more than this many ratings
        #[arg(long, default_value_t = DEFAULT_MIN_VOTES)]
        min_votes: usize,

        /// Titles kept per cluster profile
        #[arg(long, default_value_t = DEFAULT_PROFILE_SIZE)]
        profile_size: usize,

        /// Where to write the model snapshot
        #[arg(short, long, default_value = "model_v1.json")]
        output: PathBuf,
    },

    /// Get movie recommendations for a user
    Recommend {
        /// Model snapshot to load
        #[arg(short, long, default_value = "model_v1.json")]
        model: PathBuf,

        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        top_n: usize,
    },

    /// Show cluster sizes and each cluster's favourite titles
    Clusters {
        /// Model snapshot to load
        #[arg(short, long, default_value = "model_v1.json")]
        model: PathBuf,

        /// Titles shown per cluster
        #[arg(long, default_value = "5")]
        top: usize,
    },

    /// Print the first lines of the raw CSV files
    Preview {
        /// Directory holding movies.csv and ratings.csv
        #[arg(short, long, default_value = "data/raw")]
        data_dir: PathBuf,

        /// Data lines shown per file
        #[arg(long, default_value = "5")]
        lines: usize,
    },

    /// Run benchmark to test lookup performance
    Benchmark {
        /// Model snapshot to load
        #[arg(short, long, default_value = "model_v1.json")]
        model: PathBuf,

        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data_dir,
            clusters,
            seed,
            min_votes,
            profile_size,
            output,
        } => {
            let recommender = ClusterRecommender::new(clusters)
                .with_seed(seed)
                .with_profile_size(profile_size);
            handle_train(&data_dir, min_votes, &recommender, &output)?
        }
        Commands::Recommend {
            model,
            user_id,
            top_n,
        } => handle_recommend(&model, user_id, top_n)?,
        Commands::Clusters { model, top } => handle_clusters(&model, top)?,
        Commands::Preview { data_dir, lines } => handle_preview(&data_dir, lines)?,
        Commands::Benchmark {
            model,
            requests,
            concurrent,
        } => handle_benchmark(&model, requests, concurrent).await?,
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<RecommenderState> {
    let start = Instant::now();
    let state = persistence::load_from_path(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;
    println!(
        "{} Loaded model ({} clusters, {} users) in {:?}",
        "✓".green(),
        state.k(),
        state.user_count(),
        start.elapsed()
    );
    Ok(state)
}

/// Handle the 'train' command
fn handle_train(
    data_dir: &Path,
    min_votes: usize,
    recommender: &ClusterRecommender,
    output: &Path,
) -> Result<()> {
    println!("Loading ratings from {}...", data_dir.display());
    let start = Instant::now();
    let matrix = MatrixBuilder::new(data_dir)
        .with_min_votes(min_votes)
        .with_preview(3)
        .build()
        .context("Failed to build rating matrix")?;
    let (users, items) = matrix.shape();
    println!(
        "{} Built {} x {} rating matrix in {:?}",
        "✓".green(),
        users,
        items,
        start.elapsed()
    );

    let start = Instant::now();
    let state = recommender
        .train(&matrix)
        .with_context(|| format!("Failed to train {} clusters", recommender.n_clusters()))?;
    println!(
        "{} Trained {} clusters in {:?}",
        "✓".green(),
        state.k(),
        start.elapsed()
    );

    info!(
        "Trained {} with seed {}, cluster sizes {:?}",
        recommender.name(),
        state.seed(),
        state.cluster_sizes()
    );

    persistence::save_to_path(&state, output)
        .with_context(|| format!("Failed to save model to {}", output.display()))?;
    println!("{} Model saved to {}", "✓".green(), output.display());

    print_cluster_sizes(&state);
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(model: &Path, user_id: UserId, top_n: usize) -> Result<()> {
    let state = load_model(model)?;
    let recommendations = state.recommend(user_id, top_n);

    match state.cluster_of(user_id) {
        Some(cluster) => println!(
            "{}",
            format!("Recommendations for user {} (cluster {}):", user_id, cluster)
                .bold()
                .blue()
        ),
        None => {
            println!("{} User {} is not in the model", "!".yellow(), user_id);
            return Ok(());
        }
    }

    for (rank, title) in recommendations.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), title);
    }
    Ok(())
}

/// Handle the 'clusters' command
fn handle_clusters(model: &Path, top: usize) -> Result<()> {
    let state = load_model(model)?;
    print_cluster_sizes(&state);

    for (cluster, profile) in state.profiles() {
        println!("{}", format!("Cluster {}:", cluster).bold().blue());
        for entry in profile.entries().iter().take(top) {
            println!("  - {} (mean {:.2})", entry.item, entry.mean_rating);
        }
    }
    Ok(())
}

/// Handle the 'preview' command
fn handle_preview(data_dir: &Path, lines: usize) -> Result<()> {
    for file in [parser::MOVIES_FILE, parser::RATINGS_FILE] {
        let path = data_dir.join(file);
        println!("{}", format!("{}:", path.display()).bold().blue());
        let preview = parser::preview_lines(&path, lines)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        for line in preview {
            println!("  {}", line?);
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(model: &Path, requests: usize, concurrent: usize) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }
    let state = Arc::new(load_model(model)?);
    let user_ids = sample_users(&state, requests);

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    info!(
        "Benchmarking {} lookups over {} users, {} in flight",
        requests,
        state.user_count(),
        concurrent.max(1)
    );
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for user in user_ids {
        let state = state.clone();
        let permit = permits.clone().acquire_owned().await?;
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            let recommendations = state.recommend(user, 20);
            drop(permit);
            (start.elapsed(), recommendations.is_empty())
        }));
    }

    let mut timings = Vec::with_capacity(requests);
    let mut empty = 0usize;
    for handle in handles {
        let (elapsed, was_empty) = handle.await?;
        timings.push(elapsed);
        if was_empty {
            empty += 1;
        }
    }
    let total_time = wall_clock.elapsed();
    info!("Benchmark finished in {:?}", total_time);

    timings.sort();
    let busy: Duration = timings.iter().sum();
    let avg_latency = busy / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);
    println!("Empty responses: {}", empty);

    Ok(())
}

/// Random user ids drawn from the model's users
fn sample_users(state: &RecommenderState, requests: usize) -> Vec<UserId> {
    let known: Vec<UserId> = state.assignment().iter().map(|(user, _)| user).collect();
    let mut rng = rand::rng();
    (0..requests)
        .map(|_| known.choose(&mut rng).copied().unwrap_or_default())
        .collect()
}

fn print_cluster_sizes(state: &RecommenderState) {
    println!("{}", "Cluster sizes:".bold().blue());
    for (cluster, size) in state.cluster_sizes().into_iter().enumerate() {
        println!("  {} {}: {} users", "•".cyan(), cluster, size);
    }
}
