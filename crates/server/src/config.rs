use serde::Deserialize;
use std::path::PathBuf;

/// Environment variables are read with this prefix, e.g. `REEL_RECS_PORT`
pub const ENV_PREFIX: &str = "REEL_RECS_";

/// Server configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where the trained model snapshot lives
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Directory holding movies.csv and ratings.csv
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Popularity threshold used when training on startup
    #[serde(default = "default_min_votes")]
    pub min_votes: usize,

    /// Cluster count used when training on startup
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,

    /// K-Means seed used when training on startup
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Train (and save) a model in the background when no snapshot exists
    #[serde(default)]
    pub train_on_startup: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model_v1.json")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_min_votes() -> usize {
    data_loader::DEFAULT_MIN_VOTES
}

fn default_n_clusters() -> usize {
    recommender::DEFAULT_CLUSTERS
}

fn default_seed() -> u64 {
    recommender::DEFAULT_SEED
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model_path: default_model_path(),
            data_dir: default_data_dir(),
            min_votes: default_min_votes(),
            n_clusters: default_n_clusters(),
            seed: default_seed(),
            train_on_startup: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (and a `.env` file if present)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env::<ServerConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
