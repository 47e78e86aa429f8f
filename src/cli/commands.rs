// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `train`, `classify` and `serve`.
//
// clap's derive macros generate help text, error messages for
// missing args, and type conversion for every flag below.

use clap::{Args, Subcommand, ValueEnum};
use std::net::IpAddr;

use crate::application::analyze_use_case::THRESHOLD_DEFAULT;
use crate::application::train_use_case::TrainConfig;
use crate::data::preprocessor::MAXLEN_DEFAULT;
use crate::ml::backend::ComputeBackend;
use crate::web::ServerConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the sentiment RNN on an aclImdb-style review folder
    Train(TrainArgs),

    /// Classify one review and explain the prediction
    Classify(ClassifyArgs),

    /// Serve the interactive web UI
    Serve(ServeArgs),
}

/// Backend choice as spelled on the command line.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BackendArg {
    /// GPU through WebGPU
    Wgpu,
    /// CPU, no graphics driver needed
    Cpu,
}

impl From<BackendArg> for ComputeBackend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Wgpu => ComputeBackend::Wgpu,
            BackendArg::Cpu  => ComputeBackend::NdArray,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Split directory containing pos/ and neg/ folders of .txt reviews
    #[arg(long, default_value = "data/aclImdb/train")]
    pub data_dir: String,

    /// Directory to save weights, vocabulary, config and metrics
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Existing word → rank JSON (e.g. imdb_word_index.json).
    /// Built from the corpus when omitted.
    #[arg(long)]
    pub word_index: Option<String>,

    /// Keep only the N most frequent words of the vocabulary
    #[arg(long)]
    pub vocab_limit: Option<usize>,

    /// Rows in the embedding table; rarer words become out-of-vocabulary
    #[arg(long, default_value_t = 10_000)]
    pub vocab_size: usize,

    /// Sequence length reviews are padded / truncated to
    #[arg(long, default_value_t = MAXLEN_DEFAULT)]
    pub maxlen: usize,

    #[arg(long, default_value_t = 128)]
    pub embed_dim: usize,

    /// Width of the recurrent hidden state
    #[arg(long, default_value_t = 128)]
    pub hidden_dim: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Share of reviews used for training, the rest validates
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seed for the split and the batch shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = BackendArg::Wgpu)]
    pub backend: BackendArg,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            artifact_dir:   a.artifact_dir,
            word_index:     a.word_index,
            vocab_limit:    a.vocab_limit,
            vocab_size:     a.vocab_size,
            maxlen:         a.maxlen,
            embed_dim:      a.embed_dim,
            hidden_dim:     a.hidden_dim,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            train_fraction: a.train_fraction,
            seed:           a.seed,
            backend:        a.backend.into(),
        }
    }
}

/// Where the trained model and its vocabulary come from.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Directory written by `train`
    #[arg(long, default_value = "artifacts")]
    pub artifact_dir: String,

    /// Word → rank JSON to use instead of the stored vocabulary
    #[arg(long)]
    pub word_index: Option<String>,

    #[arg(long, value_enum, default_value_t = BackendArg::Wgpu)]
    pub backend: BackendArg,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Review text to classify
    #[arg(long, conflicts_with = "example", required_unless_present = "example")]
    pub text: Option<String>,

    /// Use one of the built-in demo reviews (1-4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub example: Option<u8>,

    /// Max sequence length (100-1000)
    #[arg(long, default_value_t = MAXLEN_DEFAULT)]
    pub maxlen: usize,

    /// Decision threshold (0-1); scores above it are Positive
    #[arg(long, default_value_t = THRESHOLD_DEFAULT)]
    pub threshold: f64,

    /// Write the JSON report to this file
    #[arg(long)]
    pub report: Option<String>,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 8501)]
    pub port: u16,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl From<ServeArgs> for ServerConfig {
    fn from(a: ServeArgs) -> Self {
        ServerConfig {
            host:         a.host,
            port:         a.port,
            artifact_dir: a.model.artifact_dir,
            word_index:   a.model.word_index,
            backend:      a.model.backend.into(),
        }
    }
}
