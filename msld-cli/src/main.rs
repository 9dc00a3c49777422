use clap::Parser;
use msld::io::{load_split, save_binary_mask};
use msld::{
    Border, ConfusionMatrix, DatasetEvaluation, Msld, MsldConfig, Sample, SampleEvaluation,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "MSLD vessel segmentation CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BorderConfig {
    Reflect,
    Replicate,
}

impl From<BorderConfig> for Border {
    fn from(value: BorderConfig) -> Self {
        match value {
            BorderConfig::Reflect => Border::Reflect,
            BorderConfig::Replicate => Border::Replicate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectorConfigJson {
    window_size: usize,
    scales: Vec<usize>,
    orientations: usize,
    border: BorderConfig,
    parallel: bool,
}

impl Default for DetectorConfigJson {
    fn default() -> Self {
        let cfg = MsldConfig::default();
        Self {
            window_size: cfg.window_size,
            scales: cfg.scales,
            orientations: cfg.orientations,
            border: BorderConfig::Reflect,
            parallel: cfg.parallel,
        }
    }
}

impl From<DetectorConfigJson> for MsldConfig {
    fn from(value: DetectorConfigJson) -> Self {
        MsldConfig {
            window_size: value.window_size,
            scales: value.scales,
            orientations: value.orientations,
            border: value.border.into(),
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    dataset_root: String,
    train_split: String,
    test_split: String,
    /// Skips learning and uses this threshold when set.
    threshold: Option<f32>,
    output_path: Option<String>,
    masks_dir: Option<String>,
    detector: DetectorConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_root: String::new(),
            train_split: "training".to_string(),
            test_split: "test".to_string(),
            threshold: None,
            output_path: None,
            masks_dir: None,
            detector: DetectorConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ConfusionRecord {
    true_negatives: u64,
    false_positives: u64,
    false_negatives: u64,
    true_positives: u64,
    normalized: [[f64; 2]; 2],
}

impl ConfusionRecord {
    fn new(counts: ConfusionMatrix, normalized: [[f64; 2]; 2]) -> Self {
        Self {
            true_negatives: counts.true_negatives,
            false_positives: counts.false_positives,
            false_negatives: counts.false_negatives,
            true_positives: counts.true_positives,
            normalized,
        }
    }
}

#[derive(Debug, Serialize)]
struct SampleRecord {
    name: Option<String>,
    dice: f64,
}

#[derive(Debug, Serialize)]
struct Evaluation {
    split: String,
    samples: usize,
    auc: f64,
    accuracy: f64,
    dice: f64,
    confusion: ConfusionRecord,
    per_sample: Vec<SampleRecord>,
}

#[derive(Debug, Serialize)]
struct Output {
    threshold: f32,
    train_accuracy: Option<f64>,
    test: Evaluation,
}

fn summarize(split: &str, dataset: &[Sample], result: &DatasetEvaluation) -> Evaluation {
    let per_sample = dataset
        .iter()
        .zip(&result.samples)
        .map(|(sample, evaluation)| SampleRecord {
            name: sample.name().map(str::to_string),
            dice: evaluation.dice(),
        })
        .collect();
    Evaluation {
        split: split.to_string(),
        samples: dataset.len(),
        auc: result.roc.auc(),
        accuracy: result.metrics.accuracy,
        dice: result.dice,
        confusion: ConfusionRecord::new(result.metrics.counts, result.metrics.normalized),
        per_sample,
    }
}

fn write_masks(
    dataset: &[Sample],
    results: &[SampleEvaluation],
    dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    for (idx, (sample, evaluation)) in dataset.iter().zip(results).enumerate() {
        let stem = sample
            .name()
            .and_then(|name| Path::new(name).file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("sample_{idx:03}"));
        save_binary_mask(&evaluation.segmentation, dir.join(format!("{stem}.png")))?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("msld=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.dataset_root.is_empty() {
        return Err("dataset_root must be set in the config".into());
    }

    let mut msld = Msld::new(config.detector.into())?;

    let train_accuracy = match config.threshold {
        Some(threshold) => {
            msld.set_threshold(threshold);
            None
        }
        None => {
            let train = load_split(&config.dataset_root, &config.train_split)?;
            tracing::info!(split = %config.train_split, samples = train.len(), "loaded split");
            let (_, accuracy) = msld.learn_threshold(&train)?;
            Some(accuracy)
        }
    };

    let test = load_split(&config.dataset_root, &config.test_split)?;
    tracing::info!(split = %config.test_split, samples = test.len(), "loaded split");
    let result = msld.evaluate(&test)?;

    if let Some(dir) = &config.masks_dir {
        write_masks(&test, &result.samples, Path::new(dir))?;
    }

    let output = Output {
        threshold: msld.threshold(),
        train_accuracy,
        test: summarize(&config.test_split, &test, &result),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
