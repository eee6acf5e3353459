//! Command-line driver: detect the sentiment of text, or write about a topic
//! in a detected (or chosen) tone.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use sentiment_writer::config::LengthPreset;
use sentiment_writer::sentiment::{SentimentAnalysisPipelineBuilder, SentimentLabel, SentimentResult};
use sentiment_writer::writer::{word_count, LocalSentimentWriter, WriteRequest};
use sentiment_writer::{DeviceRequest, WriterConfig};

#[derive(Parser)]
#[command(name = "sentiment-writer")]
#[command(about = "Detect sentiment and generate text in a matching tone")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "SENTIMENT_WRITER_CONFIG")]
    config: Option<PathBuf>,

    /// Run on this CUDA device instead of the configured one
    #[arg(long, global = true)]
    cuda: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the sentiment of some text
    Classify {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Generate text about a prompt
    Generate {
        #[arg(required = true)]
        prompt: Vec<String>,

        /// Write in this tone instead of the detected one
        #[arg(long)]
        sentiment: Option<SentimentLabel>,

        /// Named length: short, medium or long
        #[arg(long, conflicts_with = "max_length")]
        length: Option<LengthPreset>,

        /// Exact token budget, clamped to the configured bounds
        #[arg(long, allow_negative_numbers = true)]
        max_length: Option<i64>,

        /// Number of variations to generate
        #[arg(long)]
        variations: Option<usize>,

        /// Also save the generated text to this file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WriterConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => WriterConfig::default(),
    };
    if let Some(index) = cli.cuda {
        config.models.device = DeviceRequest::Cuda(index);
    }

    match cli.command {
        Command::Classify { text } => {
            let classifier = SentimentAnalysisPipelineBuilder::modernbert(config.models.sentiment)
                .config(&config)
                .device(config.models.device)
                .build()
                .context("failed to load sentiment model")?;

            print_sentiment(&classifier.classify(&text.join(" ")));
        }
        Command::Generate {
            prompt,
            sentiment,
            length,
            max_length,
            variations,
            output,
        } => {
            let prompt = prompt.join(" ");
            let length = max_length.or_else(|| length.map(|p| config.lengths.preset(p) as i64));

            let writer = LocalSentimentWriter::load(&config).context("failed to load models")?;

            let texts = match variations {
                Some(n) if n > 1 => {
                    let detected = writer.classify_with_override(&prompt, sentiment);
                    print_sentiment(&detected);
                    let texts = writer.generate_multiple(&prompt, detected.label, length, Some(n));
                    for (i, text) in texts.iter().enumerate() {
                        println!("\n--- Variation {} ({} words) ---\n{text}", i + 1, word_count(text));
                    }
                    texts
                }
                _ => {
                    let mut request = WriteRequest::new(prompt.as_str());
                    request.sentiment = sentiment;
                    request.length = length;

                    let written = writer.write(&request);
                    print_sentiment(&written.sentiment);
                    println!("\n{}\n\n({} words)", written.text, written.word_count);
                    vec![written.text]
                }
            };

            if let Some(path) = output {
                std::fs::write(&path, texts.join("\n\n"))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), "saved generated text");
            }
        }
    }

    Ok(())
}

fn print_sentiment(result: &SentimentResult) {
    println!(
        "{} {} (confidence {:.2}, {})",
        result.emoji, result.label, result.confidence, result.interpretation
    );
    if let Some(error) = result.error() {
        println!("   note: {error}");
    }
}
