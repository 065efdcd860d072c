//! CLI interface for estonian-tutor

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{self, Config, GeneratorConfig};
use crate::exercises::{Category, ExerciseSet};
use crate::generator::{Generator, OfflineGenerator, OpenRouterGenerator};
use crate::pipeline::TutorPipeline;
use crate::proficiency::{
    Direction, InMemoryLearnerStore, PerformanceSignal, ProficiencyTier, Recommendation,
};

/// Learner id used for one-shot CLI evaluations
const CLI_LEARNER: &str = "cli";

#[derive(Parser)]
#[command(name = "estonian-tutor")]
#[command(about = "Adaptive Estonian exercises with proficiency tracking", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an exercise set and print it as JSON
    Exercises {
        #[arg(short, long)]
        tier: ProficiencyTier,
        #[arg(short, long)]
        category: Category,
        /// Skip the generator and serve static content
        #[arg(long)]
        offline: bool,
    },
    /// Print the generation request for a tier and category
    Plan {
        #[arg(short, long)]
        tier: ProficiencyTier,
        #[arg(short, long)]
        category: Category,
    },
    /// Sanitize and validate a raw generator reply
    Sanitize {
        #[arg(short, long)]
        tier: ProficiencyTier,
        #[arg(short, long)]
        category: Category,
        /// File with the raw reply, or - for stdin
        input: String,
    },
    /// Evaluate one assessment and print the tier change
    Assess {
        /// Learner's current tier
        #[arg(short, long)]
        tier: ProficiencyTier,
        /// 1-5
        #[arg(long)]
        speed: u8,
        /// 1-5
        #[arg(long)]
        accuracy: u8,
        /// 1-5
        #[arg(long)]
        complexity: u8,
        /// Session percentage, 0-100
        #[arg(long)]
        session_score: Option<f64>,
        /// maintain, increase, or decrease
        #[arg(short, long)]
        recommendation: Recommendation,
    },
    /// Move a tier one step regardless of score
    Adjust {
        #[arg(short, long)]
        tier: ProficiencyTier,
        /// increase or decrease
        direction: Direction,
    },
    /// Grade an answer against one item of a set
    Grade {
        #[arg(short, long)]
        tier: ProficiencyTier,
        #[arg(short, long)]
        category: Category,
        /// Exercise set JSON (as printed by `exercises`); static content if omitted
        #[arg(long)]
        set: Option<PathBuf>,
        /// 1-based item number
        #[arg(short, long)]
        item: usize,
        #[arg(short, long)]
        answer: String,
    },
    /// Show or reset configuration
    Config {
        #[arg(long)]
        show: bool,
        /// Overwrite the config file with defaults
        #[arg(long)]
        reset: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::config_path()?,
    };

    match cli.command {
        Commands::Exercises { tier, category, offline } => {
            let config = Config::load_from(&config_path)?;
            let generator = exercise_generator(&config.generator, offline);
            let pipeline = offline_store_pipeline(&config, generator);
            let set = pipeline.request_exercises(tier, category).await;
            print_json(&set)?;
        }
        Commands::Plan { tier, category } => {
            let config = Config::load_from(&config_path)?;
            let pipeline = offline_store_pipeline(&config, Arc::new(OfflineGenerator));
            print_json(&pipeline.planner().plan(tier, category))?;
        }
        Commands::Sanitize { tier, category, input } => {
            let config = Config::load_from(&config_path)?;
            let raw = read_input(&input)?;
            let pipeline = offline_store_pipeline(&config, Arc::new(OfflineGenerator));
            let request = pipeline.planner().plan(tier, category);

            match pipeline.process_output(&raw, &request) {
                Ok(set) => {
                    println!("Outcome: {:?} ({} items)", set.provenance, set.len());
                    print!("{}", pipeline.validator().analyze(&set));
                    print_json(&set)?;
                }
                Err(failure) => {
                    println!("Outcome: failed ({})", failure.reason);
                    println!("A static {} set for {} would be served instead.", failure.category, failure.tier);
                }
            }
        }
        Commands::Assess {
            tier,
            speed,
            accuracy,
            complexity,
            session_score,
            recommendation,
        } => {
            let config = Config::load_from(&config_path)?;
            let signal = PerformanceSignal::try_new(speed, accuracy, complexity, session_score)?;
            let (pipeline, _) = single_learner_pipeline(&config, tier).await;
            let change = pipeline
                .submit_assessment(CLI_LEARNER, &signal, recommendation)
                .await?;
            print_json(&change)?;
        }
        Commands::Adjust { tier, direction } => {
            let config = Config::load_from(&config_path)?;
            let (pipeline, _) = single_learner_pipeline(&config, tier).await;
            let change = pipeline.adjust_tier_manually(CLI_LEARNER, direction).await?;
            print_json(&change)?;
        }
        Commands::Grade { tier, category, set, item, answer } => {
            let set = match set {
                Some(path) => load_set(&path)?,
                None => crate::exercises::fallback_set(tier, category),
            };
            let index = item.checked_sub(1).context("Item numbers start at 1")?;
            let config = Config::load_from(&config_path)?;
            let pipeline = offline_store_pipeline(&config, Arc::new(OfflineGenerator));
            let result = pipeline
                .grade_answer(&set, index, &answer)
                .with_context(|| format!("Set has {} items, no item {}", set.len(), item))?;

            if result.correct {
                println!("Correct!");
            } else {
                println!("Not quite. Expected: {}", result.expected);
            }
            if !result.explanation.is_empty() {
                println!("{}", result.explanation);
            }
        }
        Commands::Config { show, reset } => {
            if reset {
                Config::default().save_to(&config_path)?;
                println!("Configuration reset to defaults at {}", config_path.display());
            } else if show {
                let config = Config::load_from(&config_path)?;
                config::show_config(&config, &config_path);
            } else {
                println!("Use --show to view configuration or --reset to restore defaults");
            }
        }
    }

    Ok(())
}

/// Generator for the `exercises` command. Without a usable API key the
/// command still succeeds with static content.
fn exercise_generator(config: &GeneratorConfig, offline: bool) -> Arc<dyn Generator> {
    if offline {
        return Arc::new(OfflineGenerator);
    }
    match OpenRouterGenerator::from_config(config) {
        Ok(generator) => {
            info!("Using generator model {}", generator.model());
            Arc::new(generator)
        }
        Err(e) => {
            warn!("{}; serving static exercises instead", e);
            Arc::new(OfflineGenerator)
        }
    }
}

fn offline_store_pipeline(config: &Config, generator: Arc<dyn Generator>) -> TutorPipeline {
    TutorPipeline::from_config(config, generator, Arc::new(InMemoryLearnerStore::new()))
}

async fn single_learner_pipeline(
    config: &Config,
    tier: ProficiencyTier,
) -> (TutorPipeline, Arc<InMemoryLearnerStore>) {
    let store = Arc::new(InMemoryLearnerStore::new());
    store.insert(CLI_LEARNER, tier).await;
    let pipeline = TutorPipeline::from_config(config, Arc::new(OfflineGenerator), store.clone());
    (pipeline, store)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}

fn load_set(path: &Path) -> Result<ExerciseSet> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("{} is not an exercise set", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::Provenance;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_exercises() {
        let cli = Cli::try_parse_from([
            "estonian-tutor", "exercises", "--tier", "b1", "--category", "word-reordering", "--offline",
        ])
        .unwrap();
        match cli.command {
            Commands::Exercises { tier, category, offline } => {
                assert_eq!(tier, ProficiencyTier::B1);
                assert_eq!(category, Category::WordReordering);
                assert!(offline);
            }
            _ => panic!("expected exercises command"),
        }
    }

    #[test]
    fn test_rejects_unknown_tier() {
        assert!(Cli::try_parse_from(["estonian-tutor", "plan", "--tier", "D1", "--category", "grammar"]).is_err());
    }

    #[tokio::test]
    async fn test_single_learner_pipeline_assess() {
        let config = Config::default();
        let (pipeline, store) = single_learner_pipeline(&config, ProficiencyTier::C1).await;
        let signal = PerformanceSignal::try_new(1, 1, 1, None).unwrap();
        let change = pipeline
            .submit_assessment(CLI_LEARNER, &signal, Recommendation::Decrease)
            .await
            .unwrap();
        assert_eq!(change.new_tier, ProficiencyTier::B2);
        assert_eq!(store.get(CLI_LEARNER).await.unwrap().current_tier, ProficiencyTier::B2);
    }

    #[test]
    fn test_load_set_round_trips_printed_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("set.json");
        let set = crate::exercises::fallback_set(ProficiencyTier::A2, Category::Grammar);
        std::fs::write(&path, serde_json::to_string_pretty(&set).unwrap()).unwrap();

        let loaded = load_set(&path).unwrap();
        assert_eq!(loaded.id, set.id);
        assert_eq!(loaded.items, set.items);
    }

    #[tokio::test]
    async fn test_missing_api_key_serves_static_set() {
        let mut config = Config::default();
        config.generator.api_key_env = "ESTONIAN_TUTOR_UNSET_KEY_FOR_TESTS".to_string();

        let pipeline = offline_store_pipeline(&config, exercise_generator(&config.generator, false));
        let set = pipeline.request_exercises(ProficiencyTier::A1, Category::Vocabulary).await;
        assert_eq!(set.provenance, Provenance::Fallback);
        assert_eq!(set.len(), 5);
    }
}
