//! # gamecrew CLI
//!
//! Runs the game-building crew and inspects its outputs.
//!
//! Usage:
//!   gamecrew                 # same as `gamecrew run`
//!   gamecrew run --fresh
//!   gamecrew status
//!   gamecrew image --prompt "stone maze wall" --filename wall
//!
//! Examples:
//!   OPENAI_API_KEY=sk-... gamecrew
//!   gamecrew --config-dir my_config --output-dir out run
//!   RUST_LOG=gamecrew_llm=debug gamecrew run

use clap::{Parser, Subcommand};
use gamecrew_crew::{
    load_agents, load_tasks, task_slug, Crew, CrewInputs, CrewSettings, ImageGenerationArgs,
    ImageGenerationTool, OutputWriter, ProgressMarker, ToolSet,
};
use gamecrew_error::Result;
use gamecrew_llm::{OpenAIProvider, ProviderConfig, RateLimitPolicy};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gamecrew")]
#[command(author, version, about = "gamecrew - a crew of LLM agents that builds a browser game")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding agents.yaml, tasks.yaml and inputs.yaml
    #[arg(long, global = true, default_value = gamecrew_crew::DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    /// Directory for task outputs, progress.json and images
    #[arg(long, global = true, default_value = gamecrew_crew::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only warnings and the final result
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the crew (default)
    Run {
        /// Clear the progress marker before running
        #[arg(long)]
        fresh: bool,

        /// Give up after this many rate-limit retries per call (default: never)
        #[arg(long)]
        max_rate_limit_retries: Option<u32>,

        /// Seconds to wait when the provider gives no retry hint
        #[arg(long, default_value = "30")]
        rate_limit_delay: u64,
    },
    /// List configured agents
    Agents,
    /// List configured tasks in run order
    Tasks,
    /// Show which tasks the progress marker covers
    Status,
    /// Remove the progress marker
    Reset,
    /// Generate a single image with the image tool
    Image {
        /// Detailed description of the image
        #[arg(long)]
        prompt: String,

        /// File name to save under, without extension
        #[arg(long)]
        filename: String,

        #[arg(long, default_value = gamecrew_llm::image::DEFAULT_STYLE)]
        style: String,

        #[arg(long, default_value = gamecrew_llm::image::DEFAULT_ASPECT_RATIO)]
        aspect_ratio: String,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn load_crew(settings: &CrewSettings, tools: &ToolSet) -> Result<Crew> {
    let agents = load_agents(settings.agents_path())?;
    let tasks = load_tasks(settings.tasks_path())?;
    Ok(Crew::from_config(agents, tasks, tools)?.with_rate_limit(settings.rate_limit.clone()))
}

/// Logged on every run, fresh or not
fn resume_point(last_task: Option<&str>) -> &str {
    last_task.unwrap_or("None")
}

async fn run_crew(settings: &CrewSettings, fresh: bool, quiet: bool) -> Result<()> {
    let config = ProviderConfig::from_env()?;
    let tools = ToolSet::new().with(ImageGenerationTool::new(config.clone(), settings.images_dir())?);
    let crew = load_crew(settings, &tools)?;
    let inputs = CrewInputs::load(settings.inputs_path())?;
    let provider = OpenAIProvider::new(config)?;

    let mut writer = OutputWriter::new(settings.output_dir(), &crew.task_names())?;
    if fresh {
        writer.marker_mut().reset()?;
    }
    tracing::info!(last_task = resume_point(writer.marker().last_task()), "Resuming from last task");

    let output = crew.kickoff(&provider, &inputs, &mut writer).await?;
    let final_path = writer.write_final(&output)?;

    if !quiet {
        println!("\n--- CREW RESULT ---\n");
    }
    println!("{}", output.raw);

    if !quiet {
        println!("\n--- Outputs ---");
        for path in writer.written() {
            println!("  {}", path.display());
        }
        for slug in writer.skipped() {
            println!("  {} (already recorded, not rewritten)", slug);
        }
        println!(
            "\n{} tasks, {} LLM calls, {} tokens. Final result appended to {}",
            output.tasks_output.len(),
            output.usage.calls,
            output.usage.total_tokens(),
            final_path.display()
        );
    }
    Ok(())
}

fn list_agents(settings: &CrewSettings) -> Result<()> {
    let agents = load_agents(settings.agents_path())?;
    println!("Agents in {}:", settings.agents_path().display());
    for (key, agent) in &agents {
        let tools = if agent.tools.is_empty() {
            String::new()
        } else {
            format!(" [tools: {}]", agent.tools.join(", "))
        };
        println!("  - {}: {}{}", key, agent.role.trim(), tools);
    }
    Ok(())
}

fn list_tasks(settings: &CrewSettings) -> Result<()> {
    let tasks = load_tasks(settings.tasks_path())?;
    println!("Tasks in {}:", settings.tasks_path().display());
    for (index, (name, task)) in tasks.iter().enumerate() {
        println!("  {:2}. {} -> {}", index + 1, name, task.agent);
    }
    Ok(())
}

fn show_status(settings: &CrewSettings) -> Result<()> {
    let marker = ProgressMarker::load(settings.progress_path())?;
    let tasks = load_tasks(settings.tasks_path())?;
    let order: Vec<String> = tasks.iter().map(|(name, _)| task_slug(name)).collect();

    match marker.last_task() {
        Some(last) => println!("Last recorded task: {}", last),
        None => println!("No progress recorded in {}", settings.progress_path().display()),
    }
    for slug in &order {
        let mark = if marker.is_completed(slug, &order) { "x" } else { " " };
        println!("  [{}] {}", mark, slug);
    }
    Ok(())
}

fn reset_progress(settings: &CrewSettings) -> Result<()> {
    let mut marker = ProgressMarker::load(settings.progress_path())?;
    marker.reset()?;
    println!("Removed {}", settings.progress_path().display());
    Ok(())
}

async fn generate_image(settings: &CrewSettings, args: ImageGenerationArgs) -> Result<()> {
    let tool = ImageGenerationTool::new(ProviderConfig::from_env()?, settings.images_dir())?;
    println!("{}", tool.generate(&args).await);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut settings = CrewSettings::new(cli.config_dir, cli.output_dir);
    let command = cli.command.unwrap_or(Commands::Run {
        fresh: false,
        max_rate_limit_retries: None,
        rate_limit_delay: 30,
    });

    let result = match command {
        Commands::Run {
            fresh,
            max_rate_limit_retries,
            rate_limit_delay,
        } => {
            let mut policy = RateLimitPolicy::default()
                .with_default_delay(Duration::from_secs(rate_limit_delay));
            if let Some(max) = max_rate_limit_retries {
                policy = policy.with_max_retries(max);
            }
            settings = settings.with_rate_limit(policy);
            run_crew(&settings, fresh, cli.quiet).await
        }
        Commands::Agents => list_agents(&settings),
        Commands::Tasks => list_tasks(&settings),
        Commands::Status => show_status(&settings),
        Commands::Reset => reset_progress(&settings),
        Commands::Image {
            prompt,
            filename,
            style,
            aspect_ratio,
        } => {
            let args = ImageGenerationArgs {
                prompt,
                filename,
                style,
                aspect_ratio,
            };
            generate_image(&settings, args).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if e.kind().is_config_error() {
            eprintln!("Check the crew configuration in {}", settings.config_dir.display());
        }
        std::process::exit(1);
    }
}
