mod cli;

use moshforge::{config, corrupt::GlitchParams, pipeline};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "moshforge=trace,moshforge_av=debug".to_string()
        } else {
            "moshforge=info,moshforge_av=info".to_string()
        }
    });

    // Diagnostics go to stderr; stdout carries the deliverable path for
    // downstream automation.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            url,
            glitch_count,
            glitch_strength,
            cookies,
            output,
            json,
        } => {
            let source = pipeline::Source::Url { url, cookies };
            run_job(
                source,
                glitch_count,
                glitch_strength,
                output,
                cli.config.as_deref(),
                json,
            )
        }
        Commands::Mosh {
            input,
            glitch_count,
            glitch_strength,
            output,
            json,
        } => {
            if !input.exists() {
                anyhow::bail!("Input file does not exist: {:?}", input);
            }
            run_job(
                pipeline::Source::File(input),
                glitch_count,
                glitch_strength,
                output,
                cli.config.as_deref(),
                json,
            )
        }
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("moshforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_job(
    source: pipeline::Source,
    glitch_count: u32,
    glitch_strength: usize,
    output: Option<PathBuf>,
    config_path: Option<&std::path::Path>,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let job = pipeline::MoshJob {
        source,
        params: GlitchParams {
            passes: glitch_count,
            strength: glitch_strength,
        },
        output: output.unwrap_or_else(|| config.output.path.clone()),
    };

    let report = pipeline::execute(&job, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.output.display());
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = moshforge_av::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Output: {:?}", config.output.path);
            println!(
                "  Glitch defaults: {} passes x {} bytes",
                config.glitch.passes, config.glitch.strength
            );
            println!(
                "  Encode: keyframe interval {}, preset {}, crf {}",
                config.encode.keyframe_interval, config.encode.preset, config.encode.crf
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Output: {:?}", config.output.path);
            println!(
                "  Glitch defaults: {} passes x {} bytes",
                config.glitch.passes, config.glitch.strength
            );
        }
    }

    Ok(())
}
