//! Zimin CLI - command bridge
//!
//! Commands: generate, reply, check, init
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on rejected input or failed render

use base64::Engine;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use zimin_core::{
    command::{handle_command, Reply},
    hashing::file_sha256,
    resources::{copy_default_template, initialize_resources, read_image_bytes},
    ComposeError, Compositor, ZiminConfig, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "zimin-cli")]
#[command(about = "Zimin CLI - put three texts on the zimin template")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the template image and font
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory generated images are written to
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render three texts onto the template
    Generate {
        left: String,
        middle: String,
        right: String,

        /// Include the PNG bytes as base64 in the output
        #[arg(long)]
        base64: bool,
    },

    /// Run the chat command on raw argument text, e.g. "a b c"
    Reply {
        args: String,
    },

    /// Create directories and report missing resources
    Check,

    /// Install a template image into the data directory
    Init {
        /// Image to copy
        #[arg(long)]
        from: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("zimin_core=info,zimin_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = match ZiminConfig::load_or_default(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Generate { left, middle, right, base64 } => {
            if !config.enable_zi_min {
                return disabled();
            }
            let compositor = Compositor::new(&config, &cli.data_dir);
            generate(&compositor, [left.as_str(), middle.as_str(), right.as_str()], &cli.cache_dir, base64)
        }

        Commands::Reply { args } => {
            if !config.enable_zi_min {
                return disabled();
            }
            let compositor = Compositor::new(&config, &cli.data_dir);
            match handle_command(&compositor, &args, &cli.cache_dir) {
                Reply::Image { bytes, mime } => {
                    print_json(&serde_json::json!({
                        "kind": "image",
                        "mime": mime,
                        "data_base64": base64::engine::general_purpose::STANDARD.encode(&bytes),
                    }));
                    ExitCode::SUCCESS
                }
                reply @ Reply::Text { .. } => {
                    print_json(&serde_json::to_value(&reply).unwrap_or_default());
                    ExitCode::from(2)
                }
            }
        }

        Commands::Check => match initialize_resources(&config, &cli.data_dir, &cli.cache_dir) {
            Ok(report) => {
                let complete = report.is_complete();
                print_json(&serde_json::json!({
                    "complete": complete,
                    "render_available": Compositor::is_available(),
                    "resources": report,
                }));
                if complete {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(e) => {
                print_json(&serde_json::json!({ "complete": false, "error": e.to_string() }));
                ExitCode::FAILURE
            }
        },

        Commands::Init { from } => match copy_default_template(&from, &config, &cli.data_dir) {
            Ok(target) => {
                print_json(&serde_json::json!({ "success": true, "template": target }));
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(from = %from.display(), error = %e, "Failed to install template");
                print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                ExitCode::FAILURE
            }
        },
    }
}

fn disabled() -> ExitCode {
    print_json(&serde_json::json!({ "success": false, "error": "zimin is disabled in config" }));
    ExitCode::FAILURE
}

fn generate(compositor: &Compositor, texts: [&str; 3], cache_dir: &Path, with_data: bool) -> ExitCode {
    let path = match compositor.compose(texts, cache_dir) {
        Ok(path) => path,
        Err(e) => {
            let reason = match &e {
                ComposeError::InvalidInput(rejection) => Some(rejection.reason()),
                _ => None,
            };
            print_json(&serde_json::json!({
                "success": false,
                "error": e.user_message(),
                "reason": reason,
            }));
            return ExitCode::from(2);
        }
    };

    let sha256 = match file_sha256(&path) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to hash output");
            print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
            return ExitCode::FAILURE;
        }
    };

    let mut output = serde_json::json!({
        "success": true,
        "path": path,
        "sha256": sha256,
        "created_at": Utc::now(),
        "engine_version": ENGINE_VERSION,
    });
    if with_data {
        let Some(bytes) = read_image_bytes(&path) else {
            print_json(&serde_json::json!({ "success": false, "error": "failed to read output" }));
            return ExitCode::FAILURE;
        };
        output["data_base64"] = base64::engine::general_purpose::STANDARD.encode(bytes).into();
    }
    print_json(&output);
    ExitCode::SUCCESS
}
