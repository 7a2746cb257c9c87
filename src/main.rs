//! Rubric Client · terminal front end
//!
//! - `generate`: one-shot upload + generation, optional session clear
//! - `shell`: line-oriented session (subject/pick/drop/remove/generate/next/show)
//!
//! Important env variables:
//!   RUBRIC_CLIENT_CONFIG : path to TOML config
//!   RUBRIC_API_BASE_URL  : backend base URL (default "http://127.0.0.1:8000")
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{info, warn};

use rubric_client::config::load_client_config_from_env;
use rubric_client::telemetry;
use rubric_client::{
    render_text, BucketKind, Controller, GenerateOutcome, HttpRubricApi, ImageFile, RubricApi, Subject,
};

#[derive(Parser, Debug)]
#[command(name = "rubric-client", version, about = "Generate grading rubrics from question, rubric and solution images")]
struct Cli {
    /// Backend base URL; overrides config and RUBRIC_API_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload all three sections and generate a rubric.
    Generate {
        /// Defaults to the configured `default_subject`.
        #[arg(long)]
        subject: Option<Subject>,
        #[arg(long, num_args = 1.., required = true)]
        question: Vec<PathBuf>,
        #[arg(long, num_args = 1.., required = true)]
        rubrics: Vec<PathBuf>,
        #[arg(long, num_args = 1.., required = true)]
        solution: Vec<PathBuf>,
        /// Clear the server session afterwards.
        #[arg(long)]
        next: bool,
    },
    /// Interactive session over stdin.
    Shell,
}

const SHELL_HELP: &str = "\
commands:
  subject <math|physics|chemistry>
  pick <question|rubrics|solution> <path>...
  drop <question|rubrics|solution> <path>...
  remove <question|rubrics|solution> <index>
  generate
  next
  show
  help
  quit";

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let mut config = load_client_config_from_env();
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    info!(target: "rubric_client", base_url = %config.base_url, "Rubric client starting");

    let api = HttpRubricApi::new(&config).context("building HTTP client")?;
    let mut controller = Controller::new(api, &config);

    match cli.command {
        Command::Generate { subject, question, rubrics, solution, next } => {
            apply_subject(&mut controller, subject);
            for (kind, paths) in [
                (BucketKind::Question, question),
                (BucketKind::Rubrics, rubrics),
                (BucketKind::Solution, solution),
            ] {
                let files = load_files(&paths).await?;
                if let Err(e) = controller.pick_files(kind, files) {
                    print_view(&mut controller).await;
                    bail!(e);
                }
            }
            let outcome = controller.generate().await;
            print_view(&mut controller).await;
            if next {
                let reset = controller.next_question().await;
                info!(target: "rubric_client", ?reset, "Session reset");
                print_view(&mut controller).await;
            }
            if let GenerateOutcome::Failed { message } = outcome {
                bail!(message);
            }
            Ok(())
        }
        Command::Shell => run_shell(&mut controller).await,
    }
}

/// An explicit `--subject` wins; otherwise the controller keeps the configured default.
fn apply_subject<A: RubricApi>(controller: &mut Controller<A>, subject: Option<Subject>) {
    if let Some(subject) = subject {
        controller.select_subject(subject);
    }
}

async fn load_files(paths: &[PathBuf]) -> Result<Vec<ImageFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = ImageFile::from_path(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

async fn print_view<A: RubricApi>(controller: &mut Controller<A>) {
    controller.previews_mut().settle().await;
    controller.poll();
    println!("{}", render_text(&controller.view()));
}

async fn run_shell<A: RubricApi>(controller: &mut Controller<A>) -> Result<()> {
    println!("{SHELL_HELP}");
    print_view(controller).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let deadline = controller.banners().deadline();
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = banner_expiry(deadline) => {
                // Redraw so the dismissed banner disappears without user input.
                print_view(controller).await;
                continue;
            }
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else { continue };

        match run_command(controller, command, args).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => {
                warn!(target: "rubric_client", command, error = %e, "Command failed");
                println!("error: {e:#}");
            }
        }
        print_view(controller).await;
    }
    Ok(())
}

async fn banner_expiry(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Run one shell command; `Ok(true)` means quit.
async fn run_command<A: RubricApi>(controller: &mut Controller<A>, command: &str, args: &[&str]) -> Result<bool> {
    match (command, args) {
        ("quit" | "exit", _) => return Ok(true),
        ("help", _) => println!("{SHELL_HELP}"),
        ("show", _) => {}
        ("subject", [name]) => {
            controller.select_subject_named(name)?;
        }
        ("pick" | "drop", [bucket, paths @ ..]) if !paths.is_empty() => {
            let kind: BucketKind = bucket.parse()?;
            let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
            let files = load_files(&paths).await?;
            if command == "pick" {
                controller.pick_files(kind, files)?;
            } else {
                controller.drop_files(kind, files)?;
            }
        }
        ("remove", [bucket, index]) => {
            let kind: BucketKind = bucket.parse()?;
            let index: usize = index.parse().context("index must be a number")?;
            let removed = controller.remove_file(kind, index)?;
            println!("removed {}", removed.name);
        }
        ("generate", []) => {
            println!("Generating rubric...");
            controller.generate().await;
        }
        ("next", []) => {
            controller.next_question().await;
        }
        _ => bail!("unrecognised command; type `help`"),
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rubric_client::protocol::{GenerateResponse, NextResponse, RequestId};
    use rubric_client::{ApiError, ClientConfig, GenerateRequest};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingApi {
        subjects: Arc<Mutex<Vec<Subject>>>,
    }

    #[async_trait]
    impl RubricApi for RecordingApi {
        async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ApiError> {
            self.subjects.lock().unwrap().push(request.subject);
            Ok(serde_json::from_str(r#"{"request_id":"r1","rubric":[]}"#).unwrap())
        }
        async fn clear_session(&self, _request_id: &RequestId) -> Result<NextResponse, ApiError> {
            Ok(serde_json::from_str(r#"{"message":"ok"}"#).unwrap())
        }
    }

    fn generate_args(extra: &[&str]) -> Option<Subject> {
        let mut argv = vec!["rubric-client", "generate", "--question", "q.png", "--rubrics", "r.png", "--solution", "s.png"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Generate { subject, .. } => subject,
            Command::Shell => panic!("parsed the wrong command"),
        }
    }

    async fn submitted_subject(config: &ClientConfig, cli_subject: Option<Subject>) -> Subject {
        let api = RecordingApi::default();
        let mut controller = Controller::new(api.clone(), config);
        apply_subject(&mut controller, cli_subject);
        for kind in BucketKind::ALL {
            controller.pick_files(kind, vec![ImageFile::new("p.png", "image/png", vec![1u8])]).unwrap();
        }
        controller.generate().await;
        let sent = api.subjects.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        sent[0]
    }

    #[tokio::test]
    async fn generate_without_subject_sends_configured_default() {
        let config = ClientConfig::from_toml_str("default_subject = \"physics\"", "inline").unwrap();
        let subject = generate_args(&[]);
        assert_eq!(subject, None);
        assert_eq!(submitted_subject(&config, subject).await, Subject::Physics);
    }

    #[tokio::test]
    async fn explicit_subject_overrides_configured_default() {
        let config = ClientConfig::from_toml_str("default_subject = \"physics\"", "inline").unwrap();
        let subject = generate_args(&["--subject", "chemistry"]);
        assert_eq!(subject, Some(Subject::Chemistry));
        assert_eq!(submitted_subject(&config, subject).await, Subject::Chemistry);
    }
}
