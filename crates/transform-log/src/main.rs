//! transform-log - render JSON log lines through a template.
//!
//! Reads one JSON record per line from a file or stdin and writes each one
//! rendered through the configured template:
//!
//! ```text
//! $ echo '{"msg":"started","port":8080}' | transform-log -t '{msg} on :{port}'
//! started on :8080
//! ```
//!
//! Options come from `--config` (JSON, YAML, or a `transform` directive) and
//! are overridden by flags. Diagnostics go to stderr; use `-v` or `RUST_LOG`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use transform_encoder::{RenderConfig, TransformConfig};

#[derive(Parser, Debug)]
#[command(name = "transform-log", version, about = "Render JSON log lines through a template")]
struct Args {
    /// Template applied to each record, e.g. '{request>method} {request>uri}'
    #[arg(short, long)]
    template: Option<String>,

    /// Value for placeholders that resolve to nothing [default: -]
    #[arg(short, long)]
    placeholder: Option<String>,

    /// Decode JSON escapes in string values
    #[arg(short, long)]
    unescape_strings: bool,

    /// Configuration file (.json, .yaml/.yml, or a transform directive)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase diagnostic verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// JSON-lines input, `-` for stdin
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
}

impl Args {
    /// Loads the configuration file, if any, and applies flag overrides.
    fn load_config(&self) -> Result<TransformConfig> {
        let mut config = match &self.config {
            Some(path) => TransformConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => TransformConfig::default(),
        };

        if let Some(template) = &self.template {
            config.template = Some(template.clone());
        }
        if let Some(placeholder) = &self.placeholder {
            config.placeholder = Some(placeholder.clone());
        }
        if self.unescape_strings {
            config.unescape_strings = true;
        }
        Ok(config)
    }

    /// Input file path, `None` when reading stdin.
    fn input_file(&self) -> Option<&Path> {
        self.input.as_deref().filter(|path| *path != Path::new("-"))
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Renders every non-blank line of `input` into `output`.
///
/// Lines are handed to the renderer as raw bytes, so a line that is not
/// UTF-8 or not JSON still renders with every placeholder defaulted.
/// Returns the number of records rendered.
fn run(config: &RenderConfig, mut input: impl BufRead, mut output: impl Write) -> Result<usize> {
    let mut rendered = 0;
    let mut buf = Vec::new();
    for number in 1usize.. {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed to read input line {}", number))?;
        if read == 0 {
            break;
        }

        let line = trim_line_ending(&buf);
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        output
            .write_all(config.render(line).as_bytes())
            .context("failed to write output")?;
        rendered += 1;
    }
    output.flush().context("failed to flush output")?;
    Ok(rendered)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args
        .load_config()?
        .provision()
        .context("invalid transform configuration")?;
    info!(template = config.template().as_str(), "rendering records");

    let stdout = io::stdout();
    let output = BufWriter::new(stdout.lock());

    let rendered = match args.input_file() {
        None => run(&config, io::stdin().lock(), output)?,
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            run(&config, BufReader::new(file), output)?
        }
    };

    debug!(rendered, "done");
    Ok(())
}
