//! mjml-render CLI
//!
//! Usage:
//!   mjml-render [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>        Options file (TOML format)
//!   -o, --output <FILE>        Write HTML here instead of stdout
//!       --include-root <DIR>   Directory mj-include paths resolve against
//!       --strict               Fail on unknown tags
//!       --minify               Minify CSS
//!   -v, --verbose              Log pipeline stages
//!   -h, --help                 Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mjml_render::{
    render_with_config, ConfigFile, FileSystemIncludeResolver, RenderConfig, RenderError,
};

#[derive(Parser)]
#[command(name = "mjml-render")]
#[command(about = "Compile MJML email markup to HTML")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Options file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory mj-include paths are resolved against
    #[arg(long)]
    include_root: Option<PathBuf>,

    /// Fail on unknown tags instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Collapse whitespace in generated CSS
    #[arg(long)]
    minify: bool,

    /// Log pipeline stages to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if cli.input.is_none() && io::stdin().is_terminal() {
        eprintln!("Usage: mjml-render [OPTIONS] [FILE]\n       cat email.mjml | mjml-render\n\nRun with --help for options.");
        std::process::exit(1);
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let html = match render_with_config(&source, &config) {
        Ok(html) => html,
        Err(RenderError::Parse(e)) => {
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, html) {
                eprintln!("Error writing file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => print!("{}", html),
    }
}

/// Directory holding `input`; `.` for a bare file name
fn input_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Defaults, then the options file, then command-line flags
fn build_config(cli: &Cli) -> Result<RenderConfig, String> {
    let mut config = RenderConfig::new();

    // Includes resolve next to the input file unless told otherwise
    if let Some(input) = &cli.input {
        config = config.with_include_resolver(FileSystemIncludeResolver::new(input_dir(input)));
    }

    if let Some(path) = &cli.config {
        let file = ConfigFile::from_file(path)
            .map_err(|e| format!("loading config '{}': {}", path.display(), e))?;
        config = file.apply(config);
    }

    if let Some(root) = &cli.include_root {
        config = config.with_include_resolver(FileSystemIncludeResolver::new(root));
    }
    if cli.strict {
        config = config.with_strict(true);
    }
    if cli.minify {
        config = config.with_css_minify(true);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_dir() {
        assert_eq!(input_dir(Path::new("email.mjml")), PathBuf::from("."));
        assert_eq!(
            input_dir(Path::new("templates/email.mjml")),
            PathBuf::from("templates")
        );
        assert_eq!(input_dir(Path::new("/tmp/email.mjml")), PathBuf::from("/tmp"));
    }
}
