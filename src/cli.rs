//! Command-line interface for wiki2html.

use clap::Parser;
use std::path::PathBuf;

use wikiparse_config::Config;

/// wiki2html - Convert Wiki Creole markup to HTML.
///
/// Input is streamed through a fixed-size buffer, so arbitrarily large
/// documents convert in constant memory as long as no single construct
/// outgrows the buffer.
#[derive(Parser, Debug)]
#[command(
    name = "wiki2html",
    author = "Wikiparse Contributors",
    version,
    about = "Convert Wiki Creole markup to HTML",
    after_help = "Repository: https://github.com/wikiparse/wikiparse-rs\n\n\
                  Examples:\n  \
                  cat page.wiki | wiki2html\n  \
                  wiki2html -x -b 4096 page.wiki\n  \
                  wiki2html -c '[features]\\nBlogStyle = true' notes.wiki"
)]
pub struct Cli {
    /// Input files to process (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Streaming buffer size in bytes (the longest single construct must fit)
    #[arg(short = 'b', long = "buffer", value_name = "SIZE")]
    pub buffer: Option<usize>,

    /// Parse as inline markup instead of block markup
    #[arg(short = 'i', long = "inline")]
    pub inline: bool,

    /// Enable the markup extensions (definition lists, code, keyboard, ...)
    #[arg(short = 'x', long = "extensions")]
    pub extensions: bool,

    /// Treat single line breaks as rendered line breaks
    #[arg(short = 's', long = "blog")]
    pub blog: bool,

    /// Render inline nowiki spans as monospaced
    #[arg(short = 'm', long = "monospace")]
    pub monospace: bool,

    /// Use a custom config file or inline TOML
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "loglevel", default_value = "warn")]
    pub log_level: String,

    /// Show configuration paths and exit
    #[arg(long = "paths")]
    pub show_paths: bool,
}

impl Cli {
    /// Check if we should read from stdin.
    pub fn should_read_stdin(&self) -> bool {
        self.files.is_empty()
    }

    /// Fold command-line switches into a loaded configuration.
    ///
    /// Switches only ever enable features; a buffer size given here replaces
    /// the configured one.
    pub fn apply(&self, config: &mut Config) {
        config.features.additions |= self.extensions;
        config.features.blog_style |= self.blog;
        config.features.monospace |= self.monospace;
        if let Some(size) = self.buffer {
            config.buffer.size = size;
        }
    }
}

/// Show paths information.
pub fn show_paths() {
    let config_path = Config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not found)".to_string());
    let config_dir = Config::config_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not found)".to_string());

    println!("paths:");
    println!("  config                {}", config_path);
    println!("  config dir            {}", config_dir);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_default() {
        let cli = Cli::parse_from(["wiki2html"]);
        assert!(cli.files.is_empty());
        assert_eq!(cli.buffer, None);
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.inline);
        assert!(cli.should_read_stdin());
    }

    #[test]
    fn test_cli_parse_with_file() {
        let cli = Cli::parse_from(["wiki2html", "page.wiki"]);
        assert_eq!(cli.files.len(), 1);
        assert_eq!(cli.files[0], PathBuf::from("page.wiki"));
        assert!(!cli.should_read_stdin());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::parse_from([
            "wiki2html",
            "-b", "128",
            "-l", "debug",
            "-x",
            "--blog",
            "-i",
            "file.wiki",
        ]);
        assert_eq!(cli.buffer, Some(128));
        assert_eq!(cli.log_level, "debug");
        assert!(cli.extensions);
        assert!(cli.blog);
        assert!(cli.inline);
        assert!(!cli.monospace);
    }

    #[test]
    fn test_apply_overrides_config() {
        let cli = Cli::parse_from(["wiki2html", "-m", "-b", "64"]);
        let mut config = Config::default();
        config.features.additions = true;
        cli.apply(&mut config);

        assert!(config.features.additions);
        assert!(config.features.monospace);
        assert!(!config.features.blog_style);
        assert_eq!(config.buffer.size, 64);
    }
}
