//! wiki2html - Convert Wiki Creole markup to HTML.
//!
//! This binary provides the reference command-line converter for the
//! wikiparse library, streaming files or stdin through a fixed-size buffer.

mod cli;

use clap::Parser as ClapParser;
use cli::Cli;
use log::{debug, info, LevelFilter};
use std::fs::File;
use std::io::{self, BufWriter, Write};

use wikiparse_config::Config;
use wikiparse_core::{ParseMode, WikiError};
use wikiparse_parser::{IoReader, Reader, WikiBuffer, WikiParser};
use wikiparse_render::HtmlRenderer;

fn main() {
    let cli = <Cli as ClapParser>::parse();

    // Handle --paths flag
    if cli.show_paths {
        cli::show_paths();
        return;
    }

    // Set up logging
    setup_logging(&cli.log_level);
    info!("wiki2html v{}", env!("CARGO_PKG_VERSION"));

    if let Err(message) = run(&cli) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

/// Set up logging based on the log level argument.
fn setup_logging(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Main application logic.
///
/// Errors come back already formatted for the user.
fn run(cli: &Cli) -> Result<(), String> {
    let mut config = Config::load_with_override(cli.config.as_deref())
        .map_err(|e| format!("wiki2html: {}", e))?;
    cli.apply(&mut config);
    config
        .validate()
        .map_err(|e| format!("wiki2html: {}", e))?;
    debug!("Loaded config: {:?}", config);

    let mode = if cli.inline {
        ParseMode::Inline
    } else {
        ParseMode::Block
    };

    let stdout = io::stdout();
    let renderer = HtmlRenderer::new(BufWriter::new(stdout.lock()));
    let mut parser = WikiParser::with_config(config.parser_config(), renderer)
        .with_marker_slots(config.buffer.markers);
    let mut buffer = WikiBuffer::new(config.buffer.size);

    if cli.should_read_stdin() {
        info!("Reading from stdin");
        let mut reader = IoReader::new(io::stdin().lock());
        convert(&mut parser, &mut buffer, &mut reader, mode, "<stdin>")?;
    } else {
        for path in &cli.files {
            let name = path.display().to_string();
            info!("Processing file: {}", name);
            let file = File::open(path).map_err(|e| format!("{}: {}", name, e))?;
            let mut reader = IoReader::new(file);
            convert(&mut parser, &mut buffer, &mut reader, mode, &name)?;
        }
    }

    parser
        .user_data_mut()
        .get_mut()
        .flush()
        .map_err(|e| format!("wiki2html: {}", e))
}

/// Stream one input through the parser.
fn convert<W: Write, R: Reader>(
    parser: &mut WikiParser<HtmlRenderer<W>>,
    buffer: &mut WikiBuffer,
    reader: &mut R,
    mode: ParseMode,
    name: &str,
) -> Result<(), String> {
    match parser.parse_stream(buffer, reader, mode) {
        Ok(()) => {
            let stats = parser.stats();
            debug!(
                "{}: {} lines, {} refills, {} compactions",
                name,
                parser.current_line(),
                stats.refills,
                stats.compactions
            );
            Ok(())
        }
        Err(WikiError::Parse { code, line }) => {
            Err(format!("{}:{}: {}", name, line, code.message()))
        }
        Err(e) => Err(format!("{}: {}", name, e)),
    }
}
