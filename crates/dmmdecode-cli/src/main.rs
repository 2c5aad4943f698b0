mod diagnostics;
mod frames;
mod sink;

use std::fs::{self, File};
use std::io::{self, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dmmdecode_core::{
    Decoder, DecoderConfig, DeviceProfile, OutputConfig, OutputDestination, OutputFormat,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use diagnostics::{DebugKind, Diagnostics};
use frames::{FrameLine, FrameLines, STDIN_PATH, frames_from_args, resolve_input_paths};
use sink::{OutputSink, ReadingRecord};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("DMMDECODE_BUILD_COMMIT"),
    ", built ",
    env!("DMMDECODE_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  dmmdecode decode -p zt5b.json 41217355184c7d7f66fa3a\n  dmmdecode replay -p zt5b.json frames.txt --format csv -o readings.csv\n  tail -f capture.log | dmmdecode replay -p zt5b.json -\n  dmmdecode profile zt5b.json";

#[derive(Parser, Debug)]
#[command(name = "dmmdecode")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decode multimeter display frames into readings using a device profile.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Log decoder internals (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode frames given on the command line.
    Decode {
        /// Hex frames, one per argument (spaces inside a quoted frame are ignored)
        #[arg(required = true)]
        frames: Vec<String>,

        #[command(flatten)]
        options: RunOptions,
    },
    /// Decode a frame log, one hex frame per line.
    #[command(after_help = "Blank lines and lines starting with '#' are skipped.")]
    Replay {
        /// Frame log path, glob pattern, or '-' for stdin
        input: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },
    /// Show the device metadata of a profile.
    Profile {
        /// Device profile (JSON)
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunOptions {
    /// Device profile (JSON)
    #[arg(short = 'p', long)]
    profile: PathBuf,

    /// Output format (overrides the profile)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Append readings to this file (overrides the profile)
    #[arg(short = 'o', long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write readings to stdout (overrides the profile)
    #[arg(long)]
    stdout: bool,

    /// Print a debug block to stderr for every frame (repeatable)
    #[arg(long, value_enum)]
    debug: Vec<DebugKind>,

    /// Print a one-line summary per frame to stderr
    #[arg(long)]
    brief: bool,

    /// Exit with a non-zero code if any frame was skipped
    #[arg(long)]
    strict: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    JsonPp,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::JsonPp => OutputFormat::JsonPretty,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode { frames, options } => cmd_decode(&frames, &options),
        Commands::Replay { input, options } => cmd_replay(&input, &options),
        Commands::Profile { path } => cmd_profile(&path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "dmmdecode=debug,dmmdecode_core=debug"
    } else {
        "dmmdecode=info,dmmdecode_core=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(false),
        )
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_decode(frames: &[String], options: &RunOptions) -> Result<(), CliError> {
    let mut session = Session::open(options)?;
    session.consume(frames_from_args(frames).into_iter().map(Ok))?;
    session.finish()
}

fn cmd_replay(input: &Path, options: &RunOptions) -> Result<(), CliError> {
    let mut session = Session::open(options)?;
    if input == Path::new(STDIN_PATH) {
        session.consume(FrameLines::new(io::stdin().lock(), "stdin"))?;
    } else {
        for path in resolve_input_paths(input)? {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open frame log: {}", path.display()))?;
            session.consume(FrameLines::new(
                BufReader::new(file),
                path.display().to_string(),
            ))?;
        }
    }
    session.finish()
}

fn cmd_profile(path: &Path) -> Result<(), CliError> {
    let profile = load_profile(path)?;
    DecoderConfig::from_profile(&profile).map_err(|err| invalid_profile(path, err))?;
    let json = serde_json::to_string_pretty(&profile.device_info())
        .context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}

fn load_profile(path: &Path) -> Result<DeviceProfile, CliError> {
    let json = fs::read_to_string(path).map_err(|err| {
        CliError::new(
            format!("failed to read profile {}: {}", path.display(), err),
            Some("pass a device profile JSON with -p/--profile".to_string()),
        )
    })?;
    DeviceProfile::from_json_str(&json).map_err(|err| invalid_profile(path, err))
}

fn invalid_profile(path: &Path, err: impl std::fmt::Display) -> CliError {
    CliError::new(
        format!("invalid profile {}: {}", path.display(), err),
        Some("check the profile's xorkey, regions and digit_table entries".to_string()),
    )
}

/// Output settings from the profile with command-line overrides applied.
fn resolve_output(profile: &DeviceProfile, options: &RunOptions) -> Result<OutputConfig, CliError> {
    let mut output = profile.output_config().map_err(|err| {
        CliError::new(
            format!("invalid output settings in {}: {}", options.profile.display(), err),
            Some("use --stdout or -o/--output to override the destination".to_string()),
        )
    });
    if options.stdout || options.output.is_some() {
        // A bad destination in the profile does not matter once it is overridden.
        output = output.or_else(|_| Ok(OutputConfig::default()));
    }
    let mut output = output?;
    if let Some(format) = options.format {
        output.format = format.into();
    }
    if let Some(path) = &options.output {
        output.destination = OutputDestination::File(path.clone());
    } else if options.stdout {
        output.destination = OutputDestination::Stdout;
    }
    Ok(output)
}

/// Decoding state for one `decode` or `replay` run.
struct Session {
    decoder: Decoder,
    sink: OutputSink,
    diagnostics: Diagnostics,
    quiet: bool,
    strict: bool,
    skipped: u64,
}

impl Session {
    fn open(options: &RunOptions) -> Result<Self, CliError> {
        let profile = load_profile(&options.profile)?;
        let config = DecoderConfig::from_profile(&profile)
            .map_err(|err| invalid_profile(&options.profile, err))?;
        if profile.debug.device_info && !options.quiet {
            let info = serde_json::to_string_pretty(&profile.device_info())
                .context("JSON serialization failed")?;
            eprintln!("[DEVICE INFO]\n{info}");
        }
        let output = resolve_output(&profile, options)?;
        debug!(format = ?output.format, destination = ?output.destination, "output configured");
        Ok(Self {
            decoder: Decoder::new(config),
            sink: OutputSink::open(output)?,
            diagnostics: Diagnostics::new(&options.debug, profile.debug, options.brief),
            quiet: options.quiet,
            strict: options.strict,
            skipped: 0,
        })
    }

    fn consume(&mut self, frames: impl Iterator<Item = io::Result<FrameLine>>) -> Result<()> {
        for frame in frames {
            let frame = frame.context("Failed to read frame log")?;
            self.handle(&frame)?;
        }
        Ok(())
    }

    fn handle(&mut self, frame: &FrameLine) -> Result<()> {
        let decoded = if self.diagnostics.needs_trace() {
            self.decoder
                .decode_traced(&frame.hex)
                .map(|(reading, trace)| (reading, Some(trace)))
        } else {
            self.decoder.decode(&frame.hex).map(|reading| (reading, None))
        };
        let (reading, trace) = match decoded {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(origin = %frame.origin, "skipping frame: {err}");
                self.skipped += 1;
                return Ok(());
            }
        };

        self.diagnostics.report(
            &mut io::stderr().lock(),
            frame,
            &reading,
            trace.as_ref(),
            self.decoder.config().digit_table(),
        )?;
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("Failed to format timestamp")?;
        self.sink.write(&ReadingRecord {
            timestamp,
            hex: &frame.hex,
            reading: &reading,
        })
    }

    fn finish(mut self) -> Result<(), CliError> {
        self.sink.finish()?;
        if !self.quiet {
            eprintln!(
                "OK: {} frames decoded, {} skipped",
                self.sink.written(),
                self.skipped
            );
        }
        if self.strict && self.skipped > 0 {
            return Err(CliError::new(
                format!("{} malformed frame(s) skipped", self.skipped),
                Some("run without --strict to ignore malformed frames".to_string()),
            ));
        }
        Ok(())
    }
}
