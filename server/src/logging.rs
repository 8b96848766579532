//! Logging init: append to a file when configured, otherwise stderr.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rushget=debug,rushget_server=debug,rushget_core=debug";

/// One formatted event's destination. Each event gets a fresh handle to
/// the relay log; if the handle cannot be duplicated that event goes to
/// stderr instead of being dropped.
enum Sink {
    Log(fs::File),
    Stderr(io::Stderr),
}

impl io::Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Log(file) => file.write(buf),
            Sink::Stderr(err) => err.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Log(file) => file.flush(),
            Sink::Stderr(err) => err.flush(),
        }
    }
}

/// The `log_file` from the relay config, opened for append.
struct RelayLog {
    file: fs::File,
}

impl RelayLog {
    fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        Ok(Self { file })
    }
}

impl<'a> MakeWriter<'a> for RelayLog {
    type Writer = Sink;

    fn make_writer(&'a self) -> Self::Writer {
        match self.file.try_clone() {
            Ok(file) => Sink::Log(file),
            Err(_) => Sink::Stderr(io::stderr()),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. With `log_file`, events are appended
/// there; if the file cannot be opened nothing is installed and the error
/// is returned, leaving `init_stderr` to the caller.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        init_stderr();
        return Ok(());
    };

    let log = RelayLog::open(path)?;
    install(BoxMakeWriter::new(log));
    tracing::info!(path = %path.display(), "relay log opened");
    Ok(())
}

pub fn init_stderr() {
    install(BoxMakeWriter::new(io::stderr));
}

fn install(writer: BoxMakeWriter) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
}
