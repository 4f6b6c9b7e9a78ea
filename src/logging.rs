use crate::app_dirs::AppDirs;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Route `log` records to a file so they never paint over the TUI.
///
/// `RUST_LOG` overrides the default `info` level. Returns the log file path,
/// or `None` when no writable location exists and logging stays off.
pub fn init() -> Option<PathBuf> {
    let path = AppDirs::log_path()?;
    init_at(&path).ok().map(|()| path)
}

pub fn init_at(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(io::Error::other)?;

    log::info!("typeline {} starting up", env!("CARGO_PKG_VERSION"));
    Ok(())
}
