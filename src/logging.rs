use crate::config::data_dir;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::OnceLock;

static INIT: OnceLock<bool> = OnceLock::new();

/// Directory holding `app.log`.
pub fn log_dir() -> Result<PathBuf, Error> {
    data_dir()
        .map(|dir| dir.join("logs"))
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))
}

/// Install the global logger once.
///
/// With `RUST_LOG` set, logs go to stderr through env_logger so a developer
/// can watch them live. Otherwise they are appended to
/// `~/.local/share/microtunrs/logs/app.log`, keeping the terminal free for
/// the monitor and console.
pub fn init_logger(level: LevelFilter) -> Result<(), Error> {
    let initialized = *INIT.get_or_init(|| {
        if std::env::var_os("RUST_LOG").is_some() {
            return env_logger::Builder::from_default_env().try_init().is_ok();
        }
        match open_log_file() {
            Ok(file) => {
                let config = ConfigBuilder::new()
                    .set_thread_level(LevelFilter::Debug)
                    .build();
                WriteLogger::init(level, config, file).is_ok()
            }
            Err(_) => false,
        }
    });

    if initialized {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::Other, "Logger initialization failed"))
    }
}

fn open_log_file() -> Result<fs::File, Error> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("app.log"))
}
