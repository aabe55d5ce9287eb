use std::fs::File;

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger};

/// Path to the log file, next to the host executable's working directory.
const LOG_FILE_PATH: &str = "d3d9_wrapper.log";

/// Initializes the logging system at `level`.
pub fn init(level: LevelFilter) {
    let result = match File::create(LOG_FILE_PATH) {
        Ok(file) => CombinedLogger::init(vec![
            TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
            WriteLogger::new(level, Config::default(), file),
        ]),
        Err(_) => TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
    };

    if result.is_err() {
        log::error!("Failed to initialize logger!");
    }
}
