//! Runtime configuration: file locations and poll interval.

use std::path::PathBuf;
use std::time::Duration;

/// Q&A backing file, relative to the working directory
pub const QA_FILE: &str = "p.txt";
/// Holds the background monitor's PID between start and stop
pub const PID_FILE: &str = "p.pid";
/// Log output of the detached monitor
pub const LOG_FILE: &str = "p.log";
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Config {
    pub qa_file: PathBuf,
    pub pid_file: PathBuf,
    pub log_file: PathBuf,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qa_file: PathBuf::from(QA_FILE),
            pid_file: PathBuf::from(PID_FILE),
            log_file: PathBuf::from(LOG_FILE),
            poll_interval: POLL_INTERVAL,
        }
    }
}
