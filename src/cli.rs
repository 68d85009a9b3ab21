use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Short-video feed simulator: scrolls a feed and reports resource usage
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Number of items in the synthetic feed (ignored with --feed)
    #[arg(short = 'n', long = "items", value_name = "N", default_value_t = 100)]
    pub items: usize,

    /// Items per page (overrides config)
    #[arg(short = 'p', long = "page-size", value_name = "N")]
    pub page_size: Option<u32>,

    /// Number of swipes to simulate
    #[arg(short = 's', long = "swipes", value_name = "N", default_value_t = 50)]
    pub swipes: usize,

    /// Fail every Nth media open (0 = never)
    #[arg(long = "fail-every", value_name = "N", default_value_t = 0)]
    pub fail_every: u64,

    /// Serve the feed from a JSON file instead of the synthetic source
    #[arg(short = 'f', long = "feed", value_name = "FILE")]
    pub feed: Option<PathBuf>,

    /// Config file (default: <config dir>/reelfeed.json)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Enable debug logging to file (default: reelfeed.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
