use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reelfeed::cache_store::JsonFileCache;
use reelfeed::cli::Args;
use reelfeed::config::{self, FeedConfig};
use reelfeed::core::{
    FeedController, HandleStatus, HandleStatusEvent, InlinePool, PaginationState, Workers,
};
use reelfeed::downcast_event;
use reelfeed::entities::{CacheStore, DataSource, PlaybackEngine, WorkerPool};
use reelfeed::sim::{JsonFileSource, SimulatedEngine, SyntheticSource};

/// Upper bound for background work to land after one UI step
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

fn init_logging(args: &Args, path_config: &config::PathConfig) -> anyhow::Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));

        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Respects RUST_LOG if set
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

/// Drain the event queue, returning how many items fell back to thumbnails.
fn drain_events(feed: &FeedController) -> usize {
    feed.bus()
        .poll()
        .iter()
        .filter_map(|e| downcast_event::<HandleStatusEvent>(e))
        .filter(|e| {
            if let HandleStatus::Failed { message } = &e.status {
                debug!("Item {} shows thumbnail: {}", e.index, message);
                true
            } else {
                false
            }
        })
        .count()
}

/// Pump until nothing is in flight. Returns false on timeout.
fn settle(feed: &mut FeedController) -> bool {
    let deadline = Instant::now() + SETTLE_TIMEOUT;
    loop {
        feed.pump();
        if !feed.pagination_state().is_loading() && !feed.window().has_pending_inits() {
            return true;
        }
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }
    init_logging(&args, &path_config)?;

    info!("reelfeed simulator starting...");
    debug!("Command-line args: {:?}", args);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config::config_file(config::CONFIG_FILE, &path_config));
    let mut feed_config = FeedConfig::load_or_default(&config_path)?;
    if let Some(page_size) = args.page_size {
        feed_config.page_size = page_size;
    }
    feed_config.validate()?;
    info!("Config: {:?}", feed_config);

    let source: Arc<dyn DataSource> = match &args.feed {
        Some(path) => Arc::new(JsonFileSource::open(path)?),
        None => Arc::new(SyntheticSource::new(args.items).with_latency(Duration::from_millis(2))),
    };
    let engine = Arc::new(SimulatedEngine::new().with_fail_every(args.fail_every));
    let pool: Arc<dyn WorkerPool> = if feed_config.workers == 0 {
        Arc::new(InlinePool)
    } else {
        Arc::new(Workers::new(feed_config.workers).context("Failed to spawn worker threads")?)
    };
    let cache_path = feed_config
        .cache_file
        .clone()
        .unwrap_or_else(|| config::data_file(config::CACHE_FILE, &path_config));
    let cache: Arc<dyn CacheStore> = Arc::new(JsonFileCache::new(cache_path));

    let mut feed = FeedController::new(
        source,
        Arc::clone(&engine) as Arc<dyn PlaybackEngine>,
        Arc::clone(&pool),
        &feed_config,
    )
    .with_cache(cache);

    match feed.warm_start() {
        Ok(n) => info!("Warm start: {} cached items", n),
        Err(e) => warn!("Warm start skipped: {:#}", e),
    }

    feed.start();
    if !settle(&mut feed) {
        warn!("Initial load did not settle in {:?}", SETTLE_TIMEOUT);
    }

    let mut swipes = 0;
    let mut peak_handles = 0;
    let mut retries = 0;
    let mut thumbnails = drain_events(&feed);
    while swipes < args.swipes {
        if let PaginationState::Failed { message, .. } = feed.pagination_state() {
            warn!("Page fetch failed: {}, retrying", message);
            retries += 1;
            feed.retry();
            settle(&mut feed);
            thumbnails += drain_events(&feed);
            continue;
        }

        let len = feed.items().len();
        let Some(current) = feed.current_index() else {
            break;
        };
        // Mostly forward, every 7th swipe goes back one
        let next = if swipes % 7 == 6 {
            current.saturating_sub(1)
        } else {
            current + 1
        };
        if next >= len {
            info!("End of feed at item {}", current);
            break;
        }

        feed.on_visibility_changed(current, 0.0);
        feed.on_index_changed(next);
        feed.on_visibility_changed(next, 1.0);
        if swipes % 5 == 4 {
            feed.begin_speed_hold(next);
            feed.end_speed_hold(next);
        }
        peak_handles = peak_handles.max(feed.window().live_indices().len());

        if !settle(&mut feed) {
            warn!("Swipe {} did not settle in {:?}", swipes, SETTLE_TIMEOUT);
        }
        thumbnails += drain_events(&feed);
        swipes += 1;
    }

    let items_loaded = feed.items().len();
    let final_index = feed.current_index();
    let window_stats = feed.window().stats();
    feed.teardown();
    drop(feed);
    // Joins workers so every in-flight open has been released
    drop(pool);

    let engine_stats = engine.stats();
    println!("Swipes:          {}", swipes);
    println!("Items loaded:    {}", items_loaded);
    println!("Final index:     {:?}", final_index);
    println!("Fetch retries:   {}", retries);
    println!("Peak handles:    {}", peak_handles);
    println!("Thumbnails:      {}", thumbnails);
    println!("Window:          {:?}", window_stats);
    println!("Engine:          {:?}", engine_stats);

    if engine_stats.live != 0 {
        anyhow::bail!("{} media resources leaked", engine_stats.live);
    }
    Ok(())
}
