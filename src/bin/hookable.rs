use clap::Parser;
use hookable::{config, ChannelRegistry, EventHook, HookResult};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "hookable.json")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> HookResult<()> {
    let config = config::load_or_default(&cli.config)?;
    info!("config loaded.");
    debug!("config: {:?}", config);

    let channel = ChannelRegistry::global().channel::<(usize,)>(config.event_name.clone());
    let delivered = Arc::new(AtomicUsize::new(0));

    // Listeners are registered from several threads at once.
    let mut hooks: Vec<EventHook> = thread::scope(|scope| {
        let workers: Vec<_> = (0..config.threads)
            .map(|worker| {
                let channel = channel.clone();
                let delivered = delivered.clone();
                let listeners = config.listeners;
                scope.spawn(move || {
                    (0..listeners)
                        .map(|n| {
                            let delivered = delivered.clone();
                            channel.register(
                                move |(round,)| {
                                    debug!(round, worker, n, "listener called");
                                    delivered.fetch_add(1, Ordering::Relaxed);
                                },
                                format!("worker-{worker}/listener-{n}"),
                            )
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap_or_default())
            .collect()
    });
    println!(
        "Registered {} listeners on `{}`",
        channel.listener_count(),
        channel.name()
    );

    let first = fire_round(&channel, 1, config.triggers, &delivered)?;
    println!("Round 1: {} deliveries", first);

    if config.release_every > 0 {
        let mut index = 0;
        hooks.retain(|_| {
            index += 1;
            index % config.release_every != 0
        });
    }
    println!("Released hooks, {} listeners left", channel.listener_count());

    let second = fire_round(&channel, 2, config.triggers, &delivered)?;
    println!("Round 2: {} deliveries", second);

    drop(hooks);
    println!("All hooks dropped, {} listeners left", channel.listener_count());
    Ok(())
}

/// Triggers `round` from `triggers` threads concurrently; returns deliveries.
fn fire_round(
    channel: &Arc<hookable::EventChannel<(usize,)>>,
    round: usize,
    triggers: usize,
    delivered: &AtomicUsize,
) -> HookResult<usize> {
    let before = delivered.load(Ordering::Relaxed);
    thread::scope(|scope| {
        let handles: Vec<_> = (0..triggers)
            .map(|_| scope.spawn(|| channel.try_trigger(&(round,))))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Ok(0)))
            .collect::<HookResult<Vec<usize>>>()
    })?;
    Ok(delivered.load(Ordering::Relaxed) - before)
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
