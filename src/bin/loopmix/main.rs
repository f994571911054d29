//! loopmix - play the four-channel console through the default output device
//!
//! Run with: cargo run -- [--seconds N] [--device NAME] [--solo ID] [--verbose]
//! Log levels follow RUST_LOG when it is set.

use std::{
    io::Write,
    time::{Duration, Instant},
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use loopmix::{
    default_catalog,
    engine::CpalBackend,
    mixer::{ChannelId, Session},
    MixerConfig,
};

#[derive(Parser)]
#[command(name = "loopmix")]
#[command(about = "Play the four-channel loop console", long_about = None)]
struct Args {
    /// Stop after this many seconds (default: play until the transport stops)
    #[arg(short, long)]
    seconds: Option<u64>,

    /// Output device name (default: the host's default device)
    #[arg(short, long)]
    device: Option<String>,

    /// Solo this channel id
    #[arg(long)]
    solo: Option<ChannelId>,

    /// Log at debug level when RUST_LOG is not set
    #[arg(short, long)]
    verbose: bool,
}

fn meter(level: f32) -> String {
    let filled = (level / 10.0).round() as usize;
    format!("{:<10}", "#".repeat(filled.min(10)))
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let default_directive = if args.verbose { "loopmix=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut backend = CpalBackend::new();
    if let Some(name) = &args.device {
        backend = backend.with_device(name.clone());
    }

    let catalog = default_catalog();
    let mut session = Session::new(&catalog, MixerConfig::default(), Box::new(backend))
        .wrap_err("failed to create session")?;
    if let Some(id) = args.solo {
        session.set_channel_solo(id, true)?;
    }

    println!("=== loopmix ===");
    for channel in &catalog {
        println!("  {:>2}  {:<8} ({})", channel.id, channel.name, channel.instrument);
    }
    println!("Playing... Press Ctrl+C to stop");
    println!();

    session.play().wrap_err("failed to start playback")?;

    let started = Instant::now();
    let mut last = Instant::now();
    loop {
        std::thread::sleep(Duration::from_millis(100));
        let now = Instant::now();
        let transport = session.advance(now - last);
        last = now;

        let mut line = String::new();
        for channel in &catalog {
            let level = session.get_channel_level(channel.id)?;
            line.push_str(&format!("{} [{}] ", channel.name, meter(level)));
        }
        let (left, right) = session.get_master_levels();
        print!(
            "\r{line}| L [{}] R [{}] | {:>3}s",
            meter(left),
            meter(right),
            transport.elapsed_seconds
        );
        std::io::stdout().flush()?;

        let expired = args
            .seconds
            .is_some_and(|limit| started.elapsed() >= Duration::from_secs(limit));
        if !transport.is_playing || expired {
            break;
        }
    }

    println!();
    session.stop();
    session.close();
    Ok(())
}
