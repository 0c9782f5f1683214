use std::time::Duration;

use aesaccel::accel::backend::{StdClock, StdDelay};
use aesaccel::kat::{self, KnownAnswer};
use aesaccel::sim::SimAccelerator;
use aesaccel::{AccelDriver, Ciphertext, DriverConfig, Key, Plaintext, Report};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "accel_cli", version = "1.0")]
/// Run one block through the (simulated) encryption accelerator and check it
struct Args {
    /// Known-answer vector supplying defaults for key, plaintext and expected ciphertext
    #[arg(long, value_enum, default_value_t = Vector::Fips197B)]
    vector: Vector,

    /// Key as 32 hex digits
    #[arg(long)]
    key: Option<String>,

    /// Plaintext as 32 hex digits
    #[arg(long)]
    plaintext: Option<String>,

    /// Expected ciphertext as 32 hex digits
    #[arg(long)]
    expected: Option<String>,

    /// Give up waiting for DONE after this many milliseconds
    #[arg(long, default_value_t = 100)]
    timeout_ms: u64,

    /// Sleep between DONE polls, in microseconds
    #[arg(long, default_value_t = 10)]
    poll_interval_us: u64,

    /// Double the poll interval after every poll, up to 1 ms
    #[arg(long)]
    backoff: bool,

    /// Filler byte sent while reading the ciphertext
    #[arg(long, value_parser = parse_byte, default_value = "0x00")]
    dummy_byte: u8,

    /// Polls the simulated accelerator answers with DONE low
    #[arg(long, default_value_t = 0)]
    done_latency: u32,

    /// Simulate an accelerator that never raises DONE
    #[arg(long)]
    never_done: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum Vector {
    /// FIPS-197 Appendix B
    #[value(name = "fips197-b")]
    Fips197B,
    /// FIPS-197 Appendix C.1
    #[value(name = "fips197-c1")]
    Fips197C1,
}

impl Vector {
    fn known_answer(self) -> KnownAnswer {
        match self {
            Self::Fips197B => kat::FIPS197_APPENDIX_B,
            Self::Fips197C1 => kat::FIPS197_APPENDIX_C1,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn parse_byte(text: &str) -> Result<u8, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid byte {text:?}: {e}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    simple_logger::init_with_level(args.log_level.into())?;

    let vector = args.vector.known_answer();
    let key = match &args.key {
        Some(hex) => Key::from_hex(hex).context("--key")?,
        None => vector.key,
    };
    let plaintext = match &args.plaintext {
        Some(hex) => Plaintext::from_hex(hex).context("--plaintext")?,
        None => vector.plaintext,
    };
    let expected = match &args.expected {
        Some(hex) => Ciphertext::from_hex(hex).context("--expected")?,
        None => vector.ciphertext,
    };

    let mut config = DriverConfig::default()
        .with_done_timeout(Duration::from_millis(args.timeout_ms))
        .with_poll_interval(Duration::from_micros(args.poll_interval_us))
        .with_dummy_byte(args.dummy_byte);
    if args.backoff {
        config = config.with_backoff(Duration::from_millis(1));
    }

    let sim = if args.never_done {
        SimAccelerator::new().never_done()
    } else {
        SimAccelerator::new().with_done_latency(args.done_latency)
    };

    log::info!("Running {} on simulated accelerator", vector.name);
    let mut accel = AccelDriver::with_config(sim, StdDelay, config).with_clock(StdClock::new());
    let computed = accel
        .encrypt(&key, &plaintext)
        .context("Encryption failed")?;

    println!("{}", Report::new(key, plaintext, computed, expected));

    Ok(())
}
