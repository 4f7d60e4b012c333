use std::io::{self, Stderr};

use clap::{ArgAction, Args};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

#[derive(Args, Clone, Debug)]
pub struct TracingConfig {
    #[arg(
        long,
        short = 'v',
        action = ArgAction::Count,
        global = true,
        help = "Make tracing output more verbose",
    )]
    verbose: u8,
    #[arg(
        long,
        action = ArgAction::Count,
        global = true,
        help = "Make tracing output less verbose",
    )]
    silent: u8,
}

const OFF: i16 = -2;
const ERROR: i16 = -1;
const WARN: i16 = 0;
const INFO: i16 = 1;
const DEBUG: i16 = 2;

const WRITER: fn() -> Stderr = io::stderr;

impl TracingConfig {
    pub fn init(&self) {
        let layer = fmt::layer()
            .compact()
            .with_ansi(false)
            .with_target(self.level() >= DEBUG)
            .with_writer(WRITER)
            .with_filter(self.env_filter());

        tracing_subscriber::registry().with(layer).init();
    }

    /// Warnings only by default; each `-v` adds a level and each `--silent` removes one.
    fn level(&self) -> i16 {
        i16::from(self.verbose).saturating_sub(i16::from(self.silent))
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(self.level_filter().into())
            .from_env_lossy()
    }

    fn level_filter(&self) -> LevelFilter {
        match self.level() {
            level if level <= OFF => LevelFilter::OFF,
            ERROR => LevelFilter::ERROR,
            WARN => LevelFilter::WARN,
            INFO => LevelFilter::INFO,
            DEBUG => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
