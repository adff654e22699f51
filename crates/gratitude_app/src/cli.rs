use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use gratitude_core::{entry::Mood, DateKey};

#[derive(Debug, Parser)]
#[command(name = "gratitude", about = "A daily gratitude journal")]
pub struct Cli {
    /// Journal directory (overrides GRATITUDE_ROOT).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Daily goal for this invocation only.
    #[arg(long, global = true)]
    pub goal: Option<i64>,

    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Today's statements, progress and streak.
    Today,
    Show {
        date: DateKey,
    },
    Add {
        text: String,
        #[arg(long)]
        mood: Option<Mood>,
        #[arg(long)]
        date: Option<DateKey>,
    },
    /// Statements are numbered from 1.
    Edit {
        index: usize,
        text: String,
        #[arg(long)]
        date: Option<DateKey>,
    },
    Delete {
        index: usize,
        #[arg(long)]
        date: Option<DateKey>,
    },
    Mood {
        index: usize,
        /// Omit to clear the mood.
        mood: Option<Mood>,
        #[arg(long)]
        date: Option<DateKey>,
    },
    Streak,
    Calendar {
        /// YYYY-MM, defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        select: Option<DateKey>,
    },
    Prompt {
        #[arg(long, default_value_t = 1)]
        taps: usize,
    },
    History {
        #[arg(long, default_value_t = 7)]
        limit: usize,
    },
    /// Store a new daily goal in the profile.
    Goal {
        value: i64,
    },
    Varied {
        state: Toggle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}
