mod demo;
mod read_actions;
mod replay;

pub use demo::Demo;
pub use read_actions::ReadActions;
pub use replay::Replay;

/// How commands render their results on stdout.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per item
    List,
    /// One JSON object per line
    Json,
}
