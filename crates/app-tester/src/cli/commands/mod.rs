//! CLI commands

mod completions;
mod convert;
mod devices;
mod merge;
mod run;
mod slack;
mod split;
mod status;
mod variants;

pub use completions::CompletionsCommand;
pub use convert::ConvertCommand;
pub use devices::DevicesCommand;
pub use merge::MergeCommand;
pub use run::RunCommand;
pub use slack::SlackCommand;
pub use split::SplitCommand;
pub use status::StatusCommand;
pub use variants::VariantsCommand;
