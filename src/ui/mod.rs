pub mod output;
pub mod progress;
pub mod signals;

pub use output::{format_currency, OutputFormatter, OutputMode, NO_DATA_MESSAGE};
pub use progress::ProgressManager;
pub use signals::GracefulShutdown;
