pub mod bundler;
pub mod combine;
pub mod config;
pub mod dirs;
pub mod error;
pub mod orchestrator;
pub mod scanner;
pub mod sink;
pub mod source;
pub mod util;

pub use bundler::{Bundle, Bundler};
pub use config::Config;
pub use error::{PersistError, ReadError};
pub use scanner::ScanMode;
