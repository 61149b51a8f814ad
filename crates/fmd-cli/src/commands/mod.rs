pub mod config;
pub mod fit;
pub mod score;

pub use fit::run_fit;
pub use score::run_score;
