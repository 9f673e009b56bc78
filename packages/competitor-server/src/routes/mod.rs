// HTTP routes
pub mod analyze;
pub mod health;
pub mod history;
pub mod parse;

pub use analyze::*;
pub use health::*;
pub use history::*;
pub use parse::*;
