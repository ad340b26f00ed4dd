pub mod config;
pub mod gantt;
pub mod member;
pub mod project;
pub mod task;

pub use config::*;
pub use gantt::*;
pub use member::*;
pub use project::*;
pub use task::*;
