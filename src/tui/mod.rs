pub mod app;
pub mod input;
pub mod render;
pub mod task_form;
pub mod theme;

pub use app::run;
