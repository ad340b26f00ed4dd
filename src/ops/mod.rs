pub mod estimates;
pub mod gantt;
pub mod prd;
pub mod task_tree;
