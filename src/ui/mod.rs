pub mod dashboard;
pub mod footer;
pub mod help;
pub mod theme;
