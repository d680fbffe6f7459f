pub mod athletes;
pub mod groups;
pub mod schedule;
