pub mod export;
pub mod grade;
pub mod list;
pub mod simulate;
