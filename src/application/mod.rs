// Series loading and cleaning
pub mod loader;

// Stage orchestration
pub mod pipeline;

// Chart catalog and printable summary
pub mod report;
