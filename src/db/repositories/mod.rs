pub mod sessions;
pub mod snapshots;
pub mod test_results;
