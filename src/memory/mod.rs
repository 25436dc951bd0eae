pub mod confidence;
pub mod decay;
pub mod folders;
pub mod maintenance;
pub mod pattern;
pub mod scoring;
pub mod store;
pub mod tiers;
pub mod types;
