pub mod brute_force;
pub mod common;
pub mod mass;
pub mod search;
pub mod shard;
