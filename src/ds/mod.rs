//! Internal data structures shared by the cache core and its policies.

pub mod bloom;
pub mod counting_bloom;
pub mod mixer;
pub mod slot_arena;
pub mod slot_list;

pub use bloom::BloomFilter;
pub use counting_bloom::CountingBloomFilter;
pub use mixer::HashMixer;
pub use slot_arena::{SlotArena, SlotId};
pub use slot_list::SlotList;
