pub mod observed;

pub use observed::{MergeOutcome, StateStore, Subscriber};
