pub mod composer;
pub mod transport;
pub mod unstake_messenger;
pub mod vault;
