pub mod composer;
pub mod unstake_messenger;
pub mod vault;
