pub mod action;
pub mod table;

pub use action::XpAction;
pub use table::RewardTable;
