mod rank;
mod validator;

pub use rank::{UNKNOWN_RANK, rank_of};
pub use validator::TerritorialValidator;
