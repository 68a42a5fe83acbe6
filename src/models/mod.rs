pub mod user;
pub mod vote;
pub mod work;

pub use user::{Entity as User, Model as UserModel};
pub use vote::{Entity as Vote, Model as VoteModel};
pub use work::{Entity as Work, Model as WorkModel};
