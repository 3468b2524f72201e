mod login;

pub use login::{LoginHandler, PlayerLogin};
