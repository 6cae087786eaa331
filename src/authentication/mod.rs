mod password;
mod token;

pub use password::*;
pub use token::*;
