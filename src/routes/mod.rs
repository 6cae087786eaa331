pub(crate) mod health_check;
mod channel;
mod generation;
mod login;
mod user;
mod video;

pub use health_check::*;
pub use channel::*;
pub use generation::*;
pub use login::*;
pub use user::*;
pub use video::*;
