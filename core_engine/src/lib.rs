pub mod baker;
pub mod error;
pub mod menu;
pub mod protocol;

pub use baker::{Baker, CHEF_NAME};
pub use error::BakeError;
pub use menu::Menu;
