use thiserror::Error;

pub const CHOOSE_A_PANCAKE: &str = "please choose a pancake!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BakeError {
    #[error("{message}")]
    InvalidArgument { selector: i32, message: String },
}

impl BakeError {
    pub fn choose_a_pancake(selector: i32) -> Self {
        BakeError::InvalidArgument {
            selector,
            message: CHOOSE_A_PANCAKE.to_string(),
        }
    }
}
