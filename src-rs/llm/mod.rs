pub mod models;
pub mod notebook;
pub mod prompts;
pub mod router;
pub mod utils;
