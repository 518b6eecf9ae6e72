pub mod assets;
pub mod fal;
pub mod links;
pub mod prompt;
pub mod relay;
pub mod request;
pub mod sanitize;
