use poem_openapi::Tags;

pub mod edit;
pub mod health;
pub mod thumb;

#[derive(Tags)]
pub enum ApiTags {
    /// Prompt builder and image relay
    Agape,
    Health,
}
