use super::request::Sku;

pub const BOTTLE_WITH_CAP_600ML: &str = "https://sendmelab.com/itag/gpts/bottle_with_cap.png";
pub const BOTTLE_WITHOUT_CAP_600ML: &str =
    "https://sendmelab.com/itag/gpts/bottle_without_cap.png";
pub const BOTTLE_SMALL_335ML: &str = "https://sendmelab.com/itag/gpts/Bottle-Small.png";

/// Product image handed to the edit model for a given variant.
///
/// The 335ml bottle only exists with a cap, so `has_cap` is ignored for it.
pub fn resolve(sku: Sku, has_cap: bool) -> &'static str {
    match (sku, has_cap) {
        (Sku::Ml335, _) => BOTTLE_SMALL_335ML,
        (Sku::Ml600, true) => BOTTLE_WITH_CAP_600ML,
        (Sku::Ml600, false) => BOTTLE_WITHOUT_CAP_600ML,
    }
}
