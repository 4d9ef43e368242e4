//! Catalog domain module.
//!
//! This crate contains the wood-plank catalog model and its rules, implemented
//! purely as deterministic domain logic (no IO, no storage): the closed-set
//! classifications, the item shapes used for create/update, field validation,
//! SKU generation, and parsing of the supplier price list.

pub mod classification;
pub mod plank;
pub mod price_list;
pub mod sku;
pub mod validation;

pub use classification::{FinishType, ProductCategory, ProductGrade, WoodType};
pub use plank::{
    DEFAULT_UNIT_OF_MEASURE, Dimensions, NewWoodPlank, PRICE_SCALE, WoodPlank, WoodPlankPatch,
    normalize_price,
};
pub use price_list::{PriceList, SkippedLine, parse_description, parse_price_list};
pub use sku::generate_sku;
pub use validation::{validate, validate_patch, validate_plank, violations};
