//! Field-level validation of catalog items.
//!
//! Checks are pure and never mutate their input. Every entry point walks the
//! fields in declaration order, so the first violation reported for a given
//! input is always the same one.
//!
//! Classification fields are not checked here: their types only admit members
//! of the closed sets, and text is rejected while parsing (see
//! [`crate::classification`]).

use rust_decimal::Decimal;

use timberyard_core::ValidationError;

use crate::plank::{NewWoodPlank, PRICE_SCALE, WoodPlank, WoodPlankPatch};

/// Longest accepted SKU (matches the persisted column width).
pub const MAX_SKU_LEN: usize = 64;

/// Longest accepted unit of measure (matches the persisted column width).
pub const MAX_UNIT_OF_MEASURE_LEN: usize = 8;

/// Validate a create candidate, returning the first violation.
pub fn validate(candidate: &NewWoodPlank) -> Result<(), ValidationError> {
    first(violations(candidate))
}

/// Every violation in a create candidate.
pub fn violations(candidate: &NewWoodPlank) -> Vec<ValidationError> {
    collect(FieldView {
        sku: Some(&candidate.sku),
        name: Some(&candidate.name),
        thickness_mm: Some(candidate.thickness_mm),
        width_mm: Some(candidate.width_mm),
        length_mm: Some(candidate.length_mm),
        price: Some(candidate.price),
        stock_quantity: Some(candidate.stock_quantity),
        unit_of_measure: Some(&candidate.unit_of_measure),
    })
}

/// Validate a stored (or merged) item, returning the first violation.
pub fn validate_plank(plank: &WoodPlank) -> Result<(), ValidationError> {
    first(collect(FieldView {
        sku: Some(&plank.sku),
        name: Some(&plank.name),
        thickness_mm: Some(plank.thickness_mm),
        width_mm: Some(plank.width_mm),
        length_mm: Some(plank.length_mm),
        price: Some(plank.price),
        stock_quantity: Some(plank.stock_quantity),
        unit_of_measure: Some(&plank.unit_of_measure),
    }))
}

/// Validate only the fields present in a patch.
pub fn validate_patch(patch: &WoodPlankPatch) -> Result<(), ValidationError> {
    first(collect(FieldView {
        sku: patch.sku.as_deref(),
        name: patch.name.as_deref(),
        thickness_mm: patch.thickness_mm,
        width_mm: patch.width_mm,
        length_mm: patch.length_mm,
        price: patch.price,
        stock_quantity: patch.stock_quantity,
        unit_of_measure: patch.unit_of_measure.as_deref(),
    }))
}

/// Stock quantity bound on its own (used by stock adjustments).
pub fn check_stock_quantity(quantity: i64) -> Result<i32, ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::new("stock_quantity", "cannot be negative"));
    }
    i32::try_from(quantity)
        .map_err(|_| ValidationError::new("stock_quantity", format!("exceeds {}", i32::MAX)))
}

/// Borrowed view over the validated fields; `None` means "not supplied".
struct FieldView<'a> {
    sku: Option<&'a str>,
    name: Option<&'a str>,
    thickness_mm: Option<i32>,
    width_mm: Option<i32>,
    length_mm: Option<i32>,
    price: Option<Decimal>,
    stock_quantity: Option<i32>,
    unit_of_measure: Option<&'a str>,
}

fn collect(view: FieldView<'_>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(sku) = view.sku {
        let sku = sku.trim();
        if sku.is_empty() {
            errors.push(ValidationError::new("sku", "cannot be empty"));
        } else if sku.chars().count() > MAX_SKU_LEN {
            errors.push(ValidationError::new(
                "sku",
                format!("cannot be longer than {MAX_SKU_LEN} characters"),
            ));
        }
    }

    if let Some(name) = view.name {
        if name.trim().is_empty() {
            errors.push(ValidationError::new("name", "cannot be empty"));
        }
    }

    for (field, value) in [
        ("thickness_mm", view.thickness_mm),
        ("width_mm", view.width_mm),
        ("length_mm", view.length_mm),
    ] {
        if let Some(v) = value {
            if v <= 0 {
                errors.push(ValidationError::new(
                    field,
                    format!("must be greater than 0 (got {v})"),
                ));
            }
        }
    }

    if let Some(price) = view.price {
        if price < Decimal::ZERO {
            errors.push(ValidationError::new(
                "price",
                format!("cannot be negative (got {price})"),
            ));
        } else if price.normalize().scale() > PRICE_SCALE {
            errors.push(ValidationError::new(
                "price",
                format!("at most {PRICE_SCALE} decimal places allowed (got {price})"),
            ));
        }
    }

    if let Some(qty) = view.stock_quantity {
        if qty < 0 {
            errors.push(ValidationError::new(
                "stock_quantity",
                format!("cannot be negative (got {qty})"),
            ));
        }
    }

    if let Some(uom) = view.unit_of_measure {
        let uom = uom.trim();
        if uom.is_empty() {
            errors.push(ValidationError::new("unit_of_measure", "cannot be empty"));
        } else if uom.chars().count() > MAX_UNIT_OF_MEASURE_LEN {
            errors.push(ValidationError::new(
                "unit_of_measure",
                format!("cannot be longer than {MAX_UNIT_OF_MEASURE_LEN} characters"),
            ));
        }
    }

    errors
}

fn first(errors: Vec<ValidationError>) -> Result<(), ValidationError> {
    match errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
