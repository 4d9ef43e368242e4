//! SKU generation for items that arrive without one.

use crate::classification::{ProductCategory, ProductGrade};
use crate::plank::{Dimensions, NewWoodPlank};

/// Build the conventional SKU `<CATEGORY>-<GRADE>-<T>x<W>x<L>`.
///
/// Example: a long A-grade timber of 23 x 100 x 2500 becomes `LT-A-23x100x2500`.
pub fn generate_sku(category: ProductCategory, grade: ProductGrade, dims: Dimensions) -> String {
    format!(
        "{}-{}-{}x{}x{}",
        category.code(),
        grade.code(),
        dims.thickness_mm,
        dims.width_mm,
        dims.length_mm
    )
}

impl NewWoodPlank {
    /// The candidate's SKU, or a generated one if it is blank.
    pub fn sku_or_generated(&self) -> String {
        let sku = self.sku.trim();
        if !sku.is_empty() {
            return sku.to_string();
        }
        generate_sku(self.category, self.grade, self.dimensions())
    }

    /// Fill in a generated SKU when none was given.
    pub fn with_generated_sku(mut self) -> Self {
        self.sku = self.sku_or_generated();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{FinishType, WoodType};
    use rust_decimal_macros::dec;

    fn candidate(sku: &str) -> NewWoodPlank {
        NewWoodPlank {
            sku: sku.to_string(),
            name: "23 x 100 x 2500 Baltic".to_string(),
            category: ProductCategory::LongTimber,
            wood_type: WoodType::Baltic,
            grade: ProductGrade::AGrade,
            finish: FinishType::Rough,
            thickness_mm: 23,
            width_mm: 100,
            length_mm: 2500,
            price: dec!(40),
            stock_quantity: 0,
            unit_of_measure: "EA".to_string(),
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn generates_category_grade_and_dimensions() {
        assert_eq!(candidate("").sku_or_generated(), "LT-A-23x100x2500");
        assert_eq!(candidate("  ").with_generated_sku().sku, "LT-A-23x100x2500");
    }

    #[test]
    fn keeps_an_explicit_sku() {
        assert_eq!(candidate(" CUSTOM-1 ").sku_or_generated(), "CUSTOM-1");
    }

    #[test]
    fn standard_grade_pallets() {
        let sku = generate_sku(
            ProductCategory::Pallet,
            ProductGrade::Standard,
            Dimensions::new(1200, 1000, 150),
        );
        assert_eq!(sku, "PAL-S-1200x1000x150");
    }
}
