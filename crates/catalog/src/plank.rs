use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use timberyard_core::{Entity, PlankId, ValueObject};

use crate::classification::{FinishType, ProductCategory, ProductGrade, WoodType};

/// Unit of measure applied when none is given.
pub const DEFAULT_UNIT_OF_MEASURE: &str = "EA";

/// Number of fractional digits every stored price carries.
pub const PRICE_SCALE: u32 = 2;

fn default_unit_of_measure() -> String {
    DEFAULT_UNIT_OF_MEASURE.to_string()
}

/// A sellable catalog item as persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoodPlank {
    pub id: PlankId,
    pub sku: String,
    pub name: String,
    pub category: ProductCategory,
    pub wood_type: WoodType,
    pub grade: ProductGrade,
    pub finish: FinishType,
    pub thickness_mm: i32,
    pub width_mm: i32,
    pub length_mm: i32,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub unit_of_measure: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate for a new catalog item (no identity or timestamps yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWoodPlank {
    pub sku: String,
    pub name: String,
    pub category: ProductCategory,
    pub wood_type: WoodType,
    pub grade: ProductGrade,
    pub finish: FinishType,
    pub thickness_mm: i32,
    pub width_mm: i32,
    pub length_mm: i32,
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_unit_of_measure")]
    pub unit_of_measure: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial update. Absent fields are left untouched.
///
/// `description` and `image_url` are doubly optional: `Some(None)` clears the
/// stored value. In JSON an absent key is `None` and an explicit `null` is
/// `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WoodPlankPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub wood_type: Option<WoodType>,
    pub grade: Option<ProductGrade>,
    pub finish: Option<FinishType>,
    pub thickness_mm: Option<i32>,
    pub width_mm: Option<i32>,
    pub length_mm: Option<i32>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub unit_of_measure: Option<String>,
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
}

/// Only called when the key is present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Physical size of a plank in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub thickness_mm: i32,
    pub width_mm: i32,
    pub length_mm: i32,
}

impl ValueObject for Dimensions {}

impl Dimensions {
    pub fn new(thickness_mm: i32, width_mm: i32, length_mm: i32) -> Self {
        Self {
            thickness_mm,
            width_mm,
            length_mm,
        }
    }

    /// Volume in cubic millimetres. Widened to `i64`: a 50 x 300 x 6000 beam
    /// already exceeds `i32`.
    pub fn volume_mm3(&self) -> i64 {
        i64::from(self.thickness_mm) * i64::from(self.width_mm) * i64::from(self.length_mm)
    }

    /// Total surface area in square millimetres.
    pub fn surface_area_mm2(&self) -> i64 {
        let (t, w, l) = (
            i64::from(self.thickness_mm),
            i64::from(self.width_mm),
            i64::from(self.length_mm),
        );
        2 * (l * w + l * t + w * t)
    }
}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} x {} x {}", self.thickness_mm, self.width_mm, self.length_mm)
    }
}

impl Entity for WoodPlank {
    type Id = PlankId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl WoodPlank {
    /// Materialise a validated candidate as a stored item.
    pub fn from_new(id: PlankId, new: NewWoodPlank, now: DateTime<Utc>) -> Self {
        Self {
            id,
            sku: new.sku,
            name: new.name,
            category: new.category,
            wood_type: new.wood_type,
            grade: new.grade,
            finish: new.finish,
            thickness_mm: new.thickness_mm,
            width_mm: new.width_mm,
            length_mm: new.length_mm,
            price: new.price,
            stock_quantity: new.stock_quantity,
            unit_of_measure: new.unit_of_measure,
            description: new.description,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.thickness_mm, self.width_mm, self.length_mm)
    }

    /// Price with currency, e.g. `"R 40.00"`.
    pub fn price_label(&self) -> String {
        format!("R {}", normalize_price(self.price))
    }

    /// Refresh `updated_at` as part of a mutation.
    ///
    /// The new value is strictly later than the previous one even when the
    /// wall clock has not advanced (or went backwards).
    pub fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = if now > floor { now } else { floor };
    }

    /// Apply the present fields of `patch`, leaving everything else untouched.
    ///
    /// Does not validate and does not touch `updated_at`; callers do both.
    pub fn apply_patch(&mut self, patch: &WoodPlankPatch) {
        if let Some(sku) = &patch.sku {
            self.sku = sku.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(wood_type) = patch.wood_type {
            self.wood_type = wood_type;
        }
        if let Some(grade) = patch.grade {
            self.grade = grade;
        }
        if let Some(finish) = patch.finish {
            self.finish = finish;
        }
        if let Some(v) = patch.thickness_mm {
            self.thickness_mm = v;
        }
        if let Some(v) = patch.width_mm {
            self.width_mm = v;
        }
        if let Some(v) = patch.length_mm {
            self.length_mm = v;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(qty) = patch.stock_quantity {
            self.stock_quantity = qty;
        }
        if let Some(uom) = &patch.unit_of_measure {
            self.unit_of_measure = uom.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = image_url.clone();
        }
    }
}

impl NewWoodPlank {
    /// Canonical form stored by the catalog: trimmed text fields and a price
    /// carrying exactly two fractional digits.
    pub fn normalized(mut self) -> Self {
        self.sku = self.sku.trim().to_string();
        self.name = self.name.trim().to_string();
        self.unit_of_measure = self.unit_of_measure.trim().to_string();
        self.price = normalize_price(self.price);
        self
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.thickness_mm, self.width_mm, self.length_mm)
    }
}

impl WoodPlankPatch {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        *self == WoodPlankPatch::default()
    }

    /// Same normalisation as [`NewWoodPlank::normalized`], restricted to the
    /// present fields.
    pub fn normalized(mut self) -> Self {
        if let Some(sku) = self.sku.as_mut() {
            *sku = sku.trim().to_string();
        }
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
        }
        if let Some(uom) = self.unit_of_measure.as_mut() {
            *uom = uom.trim().to_string();
        }
        self.price = self.price.map(normalize_price);
        self
    }
}

/// Rescale a (validated) price to the stored precision.
pub fn normalize_price(price: Decimal) -> Decimal {
    let mut p = price.round_dp(PRICE_SCALE);
    p.rescale(PRICE_SCALE);
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_new() -> NewWoodPlank {
        NewWoodPlank {
            sku: "  LT-A-23x100x2500 ".to_string(),
            name: " 23 x 100 x 2500 Baltic".to_string(),
            category: ProductCategory::LongTimber,
            wood_type: WoodType::Baltic,
            grade: ProductGrade::AGrade,
            finish: FinishType::Rough,
            thickness_mm: 23,
            width_mm: 100,
            length_mm: 2500,
            price: dec!(40),
            stock_quantity: 10,
            unit_of_measure: DEFAULT_UNIT_OF_MEASURE.to_string(),
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn normalized_trims_and_rescales() {
        let n = sample_new().normalized();
        assert_eq!(n.sku, "LT-A-23x100x2500");
        assert_eq!(n.name, "23 x 100 x 2500 Baltic");
        assert_eq!(n.price.to_string(), "40.00");
    }

    #[test]
    fn dimensions_volume_and_display() {
        let d = sample_new().dimensions();
        assert_eq!(d.to_string(), "23 x 100 x 2500");
        assert_eq!(d.volume_mm3(), 5_750_000);
        assert_eq!(d.surface_area_mm2(), 2 * (250_000 + 57_500 + 2_300));
    }

    #[test]
    fn large_beams_do_not_overflow_volume() {
        let d = Dimensions::new(300, 300, 60_000);
        assert_eq!(d.volume_mm3(), 5_400_000_000);
    }

    #[test]
    fn touch_is_strictly_increasing_even_with_a_stale_clock() {
        let now = Utc::now();
        let mut plank = WoodPlank::from_new(PlankId::new(), sample_new().normalized(), now);
        let before = plank.updated_at;

        plank.touch(now - Duration::seconds(10));
        assert!(plank.updated_at > before);
        assert_eq!(plank.created_at, now);

        let later = now + Duration::seconds(5);
        plank.touch(later);
        assert_eq!(plank.updated_at, later);
    }

    #[test]
    fn apply_patch_only_changes_present_fields() {
        let now = Utc::now();
        let mut plank = WoodPlank::from_new(PlankId::new(), sample_new().normalized(), now);
        plank.description = Some("old".to_string());
        let original = plank.clone();

        plank.apply_patch(&WoodPlankPatch {
            price: Some(dec!(150.00)),
            description: Some(None),
            ..Default::default()
        });

        assert_eq!(plank.price, dec!(150.00));
        assert_eq!(plank.description, None);
        assert_eq!(plank.sku, original.sku);
        assert_eq!(plank.stock_quantity, original.stock_quantity);
        assert_eq!(plank.updated_at, original.updated_at);
    }

    #[test]
    fn patch_emptiness() {
        assert!(WoodPlankPatch::default().is_empty());
        let p = WoodPlankPatch {
            name: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!p.is_empty());
    }

    #[test]
    fn new_plank_defaults_when_deserialised() {
        let json = r#"{
            "sku": "OAK-001",
            "name": "Oak board",
            "category": "short_timber",
            "wood_type": "oak",
            "grade": "standard",
            "finish": "raw",
            "thickness_mm": 20,
            "width_mm": 150,
            "length_mm": 1200,
            "price": "99.5"
        }"#;
        let n: NewWoodPlank = serde_json::from_str(json).unwrap();
        assert_eq!(n.stock_quantity, 0);
        assert_eq!(n.unit_of_measure, "EA");
        assert_eq!(n.description, None);
    }

    #[test]
    fn price_label_has_currency_and_two_decimals() {
        let plank = WoodPlank::from_new(PlankId::new(), sample_new().normalized(), Utc::now());
        assert_eq!(plank.price_label(), "R 40.00");
    }

    #[test]
    fn explicit_null_clears_while_absent_keeps() {
        let clear: WoodPlankPatch = serde_json::from_str(r#"{ "description": null }"#).unwrap();
        assert_eq!(clear.description, Some(None));
        assert_eq!(clear.image_url, None);
        assert!(!clear.is_empty());

        let keep: WoodPlankPatch = serde_json::from_str("{}").unwrap();
        assert!(keep.is_empty());

        let set: WoodPlankPatch =
            serde_json::from_str(r#"{ "image_url": "https://example.com/oak.jpg" }"#).unwrap();
        assert_eq!(
            set.image_url,
            Some(Some("https://example.com/oak.jpg".to_string()))
        );
    }

    #[test]
    fn patch_survives_json_without_losing_a_clear() {
        let patch = WoodPlankPatch {
            price: Some(dec!(12.50)),
            description: Some(None),
            image_url: Some(Some("https://example.com/oak.jpg".to_string())),
            ..Default::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        let back: WoodPlankPatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, patch);

        let mut plank = WoodPlank::from_new(PlankId::new(), sample_new().normalized(), Utc::now());
        plank.description = Some("to be removed".to_string());
        plank.apply_patch(&back);
        assert_eq!(plank.description, None);
    }
}
