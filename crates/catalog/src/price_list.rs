//! Supplier price-list parsing.
//!
//! The price list is plain text split into sections by header lines
//! (`PALLETS`, `A GRADE LONG TIMBERS`, ...). Each product line below a header
//! reads like `23 X 100 X 2500 BALTIC EA R40`: three dimensions separated by
//! `X`, a wood type, a unit, and a rand price. The section decides category,
//! grade and (mostly) finish.

use core::str::FromStr;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::classification::{FinishType, ProductCategory, ProductGrade, WoodType};
use crate::plank::{DEFAULT_UNIT_OF_MEASURE, NewWoodPlank};

/// Stock assigned to imported items.
pub const IMPORTED_STOCK_QUANTITY: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    HeavyDutyBoxes,
    Pallets,
    AGradeLongTimbers,
    BGradeLongTimbers,
    AGradeShortTimbers,
    BGradeShortTimbers,
    PlanedBothSides,
    PlanedAllRound,
    MachinedTimbers,
    ShortBalticComponents,
    LaminatedBaltic,
    Plywood,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        let header = line.trim().to_uppercase();
        let section = match header.as_str() {
            "HEAVY DUTY WOODEN BOXES" => Section::HeavyDutyBoxes,
            "PALLETS" => Section::Pallets,
            "A GRADE LONG TIMBERS" => Section::AGradeLongTimbers,
            "B GRADE LONG TIMBERS" => Section::BGradeLongTimbers,
            "A GRADE SHORT TIMBERS" => Section::AGradeShortTimbers,
            "B GRADE SHORT TIMBERS" => Section::BGradeShortTimbers,
            "PLANED BOTH SIDES" => Section::PlanedBothSides,
            "PLANED ALL ROUND" => Section::PlanedAllRound,
            "MACHINED TIMBERS" => Section::MachinedTimbers,
            "SHORT BALTIC COMPONENTS" => Section::ShortBalticComponents,
            "LAMINATED BALTIC TABLE AND SHELVES TO ORDER" => Section::LaminatedBaltic,
            "INT/EXTERIOR PLYWOOD" | "INTERIOR PLYWOOD" => Section::Plywood,
            _ => return None,
        };
        Some(section)
    }

    fn category_and_grade(self) -> (ProductCategory, ProductGrade) {
        use ProductCategory as C;
        use ProductGrade as G;
        match self {
            Section::HeavyDutyBoxes => (C::HeavyDutyBox, G::Standard),
            Section::Pallets => (C::Pallet, G::Standard),
            Section::AGradeLongTimbers => (C::LongTimber, G::AGrade),
            Section::BGradeLongTimbers => (C::LongTimber, G::BGrade),
            Section::AGradeShortTimbers => (C::ShortTimber, G::AGrade),
            Section::BGradeShortTimbers => (C::ShortTimber, G::BGrade),
            Section::PlanedBothSides | Section::PlanedAllRound => (C::PlanedTimber, G::Standard),
            Section::MachinedTimbers => (C::MachinedTimber, G::Standard),
            Section::ShortBalticComponents => (C::Component, G::Standard),
            Section::LaminatedBaltic => (C::LaminatedTable, G::Standard),
            Section::Plywood => (C::Plywood, G::Standard),
        }
    }

    fn finish(self, tokens: &[&str]) -> FinishType {
        match self {
            Section::PlanedBothSides => FinishType::PlanedBothSides,
            Section::PlanedAllRound => FinishType::PlanedAllRound,
            Section::MachinedTimbers => FinishType::Machined,
            Section::LaminatedBaltic => FinishType::Laminated,
            _ if has_token(tokens, "PAR") => FinishType::PlanedAllRound,
            _ if has_token(tokens, "PBS") => FinishType::PlanedBothSides,
            _ => FinishType::Rough,
        }
    }
}

/// A line that looked like a product but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    pub line: String,
}

/// Result of parsing a whole price list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceList {
    pub items: Vec<NewWoodPlank>,
    pub skipped: Vec<SkippedLine>,
}

/// Parse a full price list. SKUs are generated for every item.
pub fn parse_price_list(text: &str) -> PriceList {
    let mut list = PriceList::default();
    let mut section = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(next) = Section::from_header(line) {
            debug!(line_number = idx + 1, section = ?next, "price list section");
            section = Some(next);
            continue;
        }
        let Some(current) = section else {
            continue;
        };
        // Lines without a dimension separator are notes, not products.
        if !line.contains(['X', 'x']) {
            continue;
        }
        match parse_line(line, current) {
            Some(item) => list.items.push(item.with_generated_sku()),
            None => {
                warn!(line_number = idx + 1, line, "could not parse price list line");
                list.skipped.push(SkippedLine {
                    line_number: idx + 1,
                    line: line.to_string(),
                });
            }
        }
    }

    debug!(
        items = list.items.len(),
        skipped = list.skipped.len(),
        "parsed price list"
    );
    list
}

/// Parse a standalone description such as `23 X 100 X 2500 BALTIC EA R40`.
///
/// Without a section header the category is inferred from keywords and
/// length (over 2000mm is long timber), and the grade from a `B` token.
pub fn parse_description(desc: &str) -> Option<NewWoodPlank> {
    let tokens: Vec<&str> = desc.split_whitespace().collect();
    let (thickness_mm, width_mm, length_mm) = parse_dimensions(&tokens)?;
    let price = parse_price(&tokens)?;
    let upper = desc.to_uppercase();

    let category = if upper.contains("PALLET") {
        ProductCategory::Pallet
    } else if upper.contains("BOX") {
        ProductCategory::HeavyDutyBox
    } else if upper.contains("PLYWOOD") {
        ProductCategory::Plywood
    } else if length_mm > 2000 {
        ProductCategory::LongTimber
    } else {
        ProductCategory::ShortTimber
    };
    let grade = if has_token(&tokens, "B") {
        ProductGrade::BGrade
    } else {
        ProductGrade::AGrade
    };
    let finish = if has_token(&tokens, "PAR") {
        FinishType::PlanedAllRound
    } else if has_token(&tokens, "PBS") {
        FinishType::PlanedBothSides
    } else if upper.contains("MACHINED") {
        FinishType::Machined
    } else if upper.contains("LAMINATED") {
        FinishType::Laminated
    } else {
        FinishType::Rough
    };

    let wood_type = wood_type_of(&tokens);
    Some(
        NewWoodPlank {
            sku: String::new(),
            name: format!("{thickness_mm} x {width_mm} x {length_mm} {}", wood_type.label()),
            category,
            wood_type,
            grade,
            finish,
            thickness_mm,
            width_mm,
            length_mm,
            price,
            stock_quantity: IMPORTED_STOCK_QUANTITY,
            unit_of_measure: DEFAULT_UNIT_OF_MEASURE.to_string(),
            description: Some(desc.trim().to_string()),
            image_url: None,
        }
        .with_generated_sku(),
    )
}

fn parse_line(line: &str, section: Section) -> Option<NewWoodPlank> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (thickness_mm, width_mm, length_mm) = parse_dimensions(&tokens)?;
    let price = parse_price(&tokens)?;
    let (category, grade) = section.category_and_grade();
    let wood_type = wood_type_of(&tokens);

    Some(NewWoodPlank {
        sku: String::new(),
        name: format!("{thickness_mm} x {width_mm} x {length_mm} {}", wood_type.label()),
        category,
        wood_type,
        grade,
        finish: section.finish(&tokens),
        thickness_mm,
        width_mm,
        length_mm,
        price,
        stock_quantity: IMPORTED_STOCK_QUANTITY,
        unit_of_measure: DEFAULT_UNIT_OF_MEASURE.to_string(),
        description: Some(line.to_string()),
        image_url: None,
    })
}

/// `T X W X L` at the start of the line.
fn parse_dimensions(tokens: &[&str]) -> Option<(i32, i32, i32)> {
    if tokens.len() < 6 {
        return None;
    }
    if !tokens[1].eq_ignore_ascii_case("x") || !tokens[3].eq_ignore_ascii_case("x") {
        return None;
    }
    let t = tokens[0].parse().ok()?;
    let w = tokens[2].parse().ok()?;
    let l = tokens[4].parse().ok()?;
    Some((t, w, l))
}

/// Last `R<amount>` token, e.g. `R40`, `R1,250` or `R12.50`.
fn parse_price(tokens: &[&str]) -> Option<Decimal> {
    tokens.iter().rev().find_map(|token| {
        let amount = token.strip_prefix('R').or_else(|| token.strip_prefix('r'))?;
        Decimal::from_str(&amount.replace(',', "")).ok()
    })
}

fn wood_type_of(tokens: &[&str]) -> WoodType {
    if has_token(tokens, "BALTIC") {
        WoodType::Baltic
    } else if has_token(tokens, "PINE") {
        WoodType::Pine
    } else if has_token(tokens, "OAK") {
        WoodType::Oak
    } else if has_token(tokens, "RECYCLED") {
        WoodType::Recycled
    } else {
        WoodType::Mixed
    }
}

fn has_token(tokens: &[&str], needle: &str) -> bool {
    tokens.iter().any(|t| t.eq_ignore_ascii_case(needle))
}
