//! Closed-set classifications of catalog items.
//!
//! Each classification is a plain enum with a fixed member list. The canonical
//! literal (`as_str`) is the only accepted text form: `FromStr`, `TryFrom<String>`
//! and serde all go through the same table, so an unknown value is rejected at
//! the boundary instead of being stored.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use timberyard_core::ValidationError;

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $literal:literal, code = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Field name reported in validation errors.
            pub const FIELD: &'static str = $field;

            /// Canonical literal (also the persisted form).
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $literal ),+
                }
            }

            /// Short price-list code, used when generating SKUs.
            pub fn code(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $literal => Ok($name::$variant), )+
                    other => {
                        let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        Err(ValidationError::new(
                            $field,
                            format!("unknown value '{other}' (expected one of: {})", allowed.join(", ")),
                        ))
                    }
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }
    };
}

closed_set! {
    /// Species / source of the timber.
    WoodType, field = "wood_type" {
        Baltic => "baltic", code = "BAL",
        Pine => "pine", code = "PIN",
        Oak => "oak", code = "OAK",
        Recycled => "recycled", code = "REC",
        Mixed => "mixed", code = "MIX",
    }
}

closed_set! {
    /// Product category, as laid out in the supplier price list.
    ProductCategory, field = "category" {
        HeavyDutyBox => "heavy_duty_box", code = "HDB",
        Pallet => "pallet", code = "PAL",
        LongTimber => "long_timber", code = "LT",
        ShortTimber => "short_timber", code = "ST",
        PlanedTimber => "planed_timber", code = "PT",
        MachinedTimber => "machined_timber", code = "MT",
        Component => "component", code = "COMP",
        LaminatedTable => "laminated_table", code = "LAM",
        Plywood => "plywood", code = "PLY",
        Custom => "custom", code = "CUST",
    }
}

closed_set! {
    /// Quality tier.
    ProductGrade, field = "grade" {
        AGrade => "a_grade", code = "A",
        BGrade => "b_grade", code = "B",
        Standard => "standard", code = "S",
    }
}

closed_set! {
    /// Surface treatment.
    FinishType, field = "finish" {
        Rough => "rough", code = "RGH",
        /// PBS
        PlanedBothSides => "planed_both_sides", code = "PBS",
        /// PAR
        PlanedAllRound => "planed_all_round", code = "PAR",
        Machined => "machined", code = "MAC",
        Laminated => "laminated", code = "LAM",
        Raw => "raw", code = "RAW",
    }
}

impl WoodType {
    /// Human-readable label used in generated item names.
    pub fn label(self) -> &'static str {
        match self {
            WoodType::Baltic => "Baltic",
            WoodType::Pine => "Pine",
            WoodType::Oak => "Oak",
            WoodType::Recycled => "Recycled",
            WoodType::Mixed => "Mixed",
        }
    }
}
