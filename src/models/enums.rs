use std::cmp::Ordering;

use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ViolationType {
    Allergy => "ALLERGY",
    Disease => "DISEASE",
    Dosage => "DOSAGE",
    SpecialPopulation => "SPECIAL_POPULATION",
    Interaction => "INTERACTION",
});

str_enum!(PrescriptionStatus {
    Draft => "DRAFT",
    Issued => "ISSUED",
    Cancelled => "CANCELLED",
});

impl PrescriptionStatus {
    /// Issued and cancelled prescriptions accept no further status change.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Issued | Self::Cancelled)
    }
}

str_enum!(ContraStatus {
    Pass => "PASS",
    Warn => "WARN",
    Fail => "FAIL",
});

impl ContraStatus {
    /// Position in the severity lattice. Ordering and merging go through this
    /// rank, never through declaration order.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Warn => 1,
            Self::Fail => 2,
        }
    }

    /// Least upper bound of two levels: FAIL absorbs everything, WARN absorbs PASS.
    pub fn merge(self, other: Self) -> Self {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }
}

impl Default for ContraStatus {
    fn default() -> Self {
        Self::Pass
    }
}

impl PartialOrd for ContraStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ContraStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn contra_status_total_order() {
        assert!(ContraStatus::Pass < ContraStatus::Warn);
        assert!(ContraStatus::Warn < ContraStatus::Fail);
        assert!(ContraStatus::Pass < ContraStatus::Fail);
    }

    #[test]
    fn merge_is_max_under_rank() {
        use ContraStatus::*;
        let all = [Pass, Warn, Fail];
        for a in all {
            for b in all {
                assert_eq!(a.merge(b), a.max(b), "{a} merge {b}");
                assert_eq!(a.merge(b), b.merge(a));
            }
        }
        assert_eq!(Pass.merge(Pass), Pass);
        assert_eq!(Warn.merge(Pass), Warn);
        assert_eq!(Warn.merge(Fail), Fail);
    }

    #[test]
    fn enum_string_round_trip_uses_wire_names() {
        assert_eq!(ViolationType::SpecialPopulation.as_str(), "SPECIAL_POPULATION");
        assert_eq!(
            ViolationType::from_str("INTERACTION").unwrap(),
            ViolationType::Interaction
        );
        assert_eq!(PrescriptionStatus::from_str("ISSUED").unwrap(), PrescriptionStatus::Issued);
        assert_eq!(ContraStatus::from_str("WARN").unwrap(), ContraStatus::Warn);
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let err = ContraStatus::from_str("warn").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&ContraStatus::Fail).unwrap();
        assert_eq!(json, "\"FAIL\"");
        let parsed: ViolationType = serde_json::from_str("\"DOSAGE\"").unwrap();
        assert_eq!(parsed, ViolationType::Dosage);
    }

    #[test]
    fn final_statuses() {
        assert!(!PrescriptionStatus::Draft.is_final());
        assert!(PrescriptionStatus::Issued.is_final());
        assert!(PrescriptionStatus::Cancelled.is_final());
    }
}
