//! Credit-package plans.
//!
//! Plans are read-only catalog entries fetched from the backend. When the
//! catalog fetch fails, callers fall back to [`default_plans`] so browsing is
//! never blocked on a catalog outage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BillingError, PlanId};

/// What a credit package unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    /// Credits spent unlocking student profiles in the directory.
    StudentProfiles,
    /// Credits spent on essay revisions.
    EssayRevisions,
    /// Bundle covering both profiles and revisions.
    ComboPackage,
}

impl PackageType {
    /// Wire-format string for this package type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StudentProfiles => "student_profiles",
            Self::EssayRevisions => "essay_revisions",
            Self::ComboPackage => "combo_package",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = BillingError;

    /// Parse a backend catalog category.
    ///
    /// The backend has shipped several spellings for the same packages over
    /// time; the aliases below are the ones observed in production payloads.
    /// Anything else is a hard error rather than a silent default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student_profiles" | "profiles" | "student-profiles" => Ok(Self::StudentProfiles),
            "essay_revisions" | "revisions" | "essays" | "essay-revisions" => {
                Ok(Self::EssayRevisions)
            }
            "combo_package" | "combo" | "combo-package" => Ok(Self::ComboPackage),
            other => Err(BillingError::UnknownCategory {
                category: other.to_string(),
            }),
        }
    }
}

/// A purchasable credit package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    /// Catalog identifier.
    pub plan_id: PlanId,

    /// Credits granted on purchase. Always positive.
    pub credits: i64,

    /// Price in minor currency units (cents). Never negative.
    pub price_cents: i64,

    /// ISO currency code (lowercase, e.g. "usd").
    pub currency: String,

    /// Display name.
    pub name: String,

    /// Marketing description.
    pub description: String,

    /// What the package unlocks.
    pub package_type: PackageType,

    /// Number of student profiles unlocked, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles_unlocked: Option<i64>,

    /// Number of essay revisions unlocked, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revisions_unlocked: Option<i64>,

    /// Whether the catalog highlights this plan.
    #[serde(default)]
    pub popular: bool,
}

impl PaymentPlan {
    /// Validate the catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::InvalidPlan`] when `credits <= 0` or
    /// `price_cents < 0`.
    pub fn validate(&self) -> crate::Result<()> {
        if self.credits <= 0 {
            return Err(BillingError::InvalidPlan {
                plan_id: self.plan_id.to_string(),
                reason: format!("credits must be positive, got {}", self.credits),
            });
        }
        if self.price_cents < 0 {
            return Err(BillingError::InvalidPlan {
                plan_id: self.plan_id.to_string(),
                reason: format!("price must not be negative, got {}", self.price_cents),
            });
        }
        Ok(())
    }

    /// Price formatted as dollars, e.g. `"$24.99"`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn price_formatted(&self) -> String {
        format!("${:.2}", self.price_cents as f64 / 100.0)
    }
}

/// The hardcoded fallback catalog used when the plan fetch fails.
///
/// One plan per package type. Keep prices in sync with the backend defaults.
#[must_use]
pub fn default_plans() -> Vec<PaymentPlan> {
    let plan = |id: &str, credits, price_cents, name: &str, description: &str, package_type| {
        PaymentPlan {
            plan_id: PlanId::new(id).expect("default plan ids are non-empty"),
            credits,
            price_cents,
            currency: "usd".to_string(),
            name: name.to_string(),
            description: description.to_string(),
            package_type,
            profiles_unlocked: None,
            revisions_unlocked: None,
            popular: false,
        }
    };

    let mut profiles = plan(
        "profiles-10",
        100,
        999,
        "Profile Pack",
        "Unlock 10 admitted-student profiles",
        PackageType::StudentProfiles,
    );
    profiles.profiles_unlocked = Some(10);

    let mut revisions = plan(
        "revisions-5",
        150,
        1499,
        "Essay Pack",
        "5 in-depth essay revisions",
        PackageType::EssayRevisions,
    );
    revisions.revisions_unlocked = Some(5);

    let mut combo = plan(
        "combo-standard",
        300,
        2499,
        "Combo Pack",
        "10 profiles plus 5 essay revisions",
        PackageType::ComboPackage,
    );
    combo.profiles_unlocked = Some(10);
    combo.revisions_unlocked = Some(5);
    combo.popular = true;

    vec![profiles, revisions, combo]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> PaymentPlan {
        default_plans().remove(0)
    }

    #[test]
    fn package_type_parses_canonical_names() {
        assert_eq!(
            "student_profiles".parse::<PackageType>().unwrap(),
            PackageType::StudentProfiles
        );
        assert_eq!(
            "essay_revisions".parse::<PackageType>().unwrap(),
            PackageType::EssayRevisions
        );
        assert_eq!(
            "combo_package".parse::<PackageType>().unwrap(),
            PackageType::ComboPackage
        );
    }

    #[test]
    fn package_type_parses_backend_aliases() {
        assert_eq!(
            "Profiles".parse::<PackageType>().unwrap(),
            PackageType::StudentProfiles
        );
        assert_eq!(
            "essays".parse::<PackageType>().unwrap(),
            PackageType::EssayRevisions
        );
        assert_eq!(
            "combo".parse::<PackageType>().unwrap(),
            PackageType::ComboPackage
        );
    }

    #[test]
    fn package_type_rejects_unknown_category() {
        let err = "premium_membership".parse::<PackageType>().unwrap_err();
        assert!(matches!(err, BillingError::UnknownCategory { .. }));
    }

    #[test]
    fn validate_accepts_defaults() {
        for plan in default_plans() {
            plan.validate().unwrap();
        }
    }

    #[test]
    fn validate_rejects_zero_credits() {
        let mut plan = sample_plan();
        plan.credits = 0;
        assert!(matches!(
            plan.validate(),
            Err(BillingError::InvalidPlan { .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_price() {
        let mut plan = sample_plan();
        plan.price_cents = -1;
        assert!(matches!(
            plan.validate(),
            Err(BillingError::InvalidPlan { .. })
        ));
    }

    #[test]
    fn price_formatted_renders_dollars() {
        let mut plan = sample_plan();
        plan.price_cents = 2499;
        assert_eq!(plan.price_formatted(), "$24.99");
        plan.price_cents = 0;
        assert_eq!(plan.price_formatted(), "$0.00");
    }

    #[test]
    fn default_catalog_covers_every_package_type() {
        let plans = default_plans();
        assert_eq!(plans.len(), 3);
        for plan in &plans {
            assert!(plan.credits > 0);
            assert!(plan.price_cents > 0);
        }
        let types: std::collections::HashSet<_> =
            plans.iter().map(|p| p.package_type).collect();
        assert_eq!(types.len(), 3);
    }

    #[test]
    fn plan_serde_roundtrip_uses_camel_case() {
        let plan = sample_plan();
        let json = serde_json::to_value(&plan).unwrap();
        assert!(json.get("planId").is_some());
        assert!(json.get("packageType").is_some());
        let parsed: PaymentPlan = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, plan);
    }
}
