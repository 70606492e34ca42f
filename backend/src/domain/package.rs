//! Static pricing catalogue: three tiers with fixed attributes.

use serde::{Deserialize, Serialize};

/// How a purchased ad reaches the customer's site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMethod {
    SelfService,
    Automated,
}

/// A purchasable ad package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Price in minor currency units (cents).
    pub price: i64,
    pub features: &'static [&'static str],
    pub delivery_method: DeliveryMethod,
}

/// The full catalogue, in display order.
pub const PACKAGES: [AdPackage; 3] = [
    AdPackage {
        id: "pkg_basic",
        name: "Basic Ad Package",
        description: "Single popup ad with basic targeting",
        price: 49_700,
        features: &[
            "1 Custom Popup Ad",
            "AI-Generated Copy & Design",
            "Basic Targeting",
            "Download Package",
            "30-Day Analytics",
        ],
        delivery_method: DeliveryMethod::SelfService,
    },
    AdPackage {
        id: "pkg_pro",
        name: "Pro Ad Package",
        description: "Multiple ads with automated deployment",
        price: 99_700,
        features: &[
            "3 Custom Popup Ads",
            "AI-Generated Copy & Design",
            "Advanced Targeting",
            "Automated Deployment to Your Site",
            "A/B Testing",
            "90-Day Analytics",
            "Priority Support",
        ],
        delivery_method: DeliveryMethod::Automated,
    },
    AdPackage {
        id: "pkg_enterprise",
        name: "Enterprise Ad Package",
        description: "Unlimited ads with full automation",
        price: 297_000,
        features: &[
            "Unlimited Custom Popup Ads",
            "AI-Generated Copy & Design",
            "Enterprise Targeting",
            "Automated Multi-Site Deployment",
            "A/B Testing",
            "Real-Time Analytics Dashboard",
            "Dedicated Account Manager",
            "Custom Integration",
        ],
        delivery_method: DeliveryMethod::Automated,
    },
];

/// Look up a package by its identifier.
pub fn find_package(id: &str) -> Option<&'static AdPackage> {
    PACKAGES.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn catalogue_has_three_tiers() {
        assert_eq!(PACKAGES.len(), 3);
    }

    #[rstest]
    #[case("pkg_basic", 49_700)]
    #[case("pkg_pro", 99_700)]
    #[case("pkg_enterprise", 297_000)]
    fn prices_match_published_tiers(#[case] id: &str, #[case] price: i64) {
        let package = find_package(id).expect("package exists");
        assert_eq!(package.price, price);
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(find_package("pkg_platinum").is_none());
    }
}
