use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Closed set of wire strings with a designated fallback variant.
///
/// Deserialization never fails on an unknown or missing string; it lands on
/// the fallback instead.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident (fallback = $fallback:ident) {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_wire(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn from_wire(raw: &str) -> Self {
                let raw = raw.trim();
                $(
                    if raw.eq_ignore_ascii_case($wire) {
                        return $name::$variant;
                    }
                )+
                $name::$fallback
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$fallback
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_wire())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Option::<String>::deserialize(deserializer)?;
                Ok(raw.as_deref().map(Self::from_wire).unwrap_or_default())
            }
        }
    };
}

/// Display accent for a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Affirmative,
    Cautionary,
    Negative,
    Neutral,
}

wire_enum! {
    /// Product category accepted by the analysis service.
    Category (fallback = Timber) {
        Timber => "timber",
        Paper => "paper",
        Furniture => "furniture",
        Textiles => "textiles",
        Food => "food",
        Agriculture => "agriculture",
        Cosmetics => "cosmetics",
        PersonalCare => "personal care",
        Packaging => "packaging",
        WildlifeProducts => "wildlife products",
        ExoticMaterials => "exotic materials",
        Leather => "leather",
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().replace(['-', '_'], " ");
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_wire().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                let choices = Category::ALL
                    .iter()
                    .map(|category| category.as_wire())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("unknown category '{raw}' (expected one of: {choices})")
            })
    }
}

wire_enum! {
    /// Final categorical outcome of an analysis.
    Verdict (fallback = ReviewRequired) {
        Verified => "VERIFIED",
        ReviewRequired => "REVIEW_REQUIRED",
        Greenwashed => "GREENWASHED",
    }
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Verified => "Verified",
            Verdict::ReviewRequired => "Review Required",
            Verdict::Greenwashed => "Greenwashed",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Verdict::Verified => Tone::Affirmative,
            Verdict::ReviewRequired => Tone::Cautionary,
            Verdict::Greenwashed => Tone::Negative,
        }
    }
}

wire_enum! {
    /// Outcome of checking one claimed certificate against the registry.
    CertStatus (fallback = NotFound) {
        Verified => "VERIFIED",
        NotFound => "NOT_FOUND",
        Expired => "EXPIRED",
        ScopeMismatch => "SCOPE_MISMATCH",
    }
}

impl CertStatus {
    pub fn label(self) -> &'static str {
        match self {
            CertStatus::Verified => "Verified",
            CertStatus::NotFound => "Not found",
            CertStatus::Expired => "Expired",
            CertStatus::ScopeMismatch => "Scope mismatch",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            CertStatus::Verified => Tone::Affirmative,
            CertStatus::ScopeMismatch => Tone::Cautionary,
            CertStatus::NotFound | CertStatus::Expired => Tone::Negative,
        }
    }
}

wire_enum! {
    /// Seller recidivism level reported on the regulator dashboard.
    AlertLevel (fallback = Low) {
        High => "HIGH",
        Medium => "MEDIUM",
        Low => "LOW",
    }
}

impl AlertLevel {
    pub fn tone(self) -> Tone {
        match self {
            AlertLevel::High => Tone::Negative,
            AlertLevel::Medium => Tone::Cautionary,
            AlertLevel::Low => Tone::Neutral,
        }
    }
}

wire_enum! {
    /// Marketplace ranking change attached to a verdict.
    VisibilityAction (fallback = Hold) {
        Boost => "BOOST",
        Demote => "DEMOTE",
        Hold => "HOLD",
    }
}

impl VisibilityAction {
    pub fn tone(self) -> Tone {
        match self {
            VisibilityAction::Boost => Tone::Affirmative,
            VisibilityAction::Demote => Tone::Negative,
            VisibilityAction::Hold => Tone::Cautionary,
        }
    }
}

wire_enum! {
    /// Likelihood that the submitted copy was machine generated.
    AiRiskTier (fallback = Low) {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

impl AiRiskTier {
    pub fn tone(self) -> Tone {
        match self {
            AiRiskTier::Low => Tone::Neutral,
            AiRiskTier::Medium => Tone::Cautionary,
            AiRiskTier::High => Tone::Negative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    CompanyName,
    ProductTitle,
    ProductDescription,
}

impl RequiredField {
    pub fn label(self) -> &'static str {
        match self {
            RequiredField::CompanyName => "Company name",
            RequiredField::ProductTitle => "Product title",
            RequiredField::ProductDescription => "Product description",
        }
    }
}

/// Product record submitted for full analysis. Serializes to the `/analyze`
/// request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSubmission {
    pub company_name: String,
    pub product_title: String,
    pub product_description: String,
    #[serde(default)]
    pub product_category: Category,
    #[serde(default)]
    pub claimed_certifications: Vec<String>,
}

impl ProductSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = [
            (RequiredField::CompanyName, &self.company_name),
            (RequiredField::ProductTitle, &self.product_title),
            (RequiredField::ProductDescription, &self.product_description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(missing))
        }
    }
}
