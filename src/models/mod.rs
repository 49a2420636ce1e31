// Data models matching the frontend request/response shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String")]
pub enum ProductType {
    #[default]
    #[serde(rename = "SaaS")]
    Saas,
    #[serde(rename = "Marketplace")]
    Marketplace,
    #[serde(rename = "E-commerce")]
    Ecommerce,
    #[serde(rename = "Mobile App")]
    MobileApp,
    #[serde(rename = "Hardware")]
    Hardware,
    #[serde(rename = "Services")]
    Services,
    #[serde(rename = "Other")]
    Other,
}

impl ProductType {
    /// Returns all product types in display order
    pub fn all() -> &'static [ProductType] {
        &[
            ProductType::Saas,
            ProductType::Marketplace,
            ProductType::Ecommerce,
            ProductType::MobileApp,
            ProductType::Hardware,
            ProductType::Services,
            ProductType::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Saas => "SaaS",
            ProductType::Marketplace => "Marketplace",
            ProductType::Ecommerce => "E-commerce",
            ProductType::MobileApp => "Mobile App",
            ProductType::Hardware => "Hardware",
            ProductType::Services => "Services",
            ProductType::Other => "Other",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProductType::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "Unknown product type: '{}'. Expected one of: {}",
                    s,
                    join_names(ProductType::all().iter().map(|p| p.as_str()))
                )
            })
    }
}

impl TryFrom<String> for ProductType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String")]
pub enum Stage {
    #[default]
    #[serde(rename = "Pre-revenue")]
    PreRevenue,
    #[serde(rename = "Early revenue")]
    EarlyRevenue,
    #[serde(rename = "Growth")]
    Growth,
    #[serde(rename = "Scale")]
    Scale,
}

impl Stage {
    /// Returns all stages in lifecycle order
    pub fn all() -> &'static [Stage] {
        &[
            Stage::PreRevenue,
            Stage::EarlyRevenue,
            Stage::Growth,
            Stage::Scale,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::PreRevenue => "Pre-revenue",
            Stage::EarlyRevenue => "Early revenue",
            Stage::Growth => "Growth",
            Stage::Scale => "Scale",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Stage::all()
            .iter()
            .copied()
            .find(|st| st.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "Unknown stage: '{}'. Expected one of: {}",
                    s,
                    join_names(Stage::all().iter().map(|st| st.as_str()))
                )
            })
    }
}

impl TryFrom<String> for Stage {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub transcript: String,
    #[serde(default)]
    pub product_type: Option<ProductType>,
    #[serde(default)]
    pub stage: Option<Stage>,
}

/// Successful analysis response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    /// Markdown report, opaque to the server
    pub result: String,
    pub timestamp: DateTime<Utc>,
    pub product_type: ProductType,
    pub stage: Stage,
    pub transcript_length: usize,
}

impl AnalysisResult {
    pub fn new(result: String, product_type: ProductType, stage: Stage, transcript: &str) -> Self {
        Self {
            result,
            timestamp: Utc::now(),
            product_type,
            stage,
            transcript_length: transcript.chars().count(),
        }
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub openai_configured: bool,
}

impl HealthStatus {
    pub fn current(openai_configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            openai_configured,
        }
    }
}
