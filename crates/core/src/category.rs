use serde::{Deserialize, Serialize};

/// Closed set of intent labels the router dispatches on.
///
/// The completion service is instructed to answer with exactly one of the
/// lower-case tokens below (or `other`); anything it returns outside that
/// vocabulary collapses to [`Category::Search`] in one place,
/// [`Category::from_token`], instead of ad-hoc string comparison at call
/// sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SimpleInfo,
    ProductList,
    ProductCheck,
    Faq,
    Price,
    Product,
    Policy,
    Search,
}

impl Category {
    /// Wire token echoed in the `type` field of every handler response.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SimpleInfo => "simple_info",
            Self::ProductList => "product_list",
            Self::ProductCheck => "product_check",
            Self::Faq => "faq",
            Self::Price => "price",
            Self::Product => "product",
            Self::Policy => "policy",
            Self::Search => "search",
        }
    }

    /// Parses a classifier reply. Unrecognized tokens (including `other`)
    /// fall back to `Search`, which is the default handler.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "simple_info" => Self::SimpleInfo,
            "product_list" => Self::ProductList,
            "product_check" => Self::ProductCheck,
            "faq" => Self::Faq,
            "price" => Self::Price,
            "product" => Self::Product,
            "policy" => Self::Policy,
            _ => Self::Search,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
