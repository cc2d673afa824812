use serde::{Deserialize, Serialize};

use crate::{GalleryError, GalleryResult};

/// The closed set of gallery categories.
///
/// Both the filename codec and upload validation consume this single
/// definition; category strings never appear outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Architecture,
    Watercolors,
    Sketches,
    NativePlants,
    Vegetables,
    Beekeeping,
    MeadMaking,
    Furniture,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Architecture,
        Category::Watercolors,
        Category::Sketches,
        Category::NativePlants,
        Category::Vegetables,
        Category::Beekeeping,
        Category::MeadMaking,
        Category::Furniture,
    ];

    /// Category assumed when a blob path carries no recognizable token.
    pub const FALLBACK: Category = Category::Sketches;

    /// The dash form used in blob paths and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Architecture => "architecture",
            Category::Watercolors => "watercolors",
            Category::Sketches => "sketches",
            Category::NativePlants => "native-plants",
            Category::Vegetables => "vegetables",
            Category::Beekeeping => "beekeeping",
            Category::MeadMaking => "mead-making",
            Category::Furniture => "furniture",
        }
    }

    /// Look up a category by its dash form
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == token)
    }

    /// Parse a category, rejecting anything outside the set
    pub fn parse(token: &str) -> GalleryResult<Self> {
        Self::from_token(token)
            .ok_or_else(|| GalleryError::invalid(format!("Unknown category: {token}")))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
