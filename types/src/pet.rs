//! Pet snapshot copied into a case at creation time.

use serde::{Deserialize, Serialize};

/// A copy of the listing's pet details, taken when the case was opened.
///
/// It is not a live reference: later edits to the source listing do not
/// change what the case shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSnapshot {
    pub name: String,
    /// Species or type, e.g. "dog".
    pub species: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub last_known_location: Option<String>,
}
