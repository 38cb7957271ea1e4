use crate::chess::{Promotion, Square};
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};

/// A chess move.
///
/// Two moves between the same squares are distinct if their [`Promotion`]s differ.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Constructor, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[display(fmt = "{}{}{}", whence, whither, promotion)]
#[serde(deny_unknown_fields)]
pub struct Move {
    #[serde(rename = "start")]
    whence: Square,
    #[serde(rename = "end")]
    whither: Square,
    #[serde(default)]
    promotion: Promotion,
}

impl Move {
    /// The source [`Square`].
    pub fn whence(&self) -> Square {
        self.whence
    }

    /// The destination [`Square`].
    pub fn whither(&self) -> Square {
        self.whither
    }

    /// The [`Promotion`] specifier.
    pub fn promotion(&self) -> Promotion {
        self.promotion
    }

    /// Whether this move promotes a pawn.
    pub fn is_promotion(&self) -> bool {
        self.promotion != Promotion::None
    }
}
