use crate::chess::Role;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// A promotion specifier.
#[derive(
    Debug, Display, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(try_from = "Option<Role>", into = "Option<Role>")]
pub enum Promotion {
    #[display(fmt = "")]
    None,
    #[display(fmt = "n")]
    Knight,
    #[display(fmt = "b")]
    Bishop,
    #[display(fmt = "r")]
    Rook,
    #[display(fmt = "q")]
    Queen,
}

impl Promotion {
    /// Every piece type a pawn may promote to.
    pub const CHOICES: [Promotion; 4] = [
        Promotion::Bishop,
        Promotion::Knight,
        Promotion::Queen,
        Promotion::Rook,
    ];
}

impl Default for Promotion {
    fn default() -> Self {
        Promotion::None
    }
}

impl From<Promotion> for Option<Role> {
    fn from(p: Promotion) -> Self {
        match p {
            Promotion::None => None,
            Promotion::Knight => Some(Role::Knight),
            Promotion::Bishop => Some(Role::Bishop),
            Promotion::Rook => Some(Role::Rook),
            Promotion::Queen => Some(Role::Queen),
        }
    }
}

/// The reason why a [`Role`] is not a valid [`Promotion`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "pawns cannot promote to `{}`", _0)]
pub struct InvalidPromotion(#[error(not(source))] pub Role);

impl TryFrom<Option<Role>> for Promotion {
    type Error = InvalidPromotion;

    fn try_from(r: Option<Role>) -> Result<Self, Self::Error> {
        match r {
            None => Ok(Promotion::None),
            Some(Role::Knight) => Ok(Promotion::Knight),
            Some(Role::Bishop) => Ok(Promotion::Bishop),
            Some(Role::Rook) => Ok(Promotion::Rook),
            Some(Role::Queen) => Ok(Promotion::Queen),
            Some(r @ Role::Pawn) | Some(r @ Role::King) => Err(InvalidPromotion(r)),
        }
    }
}
