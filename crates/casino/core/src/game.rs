//! Game identifiers and the coarse lifecycle stage shared by every table.

/// The ten supported games.
///
/// The discriminant is the ledger's game id; Casino War state blobs repeat it
/// as their first byte.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum GameType {
    Baccarat = 0,
    Blackjack = 1,
    CasinoWar = 2,
    Craps = 3,
    VideoPoker = 4,
    HiLo = 5,
    Roulette = 6,
    SicBo = 7,
    ThreeCard = 8,
    UltimateHoldem = 9,
}

impl GameType {
    pub const ALL: [GameType; 10] = [
        GameType::Baccarat,
        GameType::Blackjack,
        GameType::CasinoWar,
        GameType::Craps,
        GameType::VideoPoker,
        GameType::HiLo,
        GameType::Roulette,
        GameType::SicBo,
        GameType::ThreeCard,
        GameType::UltimateHoldem,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => GameType::Baccarat,
            1 => GameType::Blackjack,
            2 => GameType::CasinoWar,
            3 => GameType::Craps,
            4 => GameType::VideoPoker,
            5 => GameType::HiLo,
            6 => GameType::Roulette,
            7 => GameType::SicBo,
            8 => GameType::ThreeCard,
            9 => GameType::UltimateHoldem,
            _ => return None,
        })
    }

    /// Human-facing table name.
    pub const fn title(self) -> &'static str {
        match self {
            GameType::Baccarat => "Baccarat",
            GameType::Blackjack => "Blackjack",
            GameType::CasinoWar => "Casino War",
            GameType::Craps => "Craps",
            GameType::VideoPoker => "Video Poker",
            GameType::HiLo => "Hi-Lo",
            GameType::Roulette => "Roulette",
            GameType::SicBo => "Sic Bo",
            GameType::ThreeCard => "Three Card Poker",
            GameType::UltimateHoldem => "Ultimate Texas Hold'em",
        }
    }

    /// Table games where every wager is placed after the session starts, so
    /// the session itself may be opened with a zero stake.
    pub const fn is_wager_table(self) -> bool {
        matches!(
            self,
            GameType::Baccarat | GameType::Craps | GameType::Roulette | GameType::SicBo
        )
    }
}

impl TryFrom<u8> for GameType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_id(value).ok_or(value)
    }
}

/// Coarse lifecycle stage of a table.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    #[default]
    Betting,
    Playing,
    Result,
}
