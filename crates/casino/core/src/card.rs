//! Card encoding shared by every card game.
//!
//! A card is a single byte `0..52`: `suit = value / 13`, `rank = value % 13`
//! with rank 0 being the ace. `0xFF` marks a face-down card.
use std::fmt;

/// Byte used on the wire for a face-down card.
pub const HIDDEN_CARD: u8 = 0xFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Suit {
    #[strum(serialize = "♠")]
    Spades,
    #[strum(serialize = "♥")]
    Hearts,
    #[strum(serialize = "♦")]
    Diamonds,
    #[strum(serialize = "♣")]
    Clubs,
}

impl Suit {
    pub const fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

/// Card rank, ordered ace-low (wire order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Rank {
    Ace = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    const ORDER: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Poker value: two is 2, ace is 14.
    pub const fn high_value(self) -> u8 {
        match self {
            Rank::Ace => 14,
            other => other as u8 + 1,
        }
    }

    /// Face value with ace low and court cards worth their position (J=11).
    pub const fn pip_value(self) -> u8 {
        self as u8 + 1
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

/// A face-up card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Card(u8);

impl Card {
    pub const fn new(value: u8) -> Option<Self> {
        if value < 52 { Some(Self(value)) } else { None }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn rank(self) -> Rank {
        Rank::ORDER[(self.0 % 13) as usize]
    }

    pub const fn suit(self) -> Suit {
        match self.0 / 13 {
            0 => Suit::Spades,
            1 => Suit::Hearts,
            2 => Suit::Diamonds,
            _ => Suit::Clubs,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank().symbol(), self.suit())
    }
}

/// A card position on the table, possibly face-down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardSlot {
    Hidden,
    Revealed(Card),
}

impl CardSlot {
    /// Returns `None` for bytes that are neither a card nor the hidden marker.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        if byte == HIDDEN_CARD {
            return Some(CardSlot::Hidden);
        }
        match Card::new(byte) {
            Some(card) => Some(CardSlot::Revealed(card)),
            None => None,
        }
    }

    pub const fn to_byte(self) -> u8 {
        match self {
            CardSlot::Hidden => HIDDEN_CARD,
            CardSlot::Revealed(card) => card.value(),
        }
    }

    pub const fn card(self) -> Option<Card> {
        match self {
            CardSlot::Hidden => None,
            CardSlot::Revealed(card) => Some(card),
        }
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self, CardSlot::Hidden)
    }
}

impl fmt::Display for CardSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardSlot::Hidden => f.write_str("??"),
            CardSlot::Revealed(card) => card.fmt(f),
        }
    }
}

/// Revealed cards only, in order.
pub fn revealed(slots: &[CardSlot]) -> Vec<Card> {
    slots.iter().filter_map(|slot| slot.card()).collect()
}
