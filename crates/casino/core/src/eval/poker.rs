//! Poker hand ranking for the poker-derived tables.
//!
//! Values compare naturally: a higher [`HandValue`] wins, with kickers
//! breaking ties inside a category.
use arrayvec::ArrayVec;

use crate::card::Card;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PokerCategory {
    #[strum(serialize = "High Card")]
    HighCard,
    #[strum(serialize = "Pair")]
    Pair,
    #[strum(serialize = "Two Pair")]
    TwoPair,
    #[strum(serialize = "Three of a Kind")]
    ThreeOfAKind,
    #[strum(serialize = "Straight")]
    Straight,
    #[strum(serialize = "Flush")]
    Flush,
    #[strum(serialize = "Full House")]
    FullHouse,
    #[strum(serialize = "Four of a Kind")]
    FourOfAKind,
    #[strum(serialize = "Straight Flush")]
    StraightFlush,
    #[strum(serialize = "Royal Flush")]
    RoyalFlush,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandValue {
    pub category: PokerCategory,
    /// Tie-break values (ace = 14), most significant first.
    pub ranks: ArrayVec<u8, 5>,
}

pub fn evaluate_five(cards: [Card; 5]) -> HandValue {
    let mut values = cards.map(|card| card.rank().high_value());
    values.sort_unstable_by(|a, b| b.cmp(a));

    let flush = cards.iter().all(|card| card.suit() == cards[0].suit());
    let straight = straight_high(&values);

    if let (true, Some(high)) = (flush, straight) {
        let category = if high == 14 {
            PokerCategory::RoyalFlush
        } else {
            PokerCategory::StraightFlush
        };
        return HandValue {
            category,
            ranks: ArrayVec::from_iter([high]),
        };
    }

    let groups = group_by_count(&values);
    let ranks: ArrayVec<u8, 5> = groups.iter().map(|&(_, value)| value).collect();
    let category = match (groups[0].0, groups.get(1).map(|g| g.0)) {
        (4, _) => PokerCategory::FourOfAKind,
        (3, Some(2)) => PokerCategory::FullHouse,
        _ if flush => PokerCategory::Flush,
        _ if straight.is_some() => PokerCategory::Straight,
        (3, _) => PokerCategory::ThreeOfAKind,
        (2, Some(2)) => PokerCategory::TwoPair,
        (2, _) => PokerCategory::Pair,
        _ => PokerCategory::HighCard,
    };

    match (category, straight) {
        (PokerCategory::Straight, Some(high)) => HandValue {
            category,
            ranks: ArrayVec::from_iter([high]),
        },
        (PokerCategory::Flush, _) => HandValue {
            category,
            ranks: ArrayVec::from(values),
        },
        _ => HandValue { category, ranks },
    }
}

/// Best five-card hand out of five to seven cards.
pub fn best_hand(cards: &[Card]) -> Option<HandValue> {
    if !(5..=7).contains(&cards.len()) {
        return None;
    }
    let mut best: Option<HandValue> = None;
    for mask in 0u32..(1 << cards.len()) {
        if mask.count_ones() != 5 {
            continue;
        }
        let hand: ArrayVec<Card, 5> = cards
            .iter()
            .enumerate()
            .filter(|(idx, _)| mask & (1 << idx) != 0)
            .map(|(_, card)| *card)
            .collect();
        if let Ok(hand) = hand.into_inner() {
            let value = evaluate_five(hand);
            if best.as_ref().is_none_or(|current| value > *current) {
                best = Some(value);
            }
        }
    }
    best
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThreeCardCategory {
    #[strum(serialize = "High Card")]
    HighCard,
    #[strum(serialize = "Pair")]
    Pair,
    #[strum(serialize = "Flush")]
    Flush,
    #[strum(serialize = "Straight")]
    Straight,
    #[strum(serialize = "Three of a Kind")]
    ThreeOfAKind,
    #[strum(serialize = "Straight Flush")]
    StraightFlush,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreeCardValue {
    pub category: ThreeCardCategory,
    pub ranks: ArrayVec<u8, 3>,
}

impl ThreeCardValue {
    /// Dealer needs queen-high or better to open.
    pub fn dealer_qualifies(&self) -> bool {
        self.category > ThreeCardCategory::HighCard || self.ranks.first().is_some_and(|&r| r >= 12)
    }
}

pub fn evaluate_three(cards: [Card; 3]) -> ThreeCardValue {
    let mut values = cards.map(|card| card.rank().high_value());
    values.sort_unstable_by(|a, b| b.cmp(a));

    let flush = cards.iter().all(|card| card.suit() == cards[0].suit());
    let distinct = values[0] != values[1] && values[1] != values[2];
    let straight = if !distinct {
        None
    } else if values[0] - values[2] == 2 {
        Some(values[0])
    } else if values == [14, 3, 2] {
        Some(3)
    } else {
        None
    };

    let groups = group_by_count(&values);
    let (category, ranks): (ThreeCardCategory, ArrayVec<u8, 3>) = match (groups[0].0, straight) {
        (3, _) => (ThreeCardCategory::ThreeOfAKind, ArrayVec::from_iter([values[0]])),
        (_, Some(high)) if flush => (ThreeCardCategory::StraightFlush, ArrayVec::from_iter([high])),
        (_, Some(high)) => (ThreeCardCategory::Straight, ArrayVec::from_iter([high])),
        _ if flush => (ThreeCardCategory::Flush, ArrayVec::from(values)),
        (2, _) => (
            ThreeCardCategory::Pair,
            groups.iter().map(|&(_, value)| value).collect(),
        ),
        _ => (ThreeCardCategory::HighCard, ArrayVec::from(values)),
    };
    ThreeCardValue { category, ranks }
}

fn straight_high(sorted_desc: &[u8; 5]) -> Option<u8> {
    let distinct = sorted_desc.windows(2).all(|pair| pair[0] != pair[1]);
    if !distinct {
        return None;
    }
    if sorted_desc[0] - sorted_desc[4] == 4 {
        Some(sorted_desc[0])
    } else if *sorted_desc == [14, 5, 4, 3, 2] {
        Some(5)
    } else {
        None
    }
}

/// `(count, value)` pairs, larger groups first, then higher values.
fn group_by_count(sorted_desc: &[u8]) -> ArrayVec<(u8, u8), 5> {
    let mut groups: ArrayVec<(u8, u8), 5> = ArrayVec::new();
    for &value in sorted_desc {
        match groups.iter_mut().find(|(_, v)| *v == value) {
            Some(group) => group.0 += 1,
            None => groups.push((1, value)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards<const N: usize>(values: [u8; N]) -> [Card; N] {
        values.map(|v| Card::new(v).unwrap())
    }

    #[test]
    fn ranks_five_card_categories() {
        // A♠ K♠ Q♠ J♠ 10♠
        assert_eq!(
            evaluate_five(cards([0, 12, 11, 10, 9])).category,
            PokerCategory::RoyalFlush
        );
        // 5♠ 4♥ 3♦ 2♣ A♠ (wheel)
        let wheel = evaluate_five(cards([4, 16, 28, 40, 0]));
        assert_eq!(wheel.category, PokerCategory::Straight);
        assert_eq!(wheel.ranks.as_slice(), &[5]);
        // K♠ K♥ K♦ 2♣ 2♠
        assert_eq!(
            evaluate_five(cards([12, 25, 38, 40, 1])).category,
            PokerCategory::FullHouse
        );
        // 9♠ 9♥ 4♦ 4♣ A♠
        let two_pair = evaluate_five(cards([8, 21, 29, 42, 0]));
        assert_eq!(two_pair.category, PokerCategory::TwoPair);
        assert_eq!(two_pair.ranks.as_slice(), &[9, 4, 14]);
    }

    #[test]
    fn kickers_break_ties() {
        // Pair of 8s with ace kicker beats pair of 8s with king kicker.
        let ace_kicker = evaluate_five(cards([7, 20, 0, 3, 5]));
        let king_kicker = evaluate_five(cards([33, 46, 12, 2, 4]));
        assert_eq!(ace_kicker.category, PokerCategory::Pair);
        assert!(ace_kicker > king_kicker);
    }

    #[test]
    fn best_of_seven_finds_flush() {
        // Five hearts among seven cards.
        let seven = cards([13, 15, 17, 20, 23, 0, 26]);
        let best = best_hand(&seven).unwrap();
        assert_eq!(best.category, PokerCategory::Flush);
        assert!(best_hand(&seven[..4]).is_none());
    }

    #[test]
    fn three_card_ordering() {
        // A-2-3 is the lowest straight.
        let low_straight = evaluate_three(cards([0, 14, 28]));
        assert_eq!(low_straight.category, ThreeCardCategory::Straight);
        assert_eq!(low_straight.ranks.as_slice(), &[3]);

        let trips = evaluate_three(cards([5, 18, 31]));
        assert!(trips > low_straight);

        // Q-7-3 offsuit qualifies, J-9-3 does not.
        assert!(evaluate_three(cards([11, 19, 28])).dealer_qualifies());
        assert!(!evaluate_three(cards([10, 21, 28])).dealer_qualifies());
    }
}
