//! Text helpers shared by the view model and message log.
use casino_core::{CardSlot, GameType, Wager, wager_label};
use client_blockchain_core::Modifier;
use runtime::ModifierView;

/// Chip amount with thousands separators, e.g. `1,350`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// Net result with an explicit sign; zero carries none.
pub fn format_signed(net: i64) -> String {
    let magnitude = format_amount(net.unsigned_abs());
    match net.signum() {
        1 => format!("+{magnitude}"),
        -1 => format!("-{magnitude}"),
        _ => magnitude,
    }
}

pub fn format_balance(balance: Option<u64>) -> String {
    balance.map_or_else(|| "-".to_string(), format_amount)
}

/// Space separated cards, `??` for face-down ones, `-` when none are dealt.
pub fn format_cards(slots: &[CardSlot]) -> String {
    if slots.is_empty() {
        return "-".to_string();
    }
    slots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Dice faces with their total, e.g. `3-4 (7)`.
pub fn format_dice(dice: &[u8]) -> String {
    let faces = dice
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-");
    let total: u32 = dice.iter().map(|&die| u32::from(die)).sum();
    format!("{faces} ({total})")
}

pub fn format_wager(game: GameType, wager: &Wager) -> String {
    let mut text = format!("{} {}", wager_label(game, wager), format_amount(wager.amount));
    if wager.secondary_amount > 0 {
        text.push_str(&format!(" + odds {}", format_amount(wager.secondary_amount)));
    }
    text
}

pub fn modifier_title(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Shield => "Shield",
        Modifier::Double => "Double",
    }
}

/// `Shield on`, `Double off (pending)`.
pub fn format_modifier(modifier: Modifier, view: ModifierView) -> String {
    let state = if view.enabled { "on" } else { "off" };
    if view.tentative {
        format!("{} {state} (pending)", modifier_title(modifier))
    } else {
        format!("{} {state}", modifier_title(modifier))
    }
}

#[cfg(test)]
mod tests {
    use casino_core::Card;

    use super::*;

    #[test]
    fn amounts_group_thousands() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1_350), "1,350");
        assert_eq!(format_amount(12_345_678), "12,345,678");
    }

    #[test]
    fn signed_amounts() {
        assert_eq!(format_signed(350), "+350");
        assert_eq!(format_signed(-1_000), "-1,000");
        assert_eq!(format_signed(0), "0");
        assert_eq!(format_signed(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn cards_and_dice() {
        let slots = [
            CardSlot::Revealed(Card::new(12).expect("king of spades")),
            CardSlot::Hidden,
        ];
        assert_eq!(format_cards(&slots), "K♠ ??");
        assert_eq!(format_cards(&[]), "-");
        assert_eq!(format_dice(&[3, 4]), "3-4 (7)");
        assert_eq!(format_dice(&[6, 6, 6]), "6-6-6 (18)");
    }

    #[test]
    fn wagers_use_table_labels() {
        let red = Wager::confirmed(1, 0, 1_500);
        assert_eq!(format_wager(GameType::Roulette, &red), "Red 1,500");

        let mut pass = Wager::confirmed(0, 0, 10);
        pass.secondary_amount = 20;
        assert_eq!(format_wager(GameType::Craps, &pass), "Pass 10 + odds 20");
    }

    #[test]
    fn modifier_states() {
        let pending = ModifierView {
            enabled: true,
            tentative: true,
        };
        assert_eq!(
            format_modifier(Modifier::Shield, pending),
            "Shield on (pending)"
        );
        assert_eq!(
            format_modifier(Modifier::Double, ModifierView::default()),
            "Double off"
        );
    }
}
