//! Card, suit, and rank helpers shared by trick-taking games (spec §3, §4.6).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rand_util::shuffle;
use crate::settings::SpadesSettings;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    /// Sort priority used when arranging a dealt hand: Spades > Hearts >
    /// Clubs > Diamonds (spec §4.6 init).
    fn hand_sort_priority(self) -> u8 {
        match self {
            Self::Spades => 0,
            Self::Hearts => 1,
            Self::Clubs => 2,
            Self::Diamonds => 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
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
    Ace,
    LittleJoker,
    BigJoker,
}

impl Rank {
    /// Base ordinal for within-suit comparison, ignoring the
    /// deuce-of-spades-high wrinkle (applied by the caller).
    fn ordinal(self) -> u8 {
        match self {
            Self::Two => 0,
            Self::Three => 1,
            Self::Four => 2,
            Self::Five => 3,
            Self::Six => 4,
            Self::Seven => 5,
            Self::Eight => 6,
            Self::Nine => 7,
            Self::Ten => 8,
            Self::Jack => 9,
            Self::Queen => 10,
            Self::King => 11,
            Self::Ace => 12,
            Self::LittleJoker => 13,
            Self::BigJoker => 14,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
            Self::LittleJoker => "LJ",
            Self::BigJoker => "BJ",
        };
        write!(f, "{repr}")
    }
}

/// Jokers always carry `suit = Spades` (spec §3).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    #[must_use]
    pub fn is_joker(self) -> bool {
        matches!(self.rank, Rank::LittleJoker | Rank::BigJoker)
    }

    /// Ordering value used to sort a hand once suits are grouped: respects
    /// `deuce_of_spades_high`, which slots the 2 of spades above the ace of
    /// spades (but below jokers).
    fn rank_value(self, deuce_of_spades_high: bool) -> u8 {
        if deuce_of_spades_high && self.suit == Suit::Spades && self.rank == Rank::Two {
            return Rank::Ace.ordinal() + 1;
        }
        self.rank.ordinal()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            write!(f, "{}", self.rank)
        } else {
            write!(f, "{}{}", self.rank, self.suit)
        }
    }
}

/// Build the 52-card pool for a Spades deal. When `jokers_enabled`, the
/// 2♣ and 2♦ are removed and the two jokers appended so the deck stays at
/// 52 cards (spec §4.6 init).
#[must_use]
pub fn build_deck(jokers_enabled: bool) -> Vec<Card> {
    let suits = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
    let ranks = [
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
        Rank::Ace,
    ];

    let mut deck = Vec::with_capacity(52);
    for &suit in &suits {
        for &rank in &ranks {
            if jokers_enabled
                && rank == Rank::Two
                && matches!(suit, Suit::Clubs | Suit::Diamonds)
            {
                continue;
            }
            deck.push(Card::new(rank, suit));
        }
    }
    if jokers_enabled {
        deck.push(Card::new(Rank::LittleJoker, Suit::Spades));
        deck.push(Card::new(Rank::BigJoker, Suit::Spades));
    }
    debug_assert_eq!(deck.len(), 52);
    deck
}

/// Shuffle and deal `deck` round-robin into `hand_count` equal hands.
#[must_use]
pub fn deal(mut deck: Vec<Card>, hand_count: usize, rng: &mut impl Rng) -> Vec<Vec<Card>> {
    shuffle(&mut deck, rng);
    let mut hands = vec![Vec::new(); hand_count];
    for (i, card) in deck.into_iter().enumerate() {
        hands[i % hand_count].push(card);
    }
    hands
}

/// Sort a hand by suit (Spades>Hearts>Clubs>Diamonds) then rank, honoring
/// `deuce_of_spades_high`.
pub fn sort_hand(hand: &mut [Card], settings: &SpadesSettings) {
    hand.sort_by(|a, b| {
        a.suit
            .hand_sort_priority()
            .cmp(&b.suit.hand_sort_priority())
            .then(
                a.rank_value(settings.deuce_of_spades_high)
                    .cmp(&b.rank_value(settings.deuce_of_spades_high)),
            )
    });
}

/// Does `a` beat `b` when `b` was played first (or is the standing
/// best-of-trick) and `led` is the trick's led suit? Spec §4.6 `cardBeats`.
#[must_use]
pub fn card_beats(a: Card, b: Card, led: Suit, settings: &SpadesSettings) -> bool {
    if settings.jokers_enabled && (a.is_joker() || b.is_joker()) {
        return match (a.is_joker(), b.is_joker()) {
            (true, true) => a.rank.ordinal() > b.rank.ordinal(),
            (true, false) => true,
            (false, true) => false,
            (false, false) => unreachable!(),
        };
    }

    if a.suit == b.suit {
        return a.rank_value(settings.deuce_of_spades_high)
            > b.rank_value(settings.deuce_of_spades_high);
    }

    match (a.suit == Suit::Spades, b.suit == Suit::Spades) {
        (true, false) => true,
        (false, true) => false,
        _ => {
            // Neither is spades and suits differ: only the led suit can win.
            a.suit == led && b.suit != led
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_without_jokers_has_52_cards() {
        assert_eq!(build_deck(false).len(), 52);
    }

    #[test]
    fn deck_with_jokers_still_has_52_cards_and_no_two_of_clubs_or_diamonds() {
        let deck = build_deck(true);
        assert_eq!(deck.len(), 52);
        assert!(
            !deck
                .iter()
                .any(|c| c.rank == Rank::Two && matches!(c.suit, Suit::Clubs | Suit::Diamonds))
        );
        assert!(deck.iter().any(|c| c.rank == Rank::LittleJoker));
        assert!(deck.iter().any(|c| c.rank == Rank::BigJoker));
    }

    #[test]
    fn deal_round_robin_splits_evenly() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let hands = deal(build_deck(false), 4, &mut rng);
        assert_eq!(hands.len(), 4);
        for hand in &hands {
            assert_eq!(hand.len(), 13);
        }
    }

    #[test]
    fn spade_beats_off_suit_lead() {
        let settings = SpadesSettings::default();
        let spade = Card::new(Rank::Two, Suit::Spades);
        let heart = Card::new(Rank::King, Suit::Hearts);
        assert!(card_beats(spade, heart, Suit::Hearts, &settings));
        assert!(!card_beats(heart, spade, Suit::Hearts, &settings));
    }

    #[test]
    fn trick_resolution_example_from_spec() {
        // leadSuit=Hearts; plays 5H, KH, 2S, 3H -> winner holds 2S.
        let settings = SpadesSettings::default();
        let plays = [
            Card::new(Rank::Five, Suit::Hearts),
            Card::new(Rank::King, Suit::Hearts),
            Card::new(Rank::Two, Suit::Spades),
            Card::new(Rank::Three, Suit::Hearts),
        ];
        let mut winner = plays[0];
        for &card in &plays[1..] {
            if card_beats(card, winner, Suit::Hearts, &settings) {
                winner = card;
            }
        }
        assert_eq!(winner, Card::new(Rank::Two, Suit::Spades));
    }

    #[test]
    fn non_led_non_spade_cards_never_beat_each_other() {
        let settings = SpadesSettings::default();
        let club = Card::new(Rank::Ace, Suit::Clubs);
        let diamond = Card::new(Rank::Two, Suit::Diamonds);
        assert!(!card_beats(club, diamond, Suit::Hearts, &settings));
        assert!(!card_beats(diamond, club, Suit::Hearts, &settings));
    }

    #[test]
    fn deuce_of_spades_high_outranks_ace_of_spades() {
        let settings = SpadesSettings {
            deuce_of_spades_high: true,
            ..SpadesSettings::default()
        };
        let deuce = Card::new(Rank::Two, Suit::Spades);
        let ace = Card::new(Rank::Ace, Suit::Spades);
        assert!(card_beats(deuce, ace, Suit::Clubs, &settings));
    }
}
