use cardroom_core::game::cards::{build_deck, card_beats, deal, sort_hand, Card, Rank, Suit};
use cardroom_core::game::dominoes::reducer as dominoes_reducer;
use cardroom_core::game::spades::reducer as spades_reducer;
use cardroom_core::game::{self, GameAction};
use cardroom_core::ids::{GameId, RoomId, RoomCode, UserId};
use cardroom_core::room::lifecycle::new_room;
use cardroom_core::room::Room;
use cardroom_core::settings::{DominoesSettings, SpadesSettings};
use cardroom_core::user::User;
use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A lobby room with four users seated into two teams of two, ready for
/// either game's `init`.
fn four_player_room() -> (Room, Vec<UserId>) {
    let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
    let creator = User::new(users[0], "p0".to_string());
    let mut room = new_room(RoomId::new(), RoomCode::normalize("AB12CD"), "bench room".into(), creator, Utc::now());
    for (i, &id) in users.iter().enumerate().skip(1) {
        room.users.push(User::new(id, format!("p{i}")));
        room.ready_states.insert(id, true);
    }
    room.teams = Some(vec![vec![Some(users[0]), Some(users[1])], vec![Some(users[2]), Some(users[3])]]);
    (room, users)
}

fn bench_card_beats(c: &mut Criterion) {
    let settings = SpadesSettings::default();
    c.bench_function("spades_card_beats", |b| {
        b.iter(|| card_beats(Card::new(Rank::Ten, Suit::Spades), Card::new(Rank::Queen, Suit::Hearts), Suit::Hearts, &settings));
    });
}

fn bench_deal_and_sort(c: &mut Criterion) {
    let settings = SpadesSettings::default();
    let mut rng = StdRng::seed_from_u64(7);
    c.bench_function("spades_deal_and_sort_four_hands", |b| {
        b.iter(|| {
            let deck = build_deck(settings.jokers_enabled);
            let mut hands = deal(deck, 4, &mut rng);
            for hand in &mut hands {
                sort_hand(hand, &settings);
            }
            hands
        });
    });
}

fn bench_spades_init(c: &mut Criterion) {
    let (room, _) = four_player_room();
    let settings = SpadesSettings::default();
    let mut rng = StdRng::seed_from_u64(11);
    c.bench_function("spades_round_init", |b| {
        b.iter(|| spades_reducer::init(&room, GameId::new(), &settings, &mut rng, Utc::now()));
    });
}

fn bench_dominoes_init(c: &mut Criterion) {
    let (room, _) = four_player_room();
    let settings = DominoesSettings::default();
    let mut rng = StdRng::seed_from_u64(13);
    c.bench_function("dominoes_round_init", |b| {
        b.iter(|| dominoes_reducer::init(&room, GameId::new(), &settings, &mut rng, Utc::now()));
    });
}

fn bench_spades_trick(c: &mut Criterion) {
    let (room, users) = four_player_room();
    let settings = SpadesSettings::default();
    let mut rng = StdRng::seed_from_u64(17);
    let initial = spades_reducer::init(&room, GameId::new(), &settings, &mut rng, Utc::now()).unwrap();

    let mut group = c.benchmark_group("spades_bid_round");
    group.bench_with_input(BenchmarkId::from_parameter("four_bids"), &initial, |b, state| {
        b.iter_batched(
            || state.clone(),
            |mut state| {
                for &user_id in &users {
                    let turn = state.play_order[state.current_turn_index];
                    let action = GameAction::PlaceBid { amount: 3, blind: false };
                    if let Ok(next) = spades_reducer::reduce(&state, turn, action, &mut rng, Utc::now()) {
                        state = next;
                    }
                    let _ = user_id;
                }
                state
            },
            criterion::BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_public_projection(c: &mut Criterion) {
    let (room, _) = four_player_room();
    let settings = SpadesSettings::default();
    let mut rng = StdRng::seed_from_u64(19);
    let state = game::GameState::Spades(spades_reducer::init(&room, GameId::new(), &settings, &mut rng, Utc::now()).unwrap());
    c.bench_function("spades_public_projection", |b| {
        b.iter(|| game::get_state(&state));
    });
}

criterion_group!(
    card_mechanics,
    bench_card_beats,
    bench_deal_and_sort,
);

criterion_group!(
    round_lifecycle,
    bench_spades_init,
    bench_dominoes_init,
    bench_spades_trick,
    bench_public_projection,
);

criterion_main!(card_mechanics, round_lifecycle);
