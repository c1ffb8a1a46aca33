use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use arena_core::engine::{simulate_many, CommentaryContext, CommentarySelector, EventDraft};
use arena_core::models::fixtures::demo_pair;
use arena_core::{EngineConfig, EventCategory, MatchEngine, MatchKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_full_match(c: &mut Criterion) {
    let (home, away) = demo_pair();
    let config = EngineConfig::default();

    let mut group = c.benchmark_group("full_match");
    for kind in [MatchKind::Exhibition, MatchKind::League] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{kind:?}")), &kind, |b, &kind| {
            let mut seed = 0u64;
            b.iter(|| {
                seed = seed.wrapping_add(1);
                let mut engine =
                    MatchEngine::new("bench", home.clone(), away.clone(), kind, config.clone(), Some(seed))
                        .expect("demo rosters are valid");
                black_box(engine.run_to_completion())
            });
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let (home, away) = demo_pair();
    let config = EngineConfig::default();

    let mut group = c.benchmark_group("batch");
    group.sample_size(10);
    for count in [4usize, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                simulate_many(&home, &away, MatchKind::Exhibition, &config, 7, count)
                    .expect("demo rosters are valid")
            });
        });
    }
    group.finish();
}

fn bench_commentary(c: &mut Criterion) {
    let selector = CommentarySelector::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let draft = EventDraft::new(EventCategory::Run);
    let context = CommentaryContext {
        home: "Ironclad Wardens",
        away: "Gloamwood Stalkers",
        team: Some("Ironclad Wardens"),
        opponent: Some("Gloamwood Stalkers"),
        player: Some("Kara Vell"),
        player_race: None,
        target: None,
        home_score: 7,
        away_score: 3,
        clock_secs: 912,
    };

    c.bench_function("commentary_select", |b| {
        b.iter(|| black_box(selector.select(&draft, &context, &mut rng)));
    });
}

criterion_group!(benches, bench_full_match, bench_batch, bench_commentary);
criterion_main!(benches);
