//! Performance benchmarks for scoring and snapshot construction

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use podium::amqp::publisher::NoOpEventPublisher;
use podium::leaderboard::{build_snapshot, RecomputeCoordinator};
use podium::scoring::score;
use podium::signals::InMemorySignalStore;
use podium::types::{Division, LeaderboardVariant, RankTier, UserSignals};
use std::sync::Arc;
use strum::IntoEnumIterator;

fn synthetic_roster(count: usize) -> Vec<UserSignals> {
    (0..count)
        .map(|i| {
            let tier = match i % 11 {
                0 => RankTier::Unranked,
                1 => RankTier::Iron,
                2 => RankTier::Bronze,
                3 => RankTier::Silver,
                4 => RankTier::Gold,
                5 => RankTier::Platinum,
                6 => RankTier::Emerald,
                7 => RankTier::Diamond,
                8 => RankTier::Master,
                9 => RankTier::Grandmaster,
                _ => RankTier::Challenger,
            };
            let division = if tier.has_divisions() {
                Some(match i % 4 {
                    0 => Division::I,
                    1 => Division::II,
                    2 => Division::III,
                    _ => Division::IV,
                })
            } else {
                None
            };

            UserSignals {
                user_id: format!("user_{:05}", i),
                skill_average: 1.0 + (i % 40) as f64 * 0.1,
                personality_average: 1.0 + (i % 35) as f64 * 0.1,
                rating_count: (i % 50) as u32,
                rank_tier: tier,
                division,
                league_points: ((i * 7) % 900) as u32,
                win_rate: if i % 9 == 0 {
                    None
                } else {
                    Some(30.0 + (i % 40) as f64)
                },
                updated_at: podium::utils::current_timestamp(),
            }
        })
        .collect()
}

fn bench_score_calculations(c: &mut Criterion) {
    let signals = UserSignals {
        user_id: "bench_user".to_string(),
        skill_average: 4.3,
        personality_average: 3.8,
        rating_count: 20,
        rank_tier: RankTier::Diamond,
        division: Some(Division::I),
        league_points: 0,
        win_rate: Some(55.0),
        updated_at: podium::utils::current_timestamp(),
    };

    c.bench_function("score_overall", |b| {
        b.iter(|| black_box(score(black_box(&signals), LeaderboardVariant::Overall)))
    });

    c.bench_function("score_all_variants", |b| {
        b.iter(|| {
            for variant in LeaderboardVariant::iter() {
                black_box(score(black_box(&signals), variant));
            }
        })
    });
}

fn bench_snapshot_construction(c: &mut Criterion) {
    for size in [100, 1000, 10_000] {
        let roster = synthetic_roster(size);
        c.bench_function(&format!("build_snapshot_overall_{}_users", size), |b| {
            b.iter(|| {
                black_box(build_snapshot(
                    black_box(&roster),
                    LeaderboardVariant::Overall,
                ))
            })
        });
    }
}

fn bench_refresh_and_page(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let store = Arc::new(InMemorySignalStore::new());
    for user in synthetic_roster(1000) {
        store.upsert_signals(user).unwrap();
    }
    let coordinator = Arc::new(RecomputeCoordinator::new(
        store,
        Arc::new(NoOpEventPublisher::new()),
    ));

    c.bench_function("coordinator_refresh_1000_users", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(coordinator.refresh(LeaderboardVariant::Overall).await)
            })
        })
    });

    // Page against a published snapshot
    rt.block_on(async {
        coordinator.refresh_all().await.unwrap();
    });

    c.bench_function("coordinator_page_25_of_1000", |b| {
        b.iter(|| black_box(coordinator.page(LeaderboardVariant::Overall, 200, Some(25))))
    });
}

criterion_group!(
    benches,
    bench_score_calculations,
    bench_snapshot_construction,
    bench_refresh_and_page
);
criterion_main!(benches);
