//! Session benchmarks: a full simulated session and rotation question
//! generation.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use brain_bench::{
    content::ContentBank,
    core::rng::DeterministicRng,
    game::{variants::rotation::generate_options, SilentCues, Variant},
    session::{
        autoplay::{play_to_end, ScriptedPlayer, DEFAULT_STEP_LIMIT},
        Session, SessionConfig,
    },
};

fn bench_full_session(c: &mut Criterion) {
    let content = ContentBank::builtin();

    c.bench_function("full_session_all_variants", |b| {
        b.iter_batched(
            || {
                let session = Session::new(
                    &Variant::ALL,
                    content.clone(),
                    SessionConfig::seeded(42),
                    Box::new(SilentCues),
                )
                .unwrap();
                let player = ScriptedPlayer::new(7, content.clone());
                (session, player)
            },
            |(mut session, mut player)| {
                play_to_end(&mut session, &mut player, DEFAULT_STEP_LIMIT).unwrap();
                black_box(session.compute_hash())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_rotation_options(c: &mut Criterion) {
    let content = ContentBank::builtin();
    let target = content.rotation[0].clone();
    let mut rng = DeterministicRng::new(1);

    c.bench_function("rotation_generate_options", |b| {
        b.iter(|| black_box(generate_options(&mut rng, black_box(&target))))
    });
}

criterion_group!(benches, bench_full_session, bench_rotation_options);
criterion_main!(benches);
