use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use service::community::domain::{Community, CommunityDraft};
use service::users::domain::UserDraft;
use service::validation::{CopyNonNull, Validate};

fn bench_validation(c: &mut Criterion) {
    let stored = Community {
        id: 1,
        name: "rustaceans".into(),
        description: "all things rust".into(),
        admin_login: "alice".into(),
        created_at: chrono::Utc::now(),
    };
    let patch = CommunityDraft { description: Some("fearless concurrency".into()), ..Default::default() };

    c.bench_function("community_copy_non_null_validate", |b| {
        b.iter(|| {
            let mut d = CommunityDraft::from(black_box(&stored));
            d.copy_non_null(black_box(patch.clone()));
            black_box(d.validated().is_ok())
        });
    });

    let user = UserDraft {
        login: Some("bench".into()),
        email: Some("bench@example.com".into()),
        password: Some("Benchmark1".into()),
        name: Some("Bench".into()),
        phone: Some("+1".into()),
        birthday: chrono::NaiveDate::from_ymd_opt(2000, 1, 1),
        ..Default::default()
    };
    c.bench_function("user_draft_violations", |b| {
        b.iter(|| black_box(&user).violations().len());
    });
}

criterion_group!(benches, bench_validation);
criterion_main!(benches);
