use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use kanadr::catalog::loader::EmbeddedSource;
use kanadr::catalog::{CatalogCache, CatalogKind};
use kanadr::engine::display::{self, DisplayMode, KanaMode};
use kanadr::engine::filter::{self, KanaSelection};
use kanadr::engine::pool::SessionPool;

fn bench_pool_draws(c: &mut Criterion) {
    let mut cache = CatalogCache::new(Box::new(EmbeddedSource));
    let kana = cache.get_or_load(CatalogKind::Kana).expect("bundled kana");
    let entries = kana.entries().to_vec();

    c.bench_function("pool draw (104 kana, 1000 draws)", |b| {
        let mut rng = SmallRng::seed_from_u64(7);
        b.iter(|| {
            let mut pool = SessionPool::new();
            pool.init(entries.clone());
            for _ in 0..1000 {
                black_box(pool.draw(&mut rng).ok());
            }
        })
    });

    c.bench_function("draw + resolve mixed (1000 prompts)", |b| {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut pool = SessionPool::new();
        pool.init(entries.clone());
        b.iter(|| {
            for i in 0..1000 {
                if let Ok(entry) = pool.draw(&mut rng) {
                    black_box(display::resolve(
                        entry,
                        DisplayMode::Kana(KanaMode::Mixed),
                        i % 2 == 0,
                    ));
                }
            }
        })
    });
}

fn bench_vocab_filter(c: &mut Criterion) {
    let mut cache = CatalogCache::new(Box::new(EmbeddedSource));
    let kana = cache.get_or_load(CatalogKind::Kana).expect("bundled kana");
    let words = cache.get_or_load(CatalogKind::Words).expect("bundled words");
    let all = KanaSelection::from_ids(kana.entries().iter().map(|e| e.id.clone()));
    let tokens = filter::selected_tokens(&kana, &all);

    c.bench_function("vocab_eligible (all kana selected)", |b| {
        b.iter(|| filter::vocab_eligible(black_box(&words), black_box(&tokens)))
    });

    let seion = KanaSelection::defaults(&kana);
    c.bench_function("selected_tokens + vocab_eligible (seion)", |b| {
        b.iter(|| {
            let tokens = filter::selected_tokens(&kana, black_box(&seion));
            filter::vocab_eligible(&words, &tokens)
        })
    });
}

criterion_group!(benches, bench_pool_draws, bench_vocab_filter);
criterion_main!(benches);
