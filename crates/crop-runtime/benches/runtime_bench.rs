use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crop_core::{Catalog, Crop, CropId, HarvestSpec, Profession, Season};
use crop_runtime::{update, AggregationContext, FarmKind, Plan, Year};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use std::sync::Arc;

fn crop(id: &str, growth: u32, regrow: Option<u32>) -> Crop {
    Crop {
        id: CropId(id.to_string()),
        name: id.to_string(),
        sell: Decimal::from(120),
        seed_price: Decimal::from(40),
        stages: vec![growth],
        regrow,
        seasons: vec![Season::Spring, Season::Summer],
        harvest: HarvestSpec::default(),
        wild: false,
        note: String::new(),
    }
}

/// Five years with a few hundred plantings in each farm.
fn build_years() -> Vec<Year> {
    let catalog = Catalog::new(
        vec![crop("quick", 4, None), crop("berry", 8, Some(3))],
        vec![],
        vec![],
    );
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let none = catalog.no_fertilizer();
    (0..5)
        .map(|index| {
            let mut year = Year::new(index);
            for kind in [FarmKind::Farm, FarmKind::Greenhouse] {
                let farm = year.farm_mut(kind);
                for _ in 0..300 {
                    let day = rng.gen_range(1..=56);
                    let crop = &catalog.crops()[rng.gen_range(0..2)];
                    let plan = Plan::new(
                        day,
                        Arc::clone(crop),
                        Arc::clone(&none),
                        rng.gen_range(1..50),
                        kind == FarmKind::Greenhouse,
                    );
                    farm.plans.entry(day).or_default().push(plan);
                }
            }
            year
        })
        .collect()
}

fn bench_update(c: &mut Criterion) {
    let mut years = build_years();
    let ctx = AggregationContext {
        profession: Profession::Agriculturist,
        farming_level: 10,
    };
    c.bench_function("full update 5 years", |b| {
        b.iter(|| {
            update(black_box(&mut years), 0, FarmKind::Farm, true, &ctx);
            update(black_box(&mut years), 0, FarmKind::Greenhouse, true, &ctx);
        })
    });
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
