// Compaction crew size benchmarks
//
// The compaction phase deliberately restricts the atomic append to a
// small crew to bound counter contention. This benchmark measures the
// tradeoff across crew sizes on a fixed candidate set.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec3, Vec4};

use viscull::{VplCompactor, VplConfig, VplData, VplFrameInputs, WorkerTeam};

const CANDIDATES: usize = 10_000;
const CREW_SIZES: &[usize] = &[1, 2, 4, 8, 16];

fn sampler(world_pos: Vec3, _blends: Vec3, _dir: Vec3) -> f32 {
    if world_pos.x >= 0.0 {
        0.0
    } else {
        1.0
    }
}

fn make_lights() -> Vec<VplData> {
    (0..CANDIDATES)
        .map(|index| {
            let x = if index % 2 == 0 { 1.0 } else { -1.0 };
            VplData::new(
                index as u32,
                Vec3::new(x * index as f32, 1.0, 0.0),
                Vec4::splat(300.0),
            )
        })
        .collect()
}

fn bench_crew_sizes(c: &mut Criterion) {
    let team = WorkerTeam::new("bench-vpl", 16).expect("team should spawn");
    let lights = make_lights();
    let shadow: fn(Vec3, Vec3, Vec3) -> f32 = sampler;

    let mut group = c.benchmark_group("vpl_compaction_crew");
    for &crew in CREW_SIZES {
        let compactor = VplCompactor::new(VplConfig {
            compaction_crew_size: crew,
            ..VplConfig::default()
        })
        .expect("compactor should build");

        group.bench_with_input(BenchmarkId::from_parameter(crew), &crew, |b, _| {
            b.iter(|| {
                let inputs = VplFrameInputs {
                    lights: black_box(&lights),
                    cascade_planes: [Vec4::ZERO; 3],
                    light_direction: Vec3::NEG_Y,
                    sampler: &shadow,
                };
                compactor
                    .dispatch(&team, &inputs)
                    .expect("dispatch must succeed");
                black_box(compactor.visible_count())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_crew_sizes);
criterion_main!(benches);
