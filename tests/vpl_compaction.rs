// VPL compaction integration tests
//
// Exercises the four-phase compaction kernel end to end on real worker
// teams: soundness of the visible set, the cap invariant under overflow,
// and stability across repeated dispatches.

use std::collections::HashSet;

use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use viscull::{VplCompactor, VplConfig, VplData, VplFrameInputs, WorkerTeam};

/// Visibility encoded in world position: lights east of the origin
/// receive sun light, lights west of it are fully self-shadowed.
fn sun_sampler(world_pos: Vec3, _blends: Vec3, _dir: Vec3) -> f32 {
    if world_pos.x >= 0.0 {
        0.25
    } else {
        1.0
    }
}

type SamplerFn = fn(Vec3, Vec3, Vec3) -> f32;

fn frame_inputs<'a>(lights: &'a [VplData], sampler: &'a SamplerFn) -> VplFrameInputs<'a, SamplerFn> {
    VplFrameInputs {
        lights,
        cascade_planes: [
            Vec4::new(0.0, 1.0, 0.0, 10.0),
            Vec4::new(0.0, 1.0, 0.0, 40.0),
            Vec4::new(0.0, 1.0, 0.0, 160.0),
        ],
        light_direction: Vec3::new(0.3, -0.9, 0.1).normalize(),
        sampler,
    }
}

fn make_lights(count: usize, visible: impl Fn(usize) -> bool) -> Vec<VplData> {
    (0..count)
        .map(|index| {
            let x = if visible(index) { 1.0 } else { -1.0 };
            VplData::new(
                index as u32,
                Vec3::new(x * (1.0 + index as f32), 2.0, index as f32),
                Vec4::new(1.0, 0.9, 0.7, 1.0) * 500.0,
            )
        })
        .collect()
}

#[test]
fn zero_candidates_produce_zero_count() {
    let compactor = VplCompactor::new(VplConfig::default()).expect("compactor should build");
    let team = WorkerTeam::new("vpl-zero", 8).expect("team should spawn");

    let sampler: SamplerFn = sun_sampler;
    let inputs = frame_inputs(&[], &sampler);
    compactor.dispatch(&team, &inputs).expect("dispatch must succeed");

    assert_eq!(compactor.visible_count(), 0);
    assert!(compactor.visible_handles().is_empty());
}

#[test]
fn visible_set_is_sound_and_complete_below_cap() {
    let compactor = VplCompactor::new(VplConfig::default()).expect("compactor should build");
    let team = WorkerTeam::new("vpl-sound", 8).expect("team should spawn");

    // Every third light is visible; 1000 candidates, well below the cap.
    let lights = make_lights(1000, |index| index % 3 == 0);
    let expected: HashSet<u32> = lights
        .iter()
        .filter(|light| light.world_position().x >= 0.0)
        .map(|light| light.handle)
        .collect();

    let sampler: SamplerFn = sun_sampler;
    let inputs = frame_inputs(&lights, &sampler);
    compactor.dispatch(&team, &inputs).expect("dispatch must succeed");

    let handles: HashSet<u32> = compactor.visible_handles().into_iter().collect();
    assert_eq!(
        compactor.visible_count() as usize,
        expected.len(),
        "below the cap the count must equal the classified-visible count"
    );
    assert_eq!(handles, expected, "output must be exactly the visible set");

    // Compacted records must match their handles wholesale.
    for record in compactor.visible_lights() {
        assert_eq!(record, lights[record.handle as usize]);
    }
}

#[test]
fn overflow_truncates_to_cap_without_invalid_entries() {
    // 5000 candidates, 3000 visible, cap 2048: exactly 2048 survive.
    let compactor = VplCompactor::new(VplConfig::default()).expect("compactor should build");
    let team = WorkerTeam::new("vpl-overflow", 8).expect("team should spawn");

    let lights = make_lights(5000, |index| index < 3000);
    let sampler: SamplerFn = sun_sampler;
    let inputs = frame_inputs(&lights, &sampler);
    compactor.dispatch(&team, &inputs).expect("dispatch must succeed");

    assert_eq!(compactor.visible_count(), 2048, "count must clamp to the cap");

    let handles = compactor.visible_handles();
    assert_eq!(handles.len(), 2048);

    let unique: HashSet<u32> = handles.iter().copied().collect();
    assert_eq!(unique.len(), 2048, "no light may appear twice");
    for handle in &handles {
        assert!(
            (*handle as usize) < 3000,
            "handle {} was classified invisible but survived compaction",
            handle
        );
    }
}

#[test]
fn repeated_dispatch_is_idempotent_in_count() {
    let compactor = VplCompactor::new(VplConfig::default()).expect("compactor should build");
    let team = WorkerTeam::new("vpl-idem", 8).expect("team should spawn");

    let lights = make_lights(4000, |index| index % 2 == 0);
    let sampler: SamplerFn = sun_sampler;
    let inputs = frame_inputs(&lights, &sampler);

    compactor.dispatch(&team, &inputs).expect("first dispatch");
    let first = compactor.visible_count();

    compactor.dispatch(&team, &inputs).expect("second dispatch");
    let second = compactor.visible_count();

    assert_eq!(first, second, "same inputs must yield the same count");
}

#[test]
fn randomized_stress_upholds_soundness_and_cap() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = VplConfig {
        max_vpls_before_culling: 4096,
        max_vpls_per_frame: 256,
        compaction_crew_size: 8,
        team_size: 16,
    };
    let compactor = VplCompactor::new(config).expect("compactor should build");
    let team = compactor.spawn_team().expect("team should spawn");

    let mut rng = StdRng::seed_from_u64(0x5eed);
    for iteration in 0..50 {
        let count = rng.gen_range(0..4096);
        let visibility: Vec<bool> = (0..count).map(|_| rng.gen_bool(0.3)).collect();
        let lights = make_lights(count, |index| visibility[index]);

        let visible_total = visibility.iter().filter(|v| **v).count();
        let sampler: SamplerFn = sun_sampler;
        let inputs = frame_inputs(&lights, &sampler);
        compactor.dispatch(&team, &inputs).expect("dispatch must succeed");

        let expected = visible_total.min(256);
        assert_eq!(
            compactor.visible_count() as usize,
            expected,
            "iteration {}: count must be min(visible, cap)",
            iteration
        );

        let handles = compactor.visible_handles();
        let unique: HashSet<u32> = handles.iter().copied().collect();
        assert_eq!(unique.len(), handles.len(), "iteration {}: duplicate handle", iteration);
        for handle in handles {
            assert!(
                visibility[handle as usize],
                "iteration {}: invisible light {} escaped the cull",
                iteration,
                handle
            );
        }
    }
}
