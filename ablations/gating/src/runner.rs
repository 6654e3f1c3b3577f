//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use std::thread;
use tomo_berry::prelude::*;
use utils::phantom::{self, Phantom};

const SHAPE: Idx3d = (48, 96, 96);
const PHANTOMS: u64 = 6;
const BLOBS: usize = 80;
const MODES: [&str; 4] = ["none", "intersection", "contact", "colocalization"];

fn config(mode: &str, connectivity: u32) -> ClusterConfig {
    let raw = RawClusterConfig {
        contact_mode: mode.to_string(),
        clustering_connectivity: connectivity,
        contact_distance: 3.0,
        min_cluster_size: 4,
        ignore_border_thickness: BorderThickness::from([2, 2, 1]),
        ..Default::default()
    };
    ClusterConfig::try_from(raw).expect("Ablation configuration error")
}

/// 以 `mode` 策略, 依次在每个测试体上按三种连通性各运行一次.
/// 计时只统计串行路径, 并行路径只用于一致性检查.
fn ablate(mode: &str, phantoms: &[Phantom]) -> Profile {
    let mut profile = Profile::new();
    for (idx, ph) in phantoms.iter().enumerate() {
        println!("{mode}: phantom {idx}...");
        for connectivity in [6, 18, 26] {
            let cfg = config(mode, connectivity);
            let mask = Some(ph.mask.view());

            profile.run_start();
            let serial = cluster(
                ph.prediction.view(),
                mask,
                &cfg.clone().with_parallel(false),
            )
            .expect("Clustering error");
            profile.run_elapsed(serial.len());

            let parallel = cluster(ph.prediction.view(), mask, &cfg.with_parallel(true))
                .expect("Clustering error");
            if parallel != serial {
                profile.count_mismatch();
            }
        }
    }
    profile.finish()
}

/// 实际运行.
pub fn run() -> AblationResult {
    println!("Generating phantoms...");
    let phantoms: Vec<Phantom> = (0..PHANTOMS)
        .map(|seed| phantom::random(SHAPE, BLOBS, seed))
        .collect();

    println!("Running ablation studies...");
    thread::scope(|s| {
        let p = phantoms.as_slice();
        let handles = MODES.map(|m| s.spawn(move || ablate(m, p)));

        MODES
            .into_iter()
            .zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            )
            .collect()
    })
}
