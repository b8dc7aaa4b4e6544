//! Standard Pegasus III processing chains.
//!
//! Every chain removes the pre-shot offset, integrates, removes the linear
//! drift that integration accumulates and converts to physical units.

use crate::shot::channels::{PLASMA_CURRENT, PLASMA_ROGOWSKI};
use crate::shot::SignalGroup;

use super::spec::StageSpec;

fn cleanup() -> Vec<StageSpec> {
    vec![
        StageSpec::baseline(),
        StageSpec::Integrate,
        StageSpec::Detrend,
    ]
}

/// Flux loops: cleanup, then calibration
pub fn flux_loop_stages() -> Vec<StageSpec> {
    let mut stages = cleanup();
    stages.push(StageSpec::Calibrate);
    stages
}

/// B-dot probes: cleanup, calibration, then the coil `1/NA` factor
pub fn bdot_stages() -> Vec<StageSpec> {
    let mut stages = flux_loop_stages();
    stages.push(StageSpec::ProbeScale {
        factors: None,
        units: None,
    });
    stages
}

/// Plasma current from the plasma Rogowski coil, published as `Ip`
pub fn plasma_current_stages() -> Vec<StageSpec> {
    let mut stages = vec![StageSpec::Select {
        channels: vec![PLASMA_ROGOWSKI.to_string()],
    }];
    stages.extend(flux_loop_stages());
    stages.push(StageSpec::Rename {
        from: PLASMA_ROGOWSKI.to_string(),
        to: PLASMA_CURRENT.to_string(),
    });
    stages
}

/// Standard chain for a signal group
pub fn preset_for(group: SignalGroup) -> Vec<StageSpec> {
    match group {
        SignalGroup::FluxLoops => flux_loop_stages(),
        SignalGroup::BDots => bdot_stages(),
        SignalGroup::Currents => plasma_current_stages(),
    }
}
