//! Pegasus III diagnostic channel groups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Flux loops: center-stack, toroidal, diamagnetic, outer and wall loops
pub const FLUX_LOOPS: &[&str] = &[
    "CFL01", "CFL02", "CFL03", "CFL04", "CFL05", "CFL06", "CFL07", "CFL08", "CFL09", "CFL10",
    "CFL11", "CFL12", "CFL13", "CTor1", "CTor2", "CTor3", "CTor4", "CTor5", "CTor6", "DiamagA",
    "DiamagB", "DiamagC", "NCFL01", "NCFL02", "NCFL03", "NCFL04", "NCFL05", "NCFL06", "NCFL07",
    "NCFL08", "NCFL09", "NCFL10", "NCFL11", "NCFL12", "NCFL13", "NCFL14", "NCFL15", "NCFL16",
    "NCFL17", "NCFL18", "NCFL19", "NCFL20", "WFL01", "WFL02", "WFL03", "WFL04", "WFL05", "WFL06",
    "WFL07", "WFL08", "WFL09", "WFL10", "WFL11", "WFL12", "WFL13", "WFL14", "WFL15", "WFL16",
];

/// Magnetic pickup (B-dot) probes
pub const BDOTS: &[&str] = &[
    "PDX01", "PDX02", "PDX03", "PDX04", "PDX05", "PDX06", "PDX07", "PDX08", "PDX09", "PDX10",
    "PDX11", "PDX12", "PDX13", "OTor1", "OTor2", "OTor3", "OTor4", "OTor5", "OTor6", "CTor1",
    "CTor2", "CTor3", "CTor4", "CTor5", "CTor6", "CPA01", "CPA02", "CPA03", "CPA04", "CPA05",
    "CPA06", "CPA07", "CPA08", "CPA09", "CPA10", "CPA11", "CPA12", "CPA13", "CPA14", "CPA15",
    "CPA16", "CPA17", "CPA18", "CPA19", "CPA20", "CPA21",
];

/// Rogowski coils and coil power supply currents
pub const CURRENTS: &[&str] = &[
    "PlasmaRogA",
    "PlasmaRogB",
    "RT_DPWMi_EF123",
    "RT_DPWMi_EF45",
    "RT_DPWMi_EF678",
    "RT_DPWMi_TF",
];

/// Rogowski coil used for the plasma current
pub const PLASMA_ROGOWSKI: &str = "PlasmaRogB";

/// Name of the derived plasma current channel
pub const PLASMA_CURRENT: &str = "Ip";

/// A named group of diagnostic channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignalGroup {
    /// Flux loops
    FluxLoops,
    /// B-dot probes
    BDots,
    /// Coil and plasma currents
    Currents,
}

impl SignalGroup {
    /// All groups in load order
    pub const ALL: [SignalGroup; 3] = [
        SignalGroup::FluxLoops,
        SignalGroup::BDots,
        SignalGroup::Currents,
    ];

    /// Channels in this group
    pub fn channels(self) -> &'static [&'static str] {
        match self {
            SignalGroup::FluxLoops => FLUX_LOOPS,
            SignalGroup::BDots => BDOTS,
            SignalGroup::Currents => CURRENTS,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            SignalGroup::FluxLoops => "FluxLoops",
            SignalGroup::BDots => "BDots",
            SignalGroup::Currents => "Currents",
        }
    }

    /// Union of all group channels without duplicates, in load order
    pub fn all_channels() -> Vec<&'static str> {
        let mut seen = Vec::new();
        for group in Self::ALL {
            for &channel in group.channels() {
                if !seen.contains(&channel) {
                    seen.push(channel);
                }
            }
        }
        seen
    }
}

impl fmt::Display for SignalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignalGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "fluxloops" | "fl" => Ok(SignalGroup::FluxLoops),
            "bdots" | "bdot" => Ok(SignalGroup::BDots),
            "currents" => Ok(SignalGroup::Currents),
            _ => Err(format!(
                "Unknown signal group '{}'. Valid options: fluxloops, bdots, currents",
                s
            )),
        }
    }
}
