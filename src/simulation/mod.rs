// --- File: simulation/mod.rs ---
pub mod bubbles;
pub mod clock;
pub mod fish_school;
pub mod lasers;
pub mod light_rays;

use rand::rngs::StdRng;

pub type SimRng = StdRng;
// --- End of File: simulation/mod.rs ---
