//! Software stand-ins for the mount and the photodiode, used to rehearse a
//! map run on a machine without the instruments attached.

mod sim_mount;
mod sim_photodiode;
#[cfg(test)]
mod tests;

pub use sim_mount::SimulatedMount;
pub use sim_photodiode::SimulatedPhotodiode;
