pub mod analysis;
pub mod metadata;
pub mod template;
pub mod verification;

pub use analysis::*;
pub use metadata::*;
pub use template::*;
pub use verification::*;
