pub mod highlight;
pub mod readwise;
pub mod policy;

pub use highlight::*;
pub use readwise::*;
pub use policy::*;
