pub mod attribution;
pub mod duration;
pub mod member;
pub mod payment;
pub mod plan;
pub mod plan_history;
pub mod task;

pub use attribution::*;
pub use duration::*;
pub use member::*;
pub use payment::*;
pub use plan::*;
pub use plan_history::*;
pub use task::*;
