pub mod declarations;
pub mod errors;
pub mod expressions;
pub mod options;
pub mod statements;

pub use declarations::*;
pub use errors::*;
pub use expressions::*;
pub use options::*;
pub use statements::*;
