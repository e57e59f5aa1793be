pub mod token;
pub use token::*;

pub mod source;
pub use source::*;

pub mod series;
pub use series::*;
