pub mod completion;
pub mod enums;
pub mod error;
pub mod history;
pub mod settings;
pub mod validate;

// 导出让外部使用
pub use completion::*;
pub use enums::*;
pub use error::*;
pub use history::*;
pub use settings::*;
