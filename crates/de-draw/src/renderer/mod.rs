//! Drawing renderer abstraction

mod session;
mod sheet;
mod traits;

pub use session::DrawingSession;
pub use sheet::{Frame, Rect, SheetConfig, SheetLayout, SheetRenderer};
pub use traits::*;
