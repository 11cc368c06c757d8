mod calendar;
mod confirmation;
mod language;
mod notification;
mod realtime;
mod shift;

pub use calendar::*;
pub use confirmation::*;
pub use language::*;
pub use notification::*;
pub use realtime::*;
pub use shift::*;
