pub mod aggregate;
pub mod calendar;
pub mod classify;
pub mod dates;
pub mod engine;
pub mod event;
pub mod fetch;
pub mod pipeline;

pub use crate::domain::model::{
    CalendarEvent, DaySchedule, EventType, IpoRecord, Reminder, TransformResult,
};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
