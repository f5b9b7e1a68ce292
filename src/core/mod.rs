// Live update core: price tracking, cooldown gating, alert generation and the
// bounded notification store, tied together by `LiveContext`.

pub mod alerts;
pub mod clock;
pub mod context;
pub mod cooldown;
pub mod notifications;
pub mod tracker;
pub mod weather;
