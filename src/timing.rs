//! Замер времени этапов генерации

use std::time::Instant;

/// RAII-таймер: пишет в лог время этапа при выходе из области видимости.
///
/// ```ignore
/// let _t = Timed::info("Voronoi");
/// // ... работа ...
/// // в лог уйдёт "Voronoi: 12.345ms"
/// ```
pub struct Timed {
    name: &'static str,
    start: Instant,
    level: log::Level,
}

impl Timed {
    pub fn info(name: &'static str) -> Self {
        log::debug!("{name}...");
        Self {
            name,
            start: Instant::now(),
            level: log::Level::Info,
        }
    }

    pub fn debug(name: &'static str) -> Self {
        log::trace!("{name}...");
        Self {
            name,
            start: Instant::now(),
            level: log::Level::Debug,
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}
