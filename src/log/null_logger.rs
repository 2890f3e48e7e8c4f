//! Stands in for the console logger when the `logging` feature is off. Nothing is ever printed,
//! but the configuration API keeps working.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}
