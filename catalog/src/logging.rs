use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

/// 把 log 宏输出到浏览器控制台
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = JsValue::from_str(&format_line(record.level(), record.target(), &record.args().to_string()));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            _ => console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// 安装控制台日志，可重复调用；重复调用只更新日志级别
pub fn init_logging(level: LevelFilter) {
    // 已安装过时 set_logger 返回错误，忽略即可
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

fn format_line(level: Level, target: &str, message: &str) -> String {
    format!("[{}] {}: {}", level, target, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_level_and_target() {
        assert_eq!(
            format_line(Level::Warn, "racket_catalog::favorites", "回滚"),
            "[WARN] racket_catalog::favorites: 回滚"
        );
    }
}
