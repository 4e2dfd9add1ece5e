//! Log output for the command line, kept apart from the progress bar.

use indicatif::ProgressBar;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// `env_logger` output routed around an indicatif bar.
///
/// Each record is written while the bar is suspended, so log lines never land
/// in the middle of a bar redraw.
pub struct ProgressLogger {
    inner: env_logger::Logger,
    bar: ProgressBar,
}

impl ProgressLogger {
    pub fn new(mut builder: env_logger::Builder, bar: ProgressBar) -> Self {
        Self {
            inner: builder.build(),
            bar,
        }
    }

    pub fn filter(&self) -> LevelFilter {
        self.inner.filter()
    }
}

impl Log for ProgressLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.inner.matches(record) {
            self.bar.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Installs a `RUST_LOG`-configured logger that draws around `bar`.
pub fn init_with_progress(bar: &ProgressBar) -> Result<(), SetLoggerError> {
    let builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER));
    let logger = ProgressLogger::new(builder, bar.clone());
    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    fn logger(filter: &str) -> ProgressLogger {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(filter).is_test(true);
        ProgressLogger::new(builder, ProgressBar::hidden())
    }

    #[test]
    fn test_filter_is_respected() {
        let logger = logger("warn");
        assert_eq!(logger.filter(), LevelFilter::Warn);

        let info = Metadata::builder().level(Level::Info).target("auto_annotate").build();
        let warn = Metadata::builder().level(Level::Warn).target("auto_annotate").build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&warn));
    }

    #[test]
    fn test_log_while_bar_is_active() {
        let bar = ProgressBar::hidden();
        bar.set_length(3);
        bar.inc(1);
        let mut builder = env_logger::Builder::new();
        builder.parse_filters("info").is_test(true);
        let logger = ProgressLogger::new(builder, bar.clone());

        logger.log(
            &Record::builder()
                .args(format_args!("Processed a.png (1 boxes)"))
                .level(Level::Info)
                .target("auto_annotate")
                .build(),
        );
        logger.flush();

        assert_eq!(bar.position(), 1);
        assert!(!bar.is_finished());
    }
}
