//! One scraping run and the exit status it maps to.

use std::path::Path;

use steuer::{write_results, Pipeline, Transport};

/// Everything fetched and written, or only writing failed.
pub const EXIT_OK: i32 = 0;

/// A page could not be fetched or parsed; nothing was written.
pub const EXIT_FATAL: i32 = 1;

/// Collect `start..=stop` and write it to `output`, returning the exit status.
///
/// Fetch and parse failures end the run before the output is touched.
/// Output failures stop writing but still count as a normal exit.
pub async fn run<T: Transport>(
    pipeline: &Pipeline<T>,
    start: u32,
    stop: u32,
    output: &Path,
) -> i32 {
    let results = match pipeline.collect_range(start, stop).await {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("{e}");
            return EXIT_FATAL;
        }
    };

    if let Err(e) = write_results(output, &results) {
        tracing::error!("Writing {} stopped: {e}", output.display());
    }

    EXIT_OK
}
