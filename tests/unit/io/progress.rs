//! Tests for map batch and coverage progress tracking

#[cfg(test)]
mod tests {
    use dungeontile::io::progress::ProgressManager;

    // Tests a full map batch lifecycle
    // Verified by finishing before any bar was started
    #[test]
    fn test_map_batch_lifecycle() {
        let mut pm = ProgressManager::new();

        pm.start_maps(3);
        pm.complete_map();
        pm.retry();
        pm.complete_map();
        pm.complete_map();
        pm.finish();

        assert_eq!(pm.failed_attempts(), 1);
    }

    // Tests retries are counted without a bar
    // Verified by only counting when a bar exists
    #[test]
    fn test_retry_without_bar() {
        let mut pm = ProgressManager::default();

        pm.retry();
        pm.retry();
        pm.complete_map();
        pm.finish();

        assert_eq!(pm.failed_attempts(), 2);
    }

    // Tests the coverage bar is sized for every generation
    // Verified by sizing the bar per worker
    #[test]
    fn test_coverage_bar() {
        let mut pm = ProgressManager::new();

        let bar = pm.start_coverage(40);
        bar.inc(5);

        assert_eq!(bar.length(), Some(40));
        assert_eq!(bar.position(), 5);
        pm.finish();
    }

    // Tests the shared display handle can be cloned for the logger
    // Verified by constructing a separate display
    #[test]
    fn test_multi_progress_handle() {
        let pm = ProgressManager::new();
        let handle = pm.multi_progress();

        handle.suspend(|| {});
        pm.finish();
    }
}
