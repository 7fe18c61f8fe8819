use r_filetools::{FileToolError, FileToolLogger, logger};
use tempfile::TempDir;

// The global logger can only be installed once per process, so all
// assertions live in a single test.
#[test]
fn test_file_logger_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs/log-Test.txt");
    std::fs::create_dir_all(temp_dir.path().join("logs")).unwrap();
    std::fs::write(&log_path, "left over from last run\n").unwrap();

    assert!(!logger::is_started());
    assert!(logger::log_file_contents().is_err());

    FileToolLogger::init(false, &log_path).unwrap();
    assert!(logger::is_started());
    assert_eq!(logger::log_file_path(), Some(log_path.clone()));

    log::info!("archive written");
    log::debug!("hidden without verbose");
    logger::log_message("WARNING", "disk almost full");
    logger::log_message("nonsense", "dropped");

    let contents = logger::log_file_contents().unwrap();
    assert!(!contents.contains("left over"));
    assert!(contents.contains("starting logging of Test"));
    assert!(contents.contains("[INFO]"));
    assert!(contents.contains("archive written"));
    assert!(contents.contains("[WARN]"));
    assert!(contents.contains("disk almost full"));
    assert!(!contents.contains("hidden without verbose"));
    assert!(!contents.contains("LOGGING_ERROR"));

    let again = FileToolLogger::init(true, &log_path).unwrap_err();
    assert!(matches!(again, FileToolError::Logger(_)));

    let other_path = temp_dir.path().join("logs/log-Other.txt");
    std::fs::write(&other_path, "still needed\n").unwrap();
    assert!(FileToolLogger::init(false, &other_path).is_err());
    assert_eq!(std::fs::read_to_string(&other_path).unwrap(), "still needed\n");
    assert_eq!(logger::log_file_path(), Some(log_path));
}
