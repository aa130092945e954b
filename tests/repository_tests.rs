//! Tests for FileDriverRepository
//!
//! These tests verify:
//! - The async find_all / find_created_after / save contract
//! - Errors surface through the returned futures
//! - Concurrent saves through cloned handles
//! - Use through the DriverRepository trait object

use std::fs;
use std::sync::Arc;

use chrono::NaiveDate;
use driverstore::config::Config;
use driverstore::error::ErrorKind;
use driverstore::record::{today, Driver};
use driverstore::repository::{DriverRepository, FileDriverRepository};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_temp_repository() -> (TempDir, FileDriverRepository) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().data_dir(temp_dir.path()).build();
    let repository = FileDriverRepository::open(&config).unwrap();
    (temp_dir, repository)
}

fn setup_repository_with(content: &str) -> (TempDir, FileDriverRepository) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("drivers.txt");
    fs::write(&path, content).unwrap();
    let repository = FileDriverRepository::open_path(&path).unwrap();
    (temp_dir, repository)
}

const TWO_DRIVERS: &str = "1;Jaime;Bergas;1984-05-15;2020-02-08\n2;Jane;Doe;1980-05-15;2018-02-08\n";

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_find_all() {
    let (_temp, repository) = setup_repository_with(TWO_DRIVERS);

    let drivers = repository.find_all().await.unwrap();

    assert_eq!(drivers.len(), 2);
    assert_eq!(
        drivers[0],
        Driver {
            id: Some(1),
            first_name: "Jaime".into(),
            last_name: "Bergas".into(),
            date_of_birth: date(1984, 5, 15),
            creation_date: date(2020, 2, 8),
        }
    );
    assert_eq!(
        drivers[1],
        Driver {
            id: Some(2),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            date_of_birth: date(1980, 5, 15),
            creation_date: date(2018, 2, 8),
        }
    );
}

#[tokio::test]
async fn test_find_created_after() {
    let (_temp, repository) = setup_repository_with(TWO_DRIVERS);

    let drivers = repository.find_created_after(date(2019, 1, 1)).await.unwrap();

    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0].id, Some(1));
    assert_eq!(drivers[0].first_name, "Jaime");
}

#[tokio::test]
async fn test_find_created_after_no_matches() {
    let (_temp, repository) = setup_repository_with(TWO_DRIVERS);

    let drivers = repository.find_created_after(date(2025, 1, 1)).await.unwrap();
    assert!(drivers.is_empty());
}

#[tokio::test]
async fn test_find_all_corrupt_file() {
    let (_temp, repository) =
        setup_repository_with("1;Jaime;Bergas;1984-05-15;2020-02-08\n2;Jane;Doe;1980-05-15\n");

    let err = repository.find_all().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptRecord);
    assert_eq!(err.to_error_msg().code, "technical.failure");

    let err = repository.find_created_after(date(2000, 1, 1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptRecord);
}

// =============================================================================
// Save Tests
// =============================================================================

#[tokio::test]
async fn test_save_on_empty_file() {
    let (_temp, repository) = setup_temp_repository();

    let driver = Driver::new("New", "Driver", date(1990, 12, 12));
    let saved = repository.save(driver).await.unwrap();

    assert_eq!(saved.id, Some(1));
    assert_eq!(saved.first_name, "New");
    assert_eq!(saved.creation_date, today());

    let expected = format!("1;New;Driver;1990-12-12;{}\n", today().format("%Y-%m-%d"));
    assert_eq!(fs::read_to_string(repository.path()).unwrap(), expected);
}

#[tokio::test]
async fn test_save_then_find() {
    let (_temp, repository) = setup_repository_with(TWO_DRIVERS);

    let saved = repository
        .save(Driver::new("Ana", "Ruiz", date(2001, 7, 4)).with_creation_date(date(2023, 5, 6)))
        .await
        .unwrap();
    assert_eq!(saved.id, Some(3));

    let all = repository.find_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2], saved);

    let recent = repository.find_created_after(date(2021, 1, 1)).await.unwrap();
    assert_eq!(recent, vec![saved]);
}

#[tokio::test]
async fn test_save_bad_input() {
    let (_temp, repository) = setup_temp_repository();

    let err = repository
        .save(Driver::new("New", "Dri\nver", date(1990, 12, 12)))
        .await
        .unwrap_err();

    assert!(err.is_bad_input());
    assert!(repository.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_corrupt_tail() {
    let (_temp, repository) = setup_repository_with("not-a-record\n");

    let err = repository
        .save(Driver::new("New", "Driver", date(1990, 12, 12)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CorruptRecord);
    assert_eq!(fs::read_to_string(repository.path()).unwrap(), "not-a-record\n");
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_unique_ids() {
    let (_temp, repository) = setup_temp_repository();

    let mut tasks = Vec::new();
    for i in 0..50 {
        let repository = repository.clone();
        tasks.push(tokio::spawn(async move {
            repository
                .save(Driver::new(format!("Driver{}", i), "Concurrent", date(1990, 1, 1)))
                .await
                .unwrap()
                .id
                .unwrap()
        }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=50).collect::<Vec<u64>>());

    let report = repository.verify().await.unwrap();
    assert_eq!(report.records, 50);
    assert_eq!(report.last_id, Some(50));
    assert!(report.is_monotonic());
}

// =============================================================================
// Trait Object Tests
// =============================================================================

#[tokio::test]
async fn test_repository_as_trait_object() {
    let (_temp, repository) = setup_temp_repository();
    let repository: Arc<dyn DriverRepository> = Arc::new(repository);

    let saved = repository
        .save(Driver::new("Dyn", "Driver", date(1995, 6, 1)).with_creation_date(date(2024, 1, 1)))
        .await
        .unwrap();

    assert_eq!(saved.id, Some(1));
    assert_eq!(repository.find_all().await.unwrap(), vec![saved]);
}
