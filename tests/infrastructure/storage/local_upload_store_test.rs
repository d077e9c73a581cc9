use offline_asr::application::ports::{UploadStore, UploadStoreError};
use offline_asr::infrastructure::storage::LocalUploadStore;

fn create_test_store() -> (tempfile::TempDir, LocalUploadStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LocalUploadStore::new(dir.path().join("uploads")).unwrap();
    (dir, store)
}

#[tokio::test]
async fn given_upload_with_filename_when_saving_then_file_keeps_extension() {
    let (_dir, store) = create_test_store();

    let path = store.save(b"RIFF....", Some("meeting.wav")).await.unwrap();

    assert_eq!(path.parent().unwrap(), store.base_path());
    assert_eq!(path.extension().unwrap(), "wav");
    assert_eq!(std::fs::read(&path).unwrap(), b"RIFF....");
}

#[tokio::test]
async fn given_upload_without_filename_when_saving_then_bin_extension_is_used() {
    let (_dir, store) = create_test_store();

    let path = store.save(b"data", None).await.unwrap();

    assert_eq!(path.extension().unwrap(), "bin");
}

#[tokio::test]
async fn given_two_uploads_with_same_name_when_saving_then_paths_differ() {
    let (_dir, store) = create_test_store();

    let first = store.save(b"a", Some("a.mp3")).await.unwrap();
    let second = store.save(b"b", Some("a.mp3")).await.unwrap();

    assert_ne!(first, second);
}

#[tokio::test]
async fn given_saved_upload_when_removing_then_file_is_gone() {
    let (_dir, store) = create_test_store();
    let path = store.save(b"data", Some("x.ogg")).await.unwrap();

    store.remove(&path).await.unwrap();

    assert!(!path.exists());
}

#[tokio::test]
async fn given_missing_file_when_removing_then_returns_delete_failed() {
    let (_dir, store) = create_test_store();

    let result = store.remove(&store.base_path().join("nope.wav")).await;

    assert!(matches!(result, Err(UploadStoreError::DeleteFailed(_))));
}
