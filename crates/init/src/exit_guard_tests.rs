use super::*;

#[test]
fn drop_removes_tmp_dir_and_pid_file() {
    let dir = tempfile::tempdir().unwrap();
    let tmp_dir = dir.path().join("run-tmp");
    std::fs::create_dir_all(&tmp_dir).unwrap();
    let pid_file = dir.path().join("instance.pid");
    std::fs::write(&pid_file, b"1234").unwrap();

    {
        let _guard = ExitGuard::new(tmp_dir.clone(), pid_file.clone());
    }

    assert!(!tmp_dir.exists());
    assert!(!pid_file.exists());
}

#[test]
fn drop_tolerates_already_missing_paths() {
    let dir = tempfile::tempdir().unwrap();
    let tmp_dir = dir.path().join("never-created");
    let pid_file = dir.path().join("never-created.pid");

    let guard = ExitGuard::new(tmp_dir, pid_file);
    drop(guard);
}
