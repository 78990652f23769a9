use clap::Parser;
use fdup::cli::Cli;
use fdup::error::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// a/1.txt and a/2.txt hold "hello", b/3.txt holds "world".
fn hello_world_tree() -> TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("a/1.txt"), b"hello").unwrap();
    fs::write(dir.path().join("a/2.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b/3.txt"), b"world").unwrap();
    dir
}

fn run(args: &[&str], root: &Path) -> (ExitCode, Vec<u8>) {
    let mut argv = vec!["fdup"];
    argv.extend_from_slice(args);
    argv.push(root.to_str().unwrap());

    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let code = fdup::run_app_with_writer(cli, &mut out).unwrap();
    (code, out)
}

#[test]
fn test_nul_output_lists_only_later_occurrences() {
    let dir = hello_world_tree();

    let (code, out) = run(&[], dir.path());

    assert_eq!(code, ExitCode::Success);
    let expected = format!("{}\0", dir.path().join("a/2.txt").display());
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_verbose_output_pairs_with_first_occurrence() {
    let dir = hello_world_tree();

    let (code, out) = run(&["-v"], dir.path());

    assert_eq!(code, ExitCode::Success);
    let expected = format!(
        "First occurence: Other occurence\n{}: {}\n",
        dir.path().join("a/1.txt").display(),
        dir.path().join("a/2.txt").display()
    );
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_no_duplicates_produces_empty_output() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"one").unwrap();
    fs::write(dir.path().join("y"), b"two").unwrap();

    let (code, out) = run(&[], dir.path());
    assert_eq!(code, ExitCode::Success);
    assert!(out.is_empty());

    // Verbose mode still prints its header.
    let (_, out) = run(&["--verbose"], dir.path());
    assert_eq!(out, b"First occurence: Other occurence\n");
}

#[test]
fn test_missing_root_exits_with_invalid_root() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let (code, out) = run(&[], &missing);

    assert_eq!(code, ExitCode::InvalidRoot);
    assert_eq!(code.as_i32(), 2);
    assert!(out.is_empty());
}

#[test]
fn test_file_root_exits_with_invalid_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"not a directory").unwrap();

    for args in [&[][..], &["-v"][..], &["--strategy", "streaming"][..], &["--json"][..]] {
        let (code, out) = run(args, &file);
        assert_eq!(code, ExitCode::InvalidRoot);
        assert!(out.is_empty());
    }
}

#[test]
fn test_streaming_strategy_matches_full_map() {
    let dir = hello_world_tree();
    fs::create_dir_all(dir.path().join("c/d")).unwrap();
    fs::write(dir.path().join("c/d/5.txt"), b"world").unwrap();
    fs::write(dir.path().join("c/6.txt"), b"hello").unwrap();

    let (_, full_map) = run(&["-v"], dir.path());
    let (_, streaming) = run(&["-v", "--strategy", "streaming"], dir.path());

    let mut full_lines: Vec<_> = String::from_utf8(full_map).unwrap().lines().map(String::from).collect();
    let mut stream_lines: Vec<_> = String::from_utf8(streaming).unwrap().lines().map(String::from).collect();
    assert_eq!(full_lines[0], stream_lines[0]);
    full_lines.sort();
    stream_lines.sort();
    assert_eq!(full_lines, stream_lines);
    assert_eq!(full_lines.len(), 4);
}

#[test]
fn test_threads_do_not_change_output() {
    let dir = hello_world_tree();
    for i in 0..30 {
        fs::write(dir.path().join(format!("f{i:02}")), format!("{}", i % 4)).unwrap();
    }

    let (_, sequential) = run(&[], dir.path());
    let (_, parallel) = run(&["--threads", "4"], dir.path());

    assert_eq!(sequential, parallel);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = hello_world_tree();
    fs::write(dir.path().join("b/4.txt"), b"hello").unwrap();

    let (_, first) = run(&["-v"], dir.path());
    let (_, second) = run(&["-v"], dir.path());

    assert_eq!(first, second);
}

#[test]
fn test_json_output_parses() {
    let dir = hello_world_tree();

    let (code, out) = run(&["--json"], dir.path());
    assert_eq!(code, ExitCode::Success);

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let groups = value["duplicates"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["files"].as_array().unwrap().len(), 2);
    assert_eq!(value["summary"]["total_files"], 3);
    assert_eq!(value["summary"]["exit_code"], 0);
}

#[cfg(unix)]
#[test]
fn test_keep_going_skips_unreadable_files() {
    use std::os::unix::fs::PermissionsExt;

    let dir = hello_world_tree();
    let locked = dir.path().join("b/locked.txt");
    fs::write(&locked, b"hello").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&locked).is_ok() {
        // Running with privileges that ignore file modes
        return;
    }

    let cli = Cli::try_parse_from(["fdup", dir.path().to_str().unwrap()]).unwrap();
    let mut out = Vec::new();
    assert!(fdup::run_app_with_writer(cli, &mut out).is_err());
    assert!(out.is_empty());

    let (code, out) = run(&["--keep-going"], dir.path());
    assert_eq!(code, ExitCode::Success);
    let expected = format!("{}\0", dir.path().join("a/2.txt").display());
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[cfg(unix)]
#[test]
fn test_non_utf8_file_names_are_written_raw() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let name = OsStr::from_bytes(&[b'z', 0xff, 0xfe]);
    if fs::write(dir.path().join(name), b"same").is_err() {
        return;
    }
    fs::write(dir.path().join("a"), b"same").unwrap();

    let (code, out) = run(&[], dir.path());

    assert_eq!(code, ExitCode::Success);
    let mut expected = dir.path().join(name).as_os_str().as_bytes().to_vec();
    expected.push(0);
    assert_eq!(out, expected);
}

#[cfg(target_os = "linux")]
#[test]
fn test_read_error_exits_with_nothing_on_stdout() {
    let dir = hello_world_tree();
    // Opens as a regular file, then fails with EIO on read
    std::os::unix::fs::symlink("/proc/self/mem", dir.path().join("b/0_mem")).unwrap();

    for args in [&[][..], &["-v"][..], &["--json"][..], &["--threads", "4"][..]] {
        let mut argv = vec!["fdup"];
        argv.extend_from_slice(args);
        argv.push(dir.path().to_str().unwrap());
        let cli = Cli::try_parse_from(argv).unwrap();

        let mut out = Vec::new();
        let err = fdup::run_app_with_writer(cli, &mut out).unwrap_err();
        assert!(format!("{:#}", err).contains("0_mem"));
        assert!(out.is_empty());
    }

    let (code, out) = run(&["--keep-going"], dir.path());
    assert_eq!(code, ExitCode::Success);
    let expected = format!("{}\0", dir.path().join("a/2.txt").display());
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}
