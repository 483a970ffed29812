//! End-to-end tests of the audiosum binary

use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn audiosum(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_audiosum"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("AUDIOSUM_ALGORITHM")
        .env_remove("AUDIOSUM_JOBS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start audiosum");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn id3v1_tag(title: &[u8]) -> Vec<u8> {
    let mut tag = b"TAG".to_vec();
    tag.extend_from_slice(title);
    tag.resize(128, 0);
    tag
}

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, data).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_same_audio_different_tags() {
    let dir = TempDir::new().unwrap();
    let audio = vec![0x5Au8; 1000];

    let mut plain = audio.clone();
    plain.extend(id3v1_tag(b"one"));
    let mut tagged = b"ID3\x03\x00\x00\x00\x00\x00\x0A".to_vec();
    tagged.extend_from_slice(&[0u8; 10]);
    tagged.extend_from_slice(&audio);
    tagged.extend(id3v1_tag(b"two"));

    let a = write_file(&dir, "a.mp3", &plain);
    let b = write_file(&dir, "b.mp3", &tagged);
    let output = audiosum(&[], &format!("{}\n{}\n", a, b));

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(&format!("[I3v1] [----] [----] [----] {}", a)));
    assert!(lines[1].ends_with(&format!("[I3v1] [I3v2] [----] [----] {}", b)));

    let digest = |line: &str| line.split(' ').take(2).collect::<Vec<_>>().join(" ");
    assert_eq!(digest(lines[0]), digest(lines[1]));
    assert!(lines[0].starts_with("000003e8 "));
}

#[test]
fn test_brief_mode() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "x.mp3", &vec![0x11u8; 200]);
    let output = audiosum(&["-b"], &format!("{}\n", path));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, format!("000000c8  [----] [----] [----] [----] {}\n", path));
}

#[test]
fn test_missing_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    let good = write_file(&dir, "good.mp3", &vec![0x11u8; 200]);
    let missing = dir.path().join("nope.mp3").to_string_lossy().into_owned();
    let output = audiosum(&["-a", "crc32"], &format!("{}\n{}\n", missing, good));

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains(&good));
    assert!(stderr.contains(&missing));
}

#[test]
fn test_unsupported_algorithm_exits_nonzero() {
    let output = audiosum(&["--algorithm", "rot13"], "");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr).unwrap().contains("rot13"));
}

#[test]
fn test_list_algorithms() {
    let output = audiosum(&["--list-algorithms"], "");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("sha256"));
    assert!(stdout.contains("blake3"));
}
