use std::fs;
use std::path::PathBuf;

use arcode::{persist, run, run_decode, run_encode, ErrorKind, SegmentTable, Summary};

/// Fresh scratch directory per test.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("arcode-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_encode_then_decode_from_model_file() {
    let dir = scratch("model-file");
    let data: Vec<u8> = b"mississippi river banks, ".iter().copied().cycle().take(1000).collect();
    fs::write(dir.join("input.bin"), &data).unwrap();
    let table = dir.join("model.txt");
    fs::write(
        dir.join("enc.conf"),
        format!("target encode\nnum 4\ntable {}\n", table.display()),
    )
    .unwrap();
    fs::write(
        dir.join("dec.conf"),
        format!("target decode\ndecconf {}\n", table.display()),
    )
    .unwrap();

    let enc = run_encode(&dir.join("input.bin"), &dir.join("codes.txt"), &dir.join("enc.conf")).unwrap();
    assert_eq!(enc.text_len, 1000);
    assert_eq!(enc.codes, 250);
    let codes = fs::read_to_string(dir.join("codes.txt")).unwrap();
    assert_eq!(codes.lines().count(), 250);

    let stored = persist::load(&table).unwrap();
    assert_eq!(stored.block_size, 4);
    assert_eq!(stored.text_len, 1000);

    let dec = run_decode(&dir.join("codes.txt"), &dir.join("output.bin"), &dir.join("dec.conf")).unwrap();
    assert_eq!(dec.text_len, 1000);
    assert_eq!(dec.codes, 250);
    assert_eq!(fs::read(dir.join("output.bin")).unwrap(), data);
}

#[test]
fn test_run_dispatches_on_target() {
    let dir = scratch("dispatch");
    let data = b"ABBAABABBBA".to_vec();
    fs::write(dir.join("in"), &data).unwrap();
    let table = dir.join("model.txt");
    fs::write(
        dir.join("enc.conf"),
        format!("num=3\ntable={}\n", table.display()),
    )
    .unwrap();

    match run(&dir.join("in"), &dir.join("codes"), &dir.join("enc.conf")).unwrap() {
        Summary::Encode(s) => assert_eq!(s.codes, 4),
        other => panic!("unexpected: {:?}", other),
    }

    // The model file doubles as a decode configuration.
    let mut dec_conf = fs::read_to_string(&table).unwrap();
    dec_conf.push_str("target decode\n");
    fs::write(dir.join("dec.conf"), dec_conf).unwrap();

    match run(&dir.join("codes"), &dir.join("out"), &dir.join("dec.conf")).unwrap() {
        Summary::Decode(s) => assert_eq!(s.text_len, data.len()),
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(fs::read(dir.join("out")).unwrap(), data);
}

#[test]
fn test_decode_with_inline_model() {
    let dir = scratch("inline");
    fs::write(dir.join("codes"), "0.375\n0.625\n").unwrap();
    fs::write(
        dir.join("dec.conf"),
        "target decode\nnum 2\nlen 4\nprob 65 0.5\nprob 66 0.5\n",
    )
    .unwrap();
    run_decode(&dir.join("codes"), &dir.join("out"), &dir.join("dec.conf")).unwrap();
    assert_eq!(fs::read(dir.join("out")).unwrap(), b"ABBA");
}

#[test]
fn test_persisted_table_matches_direct() {
    let dir = scratch("persisted");
    let data: Vec<u8> = (0..=255u8).chain(0..100).collect();
    fs::write(dir.join("in"), &data).unwrap();
    let table = dir.join("model.txt");
    fs::write(dir.join("conf"), format!("num 2\ntable {}\n", table.display())).unwrap();
    run_encode(&dir.join("in"), &dir.join("codes"), &dir.join("conf")).unwrap();

    let direct = SegmentTable::derive(&arcode::ProbabilityModel::from_bytes(&data).unwrap()).unwrap();
    let reloaded = SegmentTable::derive(&persist::load(&table).unwrap().model).unwrap();
    assert_eq!(direct, reloaded);
}

#[test]
fn test_failures_are_typed() {
    let dir = scratch("failures");
    fs::write(dir.join("in"), b"abc").unwrap();

    fs::write(dir.join("no-num.conf"), "table model.txt\n").unwrap();
    let err = run_encode(&dir.join("in"), &dir.join("codes"), &dir.join("no-num.conf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    fs::write(dir.join("bad.conf"), "num 2\nfrobnicate 1\n").unwrap();
    let err = run_encode(&dir.join("in"), &dir.join("codes"), &dir.join("bad.conf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = run_encode(&dir.join("missing"), &dir.join("codes"), &dir.join("missing.conf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    fs::write(dir.join("empty"), b"").unwrap();
    fs::write(dir.join("ok.conf"), format!("num 2\ntable {}\n", dir.join("m").display())).unwrap();
    let err = run_encode(&dir.join("empty"), &dir.join("codes"), &dir.join("ok.conf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelIntegrity);

    fs::write(dir.join("codes"), "1.75\n").unwrap();
    fs::write(
        dir.join("dec.conf"),
        "target decode\nnum 2\nlen 2\nprob 65 0.5\nprob 66 0.5\n",
    )
    .unwrap();
    let err = run_decode(&dir.join("codes"), &dir.join("out"), &dir.join("dec.conf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeIntegrity);

    fs::write(dir.join("short"), "0.375\n").unwrap();
    fs::write(
        dir.join("dec4.conf"),
        "target decode\nnum 2\nlen 4\nprob 65 0.5\nprob 66 0.5\n",
    )
    .unwrap();
    let err = run_decode(&dir.join("short"), &dir.join("out"), &dir.join("dec4.conf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeIntegrity);
}
