use std::fs;
use std::path::Path;
use tempfile::TempDir;

use jackc_rust::compiler::{compile_source, CompilerOptions};
use jackc_rust::driver::{compile_path, DriverError};
use jackc_rust::lexer::LexerWarning;

const MAIN: &str = r#"
/** Prints 1 + (2 * 3). */
class Main {
    function void main() {
        do Output.printInt(1 + (2 * 3));
        return;
    }
}
"#;

const COUNTER: &str = r#"
class Counter {
    field int value;
    static int instances;

    constructor Counter new(int start) {
        let value = start;
        let instances = instances + 1;
        return this;
    }

    method void tick(int limit) {
        var int i;
        let i = 0;
        while (i < limit) {
            if (value > 100) {
                let value = 0;
            } else {
                let value = value + 1;
            }
            let i = i + 1;
        }
        return;
    }
}
"#;

/// Helper to lay out a directory of sources
fn write_sources(dir: &Path, files: &[(&str, &str)]) {
    for (name, text) in files {
        fs::write(dir.join(name), text).expect("failed to write source");
    }
}

#[test]
fn test_seven() {
    let out = compile_source(MAIN, CompilerOptions::default()).expect("Failed to compile Main");
    assert_eq!(
        out,
        "function Main.main 0\n\
         push constant 1\n\
         push constant 2\n\
         push constant 3\n\
         call Math.multiply 2\n\
         add\n\
         call Output.printInt 1\n\
         pop temp 0\n\
         push constant 0\n\
         return\n"
    );
}

#[test]
fn test_counter_control_flow() {
    let out = compile_source(COUNTER, CompilerOptions::default()).expect("Failed to compile Counter");
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "function Counter.new 0");
    assert!(lines.contains(&"function Counter.tick 1"));
    assert!(lines.contains(&"pop static 0"));
    assert!(lines.contains(&"push this 0"));

    // while uses L0/L1, the nested if L2/L3
    for label in ["L0", "L1", "L2", "L3"] {
        let defined = lines.iter().filter(|l| **l == format!("label {label}")).count();
        assert_eq!(defined, 1, "label {label} should be defined exactly once");
    }
    assert!(lines.contains(&"goto L0"));
    assert!(lines.contains(&"if-goto L1"));
    assert!(lines.contains(&"if-goto L2"));
    assert!(lines.contains(&"goto L3"));
}

#[test]
fn test_directory_batch() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_sources(
        dir.path(),
        &[("Main.jack", MAIN), ("Counter.jack", COUNTER), ("notes.txt", "ignored")],
    );

    let units = compile_path(dir.path(), None, CompilerOptions::default())
        .expect("Failed to compile directory");

    let names: Vec<String> = units
        .iter()
        .map(|u| u.output.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Counter.vm", "Main.vm"]);

    let main_vm = fs::read_to_string(dir.path().join("Main.vm")).unwrap();
    assert_eq!(main_vm, compile_source(MAIN, CompilerOptions::default()).unwrap());
    assert!(!dir.path().join("notes.vm").exists());
}

#[test]
fn test_labels_restart_per_unit() {
    let dir = TempDir::new().unwrap();
    let looping = "class A { function void f() { var int x; while (x) { let x = 0; } return; } }";
    write_sources(dir.path(), &[("A.jack", looping), ("B.jack", &looping.replace("class A", "class B"))]);

    compile_path(dir.path(), None, CompilerOptions::default()).unwrap();

    let a = fs::read_to_string(dir.path().join("A.vm")).unwrap();
    let b = fs::read_to_string(dir.path().join("B.vm")).unwrap();
    assert_eq!(a.replace("A.f", "B.f"), b);
}

#[test]
fn test_single_file_with_explicit_output() {
    let dir = TempDir::new().unwrap();
    write_sources(dir.path(), &[("Main.jack", MAIN)]);
    let target = dir.path().join("out.vm");

    let units = compile_path(&dir.path().join("Main.jack"), Some(&target), CompilerOptions::default())
        .unwrap();

    assert_eq!(units.len(), 1);
    assert_eq!(fs::read_to_string(&target).unwrap(), units[0].code);
    assert!(!dir.path().join("Main.vm").exists());
}

#[test]
fn test_failed_unit_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let broken = "class Broken { function int f() { return 10 / 2; } }";
    write_sources(dir.path(), &[("Broken.jack", broken)]);

    let err = compile_path(dir.path(), None, CompilerOptions::default()).unwrap_err();

    assert!(matches!(err, DriverError::Compile(..)), "{err}");
    assert!(err.to_string().contains("Broken.jack"));
    assert!(!dir.path().join("Broken.vm").exists());
}

#[test]
fn test_output_path_rejected_for_directory() {
    let dir = TempDir::new().unwrap();
    write_sources(dir.path(), &[("Main.jack", MAIN)]);

    let err = compile_path(dir.path(), Some(&dir.path().join("x.vm")), CompilerOptions::default())
        .unwrap_err();
    assert!(matches!(err, DriverError::OutputForDirectory(_)));
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let err = compile_path(dir.path(), None, CompilerOptions::default()).unwrap_err();
    assert!(matches!(err, DriverError::NoSources(_)));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = compile_path(&dir.path().join("Nope.jack"), None, CompilerOptions::default())
        .unwrap_err();
    assert!(matches!(err, DriverError::Io(..)));
}

#[test]
fn test_truncated_comment_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let source = format!("{MAIN}\n/* trailing comment never closed");
    write_sources(dir.path(), &[("Main.jack", &source)]);

    let units = compile_path(dir.path(), None, CompilerOptions::default()).unwrap();

    assert!(matches!(units[0].warnings.as_slice(), [LexerWarning::UnterminatedBlockComment(_)]));
    assert_eq!(units[0].code, compile_source(MAIN, CompilerOptions::default()).unwrap());
}

#[test]
fn test_corrected_options() {
    let source = r#"class Main {
        function void main() {
            var Array a;
            let a[1] = 2 + 3 + 4;
            do Output.printString("A");
            return;
        }
    }"#;

    assert!(compile_source(source, CompilerOptions::default()).is_err());

    let out = compile_source(source, CompilerOptions::corrected()).unwrap();
    assert_eq!(
        out,
        "function Main.main 1\n\
         push local 0\n\
         push constant 1\n\
         add\n\
         push constant 2\n\
         push constant 3\n\
         add\n\
         push constant 4\n\
         add\n\
         pop temp 0\n\
         pop pointer 1\n\
         push temp 0\n\
         pop that 0\n\
         push constant 1\n\
         call String.new 1\n\
         push constant 65\n\
         call String.appendChar 2\n\
         call Output.printString 1\n\
         pop temp 0\n\
         push constant 0\n\
         return\n"
    );
}
