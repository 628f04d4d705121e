pub mod utils {
    use lscript_driver::{Compiler, Conf};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    pub fn program(file: &str) -> (String, Option<String>) {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("programs");
        let source = std::fs::read_to_string(dir.join(format!("{}.ls", file)))
            .unwrap_or_else(|err| panic!("cannot read {}.ls: {}", file, err));
        let output = std::fs::read_to_string(dir.join(format!("{}.out", file))).ok();
        (source, output)
    }

    /// Runs `file` optimized, unoptimized and in direct style, and checks
    /// that all three agree with `expected` and the recorded output.
    pub fn wrapper_run(file: &str, expected: &str, direct: bool) {
        let (source, output) = program(file);
        let compilers = [
            ("optimized", Compiler::default()),
            ("unoptimized", Compiler::new(Conf { optimize: false, ..Conf::default() })),
        ];
        for (label, compiler) in compilers {
            let mut out = Vec::new();
            match compiler.run_to(&source, &mut out) {
                | Ok(value) => assert_eq!(value.to_string(), expected, "{} ({})", file, label),
                | Err(err) => panic!("{} ({}): {}", file, label, err),
            }
            if let Some(output) = &output {
                assert_eq!(&String::from_utf8_lossy(&out), output, "{} ({})", file, label);
            }
        }
        if direct {
            let mut out = Vec::new();
            match Compiler::default().run_direct_to(&source, &mut out) {
                | Ok(value) => assert_eq!(value.to_string(), expected, "{} (direct)", file),
                | Err(err) => panic!("{} (direct): {}", file, err),
            }
        }
    }
}

/// `run_program!(test_name, "file", "display form of the result")`; add
/// `cps_only` for programs whose non-tail recursion is too deep for the
/// direct-style evaluator.
#[macro_export]
macro_rules! run_program {
    ($name:ident, $file:expr, $expected:expr) => {
        #[test]
        fn $name() {
            ::lscript_tests::utils::wrapper_run($file, $expected, true);
        }
    };
    ($name:ident, $file:expr, $expected:expr, cps_only) => {
        #[test]
        fn $name() {
            ::lscript_tests::utils::wrapper_run($file, $expected, false);
        }
    };
}
