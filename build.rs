//! Compiles the sample extension the integration tests load.
//!
//! The module is built against the `sqlite3ext.h` shipped with the bundled
//! SQLite and written to `$OUT_DIR/sample0.<suffix>`; its path reaches the
//! crate as `SQLITE_SMOKE_SAMPLE_EXTENSION`.

use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let include = env::var("DEP_SQLITE3_INCLUDE").unwrap();
    let suffix = match env::var("CARGO_CFG_TARGET_OS").unwrap().as_str() {
        "macos" => "dylib",
        "windows" => "dll",
        _ => "so",
    };
    let output = out_dir.join(format!("sample0.{}", suffix));

    let mut build = cc::Build::new();
    build.include(&include).cargo_metadata(false);
    let compiler = build.get_compiler();

    let mut cmd = compiler.to_command();
    if compiler.is_like_msvc() {
        cmd.arg("/LD")
            .arg("tests/fixtures/sqlite-sample.c")
            .arg(format!("/Fo{}\\", out_dir.display()))
            .arg(format!("/Fe{}", output.display()));
    } else {
        if suffix == "dylib" {
            cmd.arg("-dynamiclib");
        } else {
            cmd.arg("-shared").arg("-fPIC");
        }
        cmd.arg("-Wno-unused-parameter")
            .arg("tests/fixtures/sqlite-sample.c")
            .arg("-o")
            .arg(&output);
    }

    let status = cmd.status().unwrap();
    assert!(status.success(), "failed to compile the sample extension");

    println!(
        "cargo:rustc-env=SQLITE_SMOKE_SAMPLE_EXTENSION={}",
        output.display()
    );
    println!("cargo:rerun-if-changed=tests/fixtures/sqlite-sample.c");
}
