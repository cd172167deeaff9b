// build.rs

use std::env;
use std::fmt::Write;
use std::fs;
use std::path::Path;

const CONSTANT_PREFIX: &str = "METADATA_";

fn main() {
    let constant_map = [
        ("CARGO_CFG_TARGET_ARCH", "BUILD_ARCH"),
        ("TARGET", "BUILD_TARGET"),
        ("PROFILE", "PROFILE"),
    ];
    let out_dir = env::var_os("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest_path = Path::new(&out_dir).join("metadata_constants.rs");

    let mut constants = String::new();
    for (key, name) in constant_map {
        let value = env::var(key).unwrap_or_default();
        writeln!(
            constants,
            "pub const {}{}: &str = {:?};",
            CONSTANT_PREFIX, name, value
        )
        .unwrap();
    }
    writeln!(
        constants,
        "pub const {}VERSION: Option<&str> = option_env!(\"CARGO_PKG_VERSION\");",
        CONSTANT_PREFIX
    )
    .unwrap();

    fs::write(&dest_path, constants).unwrap();
    println!("cargo:rerun-if-changed=build.rs");
}
