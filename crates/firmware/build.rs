#![allow(clippy::panic)]

fn main() {
    // Only run linker script setup for hardware builds
    #[cfg(feature = "hardware")]
    {
        use std::env;
        use std::fs;
        use std::path::PathBuf;

        // Put `memory.x` in our output directory and ensure it's on the linker search path.
        let Some(out) = env::var_os("OUT_DIR").map(PathBuf::from) else {
            panic!("OUT_DIR not set by cargo");
        };
        if let Err(err) = fs::write(out.join("memory.x"), include_bytes!("../../memory.x")) {
            panic!("could not write memory.x: {err}");
        }

        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rerun-if-changed=../../memory.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
