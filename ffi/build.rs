//! Generate `fetchkit.h` from the `extern "C"` surface.
//!
//! The header goes to `OUT_DIR`, so a build never touches the checkout. Set
//! `FETCHKIT_HEADER_DIR` to also copy it somewhere a host build can find it.
//! Header generation never fails the build: hosts that do not need the
//! header still get a library.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=FETCHKIT_HEADER_DIR");

    let Ok(crate_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR unset, header not written");
        return;
    };
    let Ok(out_dir) = env::var("OUT_DIR") else {
        println!("cargo:warning=OUT_DIR unset, header not written");
        return;
    };
    let out = PathBuf::from(out_dir).join("fetchkit.h");
    println!("cargo:rustc-env=FETCHKIT_HEADER={}", out.display());

    let config = cbindgen::Config {
        language: cbindgen::Language::C,
        include_guard: Some("FETCHKIT_H".to_string()),
        cpp_compat: true,
        ..Default::default()
    };

    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=cbindgen failed, header not written: {e}");
            return;
        }
    };
    bindings.write_to_file(&out);

    if let Ok(dir) = env::var("FETCHKIT_HEADER_DIR") {
        let dir = PathBuf::from(dir);
        let copied = std::fs::create_dir_all(&dir).and_then(|_| std::fs::copy(&out, dir.join("fetchkit.h")));
        if let Err(e) = copied {
            println!("cargo:warning=cannot copy header to {}: {e}", dir.display());
        }
    }
}
