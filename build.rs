// Location: build.rs

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=LLAMA_BIND_LIB_DIR");

    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    if let Some(dir) = env::var_os("LLAMA_BIND_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }

    println!("cargo:rustc-link-lib=static=binding");
    println!("cargo:rustc-link-lib=llama");
    println!("cargo:rustc-link-lib=m");

    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("macos") {
        println!("cargo:rustc-link-lib=c++");
    } else {
        println!("cargo:rustc-link-lib=stdc++");
    }
}
