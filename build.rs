fn main() {
    // The default build ships the in-process software backend and links
    // nothing. Only the `system` feature pulls in the native middleware.
    if std::env::var_os("CARGO_FEATURE_SYSTEM").is_some() {
        if let Ok(dir) = std::env::var("OPENNI_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir);
        }
        println!("cargo:rustc-link-lib=dylib=OpenNI");
    }
    println!("cargo:rerun-if-env-changed=OPENNI_LIB_DIR");
}
