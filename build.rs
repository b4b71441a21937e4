//! Build script for twocaptcha
//!
//! Generates C header file when the `ffi` feature is enabled.

fn main() {
    // Only generate headers when ffi feature is enabled
    #[cfg(feature = "ffi")]
    {
        let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();

        let include_dir = std::path::Path::new(&crate_dir).join("include");
        std::fs::create_dir_all(&include_dir).ok();

        let config = cbindgen::Config::from_file("cbindgen.toml").unwrap_or_default();

        cbindgen::Builder::new()
            .with_crate(&crate_dir)
            .with_config(config)
            .with_language(cbindgen::Language::C)
            .generate()
            .map(|bindings| {
                bindings.write_to_file(include_dir.join("twocaptcha.h"));
            })
            .ok();
    }
}
