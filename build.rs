use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/ffi.rs");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };

    let mut config = cbindgen::Config::default();
    config.language = cbindgen::Language::C;
    config.include_guard = Some("KICKTRIGGER_H".to_string());

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            let include_dir = crate_dir.join("include");
            if let Err(err) = std::fs::create_dir_all(&include_dir) {
                println!("cargo:warning=cannot create {}: {}", include_dir.display(), err);
                return;
            }
            bindings.write_to_file(include_dir.join("kicktrigger.h"));
        }
        Err(err) => println!("cargo:warning=C header not generated: {}", err),
    }
}
