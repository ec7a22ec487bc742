fn main() {
    let manifest_dir = std::path::PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    let fixtures = manifest_dir.join("../../bnd-win32/tests/fixtures");

    // Generate the fixture corpus (X64) into src/win32/, one module per namespace.
    let out = manifest_dir.join("src/win32");
    bnd_win32::run(&fixtures.join("bnd-win32.toml"), Some(&out)).expect("bnd-win32 failed");

    // Rerun if sources change
    println!("cargo:rerun-if-changed=../../bnd-win32/tests/fixtures/");
    println!("cargo:rerun-if-changed=../../bnd-win32/src/");
}
