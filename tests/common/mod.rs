use std::env;
use std::fs;
use std::path::Path;

use classbrew::{JVMClassFile, JVMParser};

/// Reads a fixture from the `support` directory.
#[allow(dead_code)]
pub fn read_class_file(name: &str) -> Vec<u8> {
    let env_var = env::var("CARGO_MANIFEST_DIR").unwrap();
    let path = Path::new(&env_var).join("support").join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

pub fn parse_fixture(name: &str) -> JVMClassFile {
    JVMParser::parse(&read_class_file(name)).unwrap()
}
