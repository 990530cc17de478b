/// Display version information
pub fn execute() {
    println!("cosign {}", env!("CARGO_PKG_VERSION"));
    println!("m-of-n threshold authorization for shared funds");
    println!("State format version {}", cosign::store::SNAPSHOT_VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_execute() {
        // Version command should not panic
        execute();
    }
}
