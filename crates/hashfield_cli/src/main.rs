//! CLI probe for `hashfield_core`.
//!
//! Prints the core version, then one `<digest>  <value>` line per argument.

fn main() {
    println!("hashfield_core version={}", hashfield_core::core_version());
    for value in std::env::args().skip(1) {
        println!("{}  {}", hashfield_core::hash_text(&value), value);
    }
}
