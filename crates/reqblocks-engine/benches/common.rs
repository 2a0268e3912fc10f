// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_requirements(count: usize) -> String {
    let base = "req: 1 while aircraft status is in air and left gear state becomes hazardous\nthe LGS Warning System shall set left gear warning lamp to on within 2 seconds\n\n";
    base.repeat(count)
}

#[allow(dead_code)]
pub fn generate_plain_words(words: usize, per_line: usize) -> String {
    let mut content = String::new();
    for word in 0..words {
        content.push_str(&format!("word{word}"));
        content.push(if (word + 1) % per_line == 0 { '\n' } else { ' ' });
    }
    content
}
