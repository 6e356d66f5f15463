use time::format_description;
use time::OffsetDateTime;

/// Stamp `var` into the crate, honoring an override from the environment.
fn stamp(var: &str, now: OffsetDateTime, pattern: &str) {
    let value = std::env::var(var).unwrap_or_else(|_| {
        format_description::parse(pattern)
            .ok()
            .and_then(|fmt| now.format(&fmt).ok())
            .unwrap_or_else(|| "unknown".to_string())
    });
    println!("cargo:rustc-env={}={}", var, value);
    println!("cargo:rerun-if-env-changed={}", var);
}

fn main() {
    let now = OffsetDateTime::now_utc();
    stamp("CRAZYFILE_BUILD_DATE", now, "[month repr:short] [day padding:space] [year]");
    stamp("CRAZYFILE_BUILD_TIME", now, "[hour]:[minute]:[second]");
}
