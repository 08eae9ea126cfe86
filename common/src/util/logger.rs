use env_logger::{Builder, Env};
use std::io::Write;

/// Logging defaults to `info`; `RUST_LOG` overrides as usual.
pub fn init() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "[{:<5}] {}", record.level(), record.args())
        })
        .init();
}
