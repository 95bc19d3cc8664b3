use std::io::Write;

/// Installs an `env_logger` reading `RUST_LOG`. Calling it again is harmless.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}:{}] {} - {}",
                buf.timestamp_millis(),
                record.module_path().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .try_init();
}
