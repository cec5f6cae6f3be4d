use tracing::warn;

pub fn override_u16(key: &str, raw: Option<&str>, fallback: u16) -> u16 {
    let Some(raw) = raw else {
        return fallback;
    };
    match raw.trim().parse::<u16>() {
        Ok(value) => value,
        Err(error) => {
            warn!(key, raw, "ignoring invalid override: {error}");
            fallback
        }
    }
}
