//! Shared helpers for command implementations.

use anyhow::{Result, bail};
use lounge_core::Lounge;
use lounge_db::Database;

/// Loads the full stored state into a fresh engine.
pub fn load_lounge(db: &Database) -> Result<Lounge> {
    Ok(Lounge::from_state(
        db.load_registry()?,
        db.list_sessions()?,
        db.load_prices()?,
        db.load_ledger()?,
    ))
}

/// Resolves an operator-typed device reference to a device id.
///
/// Accepts a full id, a unique id prefix, or an exact name.
pub fn resolve_device(lounge: &Lounge, reference: &str) -> Result<String> {
    if lounge.device(reference).is_ok() {
        return Ok(reference.to_string());
    }
    let by_name: Vec<&str> = lounge
        .devices()
        .filter(|d| d.name == reference)
        .map(|d| d.id.as_str())
        .collect();
    if let [id] = by_name[..] {
        return Ok(id.to_string());
    }
    let by_prefix: Vec<&str> = lounge
        .devices()
        .filter(|d| d.id.starts_with(reference))
        .map(|d| d.id.as_str())
        .collect();
    match by_prefix[..] {
        [id] => Ok(id.to_string()),
        [] => bail!("no device matches '{reference}'"),
        _ => bail!(
            "'{reference}' is ambiguous ({} devices match)",
            by_prefix.len()
        ),
    }
}

/// Formats elapsed/remaining milliseconds as "Xh Ym" or "Xm".
#[must_use]
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m".to_string();
    }
    let total_minutes = ms / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lounge_core::DeviceType;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59_999), "0m");
        assert_eq!(format_duration(45 * 60_000), "45m");
        assert_eq!(format_duration(95 * 60_000), "1h 35m");
        assert_eq!(format_duration(-5), "0m");
    }

    #[test]
    fn test_resolve_device_by_id_prefix_and_name() {
        let mut lounge = Lounge::new();
        let id = lounge.add_device("Station 1".to_string(), DeviceType::Ps4).id;

        assert_eq!(resolve_device(&lounge, &id).unwrap(), id);
        assert_eq!(resolve_device(&lounge, &id[..8]).unwrap(), id);
        assert_eq!(resolve_device(&lounge, "Station 1").unwrap(), id);
        assert!(resolve_device(&lounge, "nope").is_err());
    }

    #[test]
    fn test_resolve_device_ambiguous_prefix() {
        let mut lounge = Lounge::new();
        lounge.add_device("A".to_string(), DeviceType::Ps4);
        lounge.add_device("B".to_string(), DeviceType::Ps4);
        // every uuid shares the empty prefix
        assert!(resolve_device(&lounge, "").is_err());
    }
}
