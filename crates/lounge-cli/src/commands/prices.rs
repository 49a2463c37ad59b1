//! Prices commands: show and set hourly rates.

use std::io::Write;

use anyhow::{Context, Result};
use lounge_db::Database;

use crate::PricesAction;

use super::util::load_lounge;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, action: &PricesAction) -> Result<()> {
    let mut lounge = load_lounge(db)?;
    match action {
        PricesAction::Show { json } => {
            let rates = lounge.prices().rates();
            if *json {
                serde_json::to_writer_pretty(&mut *writer, &rates)?;
                writeln!(writer)?;
            } else if rates.is_empty() {
                writeln!(writer, "No rates configured. Set one with: lounge prices set")?;
            } else {
                for rate in rates {
                    writeln!(
                        writer,
                        "{device_type} {game_type:<7} {rate:>8.2}/hr",
                        device_type = rate.device_type,
                        game_type = rate.game_type,
                        rate = rate.rate_per_hour,
                    )?;
                }
            }
        }
        PricesAction::Set {
            device_type,
            game,
            rate,
        } => {
            lounge.set_rate(*device_type, *game, *rate);
            db.replace_prices(lounge.prices())?;
            let stored = lounge
                .prices()
                .rate(*device_type, *game)
                .context("rate was just set")?;
            writeln!(writer, "{device_type} {game} is now {stored:.2}/hr")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lounge_core::{DeviceType, GameType};

    #[test]
    fn test_set_then_show() {
        let mut db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        run(
            &mut out,
            &mut db,
            &PricesAction::Set {
                device_type: DeviceType::Ps5,
                game: GameType::Double,
                rate: 30.0,
            },
        )
        .unwrap();

        let mut out = Vec::new();
        run(&mut out, &mut db, &PricesAction::Show { json: false }).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("ps5 double"));
        assert!(out.contains("30.00/hr"));
    }

    #[test]
    fn test_set_negative_rate_clamps_to_zero() {
        let mut db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        run(
            &mut out,
            &mut db,
            &PricesAction::Set {
                device_type: DeviceType::Ps4,
                game: GameType::Quad,
                rate: -5.0,
            },
        )
        .unwrap();

        let stored = db.load_prices().unwrap();
        assert_eq!(stored.rate(DeviceType::Ps4, GameType::Quad), Some(0.0));
    }

    #[test]
    fn test_show_json_structure() {
        let mut db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        run(
            &mut out,
            &mut db,
            &PricesAction::Set {
                device_type: DeviceType::Ps4,
                game: GameType::Single,
                rate: 20.0,
            },
        )
        .unwrap();

        let mut out = Vec::new();
        run(&mut out, &mut db, &PricesAction::Show { json: true }).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["device_type"], serde_json::json!("ps4"));
        assert_eq!(parsed[0]["game_type"], serde_json::json!("single"));
        assert_eq!(parsed[0]["rate_per_hour"], serde_json::json!(20.0));
    }

    #[test]
    fn test_show_empty_table() {
        let mut db = Database::open_in_memory().unwrap();
        let mut out = Vec::new();
        run(&mut out, &mut db, &PricesAction::Show { json: false }).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No rates configured"));
    }
}
