//! Report command: daily revenue view and the ledger wipe.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use lounge_db::Database;

use crate::ReportAction;

use super::util::load_lounge;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    date: Option<NaiveDate>,
    json: bool,
    action: Option<&ReportAction>,
    now: DateTime<Utc>,
) -> Result<()> {
    if let Some(ReportAction::Clear { yes }) = action {
        return clear(writer, db, *yes);
    }

    let lounge = load_lounge(db)?;
    let date = date.unwrap_or_else(|| now.date_naive());
    let reports = lounge.reports_on(date);
    let revenue = lounge.reports().revenue_for(date);

    if json {
        serde_json::to_writer_pretty(&mut *writer, &reports)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Report for {date}")?;
    if reports.is_empty() {
        writeln!(writer, "  No sessions.")?;
        return Ok(());
    }
    for report in &reports {
        let name = lounge
            .device(&report.device_id)
            .map_or_else(|_| report.device_id.clone(), |d| d.name.clone());
        writeln!(
            writer,
            "  {start}-{end}  {name}  {game:<7} {minutes:>4} min  {cost:>8.2}",
            start = report.start_time.format("%H:%M"),
            end = report.end_time.format("%H:%M"),
            game = report.game_type,
            minutes = report.duration_minutes,
            cost = report.cost,
        )?;
    }
    writeln!(writer, "  Total: {revenue:.2} over {} sessions", reports.len())?;
    Ok(())
}

fn clear<W: Write>(writer: &mut W, db: &Database, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to delete all reports without --yes");
    }
    let removed = db.delete_all_reports()?;
    writeln!(writer, "Deleted {removed} reports.")?;
    Ok(())
}
