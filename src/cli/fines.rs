use chrono::{Local, NaiveDate};
use colored::Colorize;
use comfy_table::{Cell, Table};

use super::open_workspace;
use crate::error::Result;
use crate::fines::{Fine, FineAction, FineStatus, NewFine};
use crate::fmt::{money, truncate};
use crate::summary::Applied;

fn status_cell(status: FineStatus) -> Cell {
    let label = status.as_str();
    match status {
        FineStatus::Pending => Cell::new(label.yellow()),
        FineStatus::Approved => Cell::new(label.red()),
        FineStatus::Rejected => Cell::new(label.dimmed()),
        FineStatus::Deducted => Cell::new(label.green()),
    }
}

fn fines_table(fines: &[&Fine]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Date", "Employee", "Department", "Reason", "Amount", "Status", "Comment",
    ]);
    for fine in fines {
        table.add_row(vec![
            Cell::new(fine.id),
            Cell::new(fine.date),
            Cell::new(format!("{} ({})", fine.employee_name, fine.employee_id)),
            Cell::new(&fine.department),
            Cell::new(truncate(&fine.reason, 30)),
            Cell::new(money(fine.amount)),
            status_cell(fine.status),
            Cell::new(truncate(fine.manager_comment.as_deref().unwrap_or(""), 30)),
        ]);
    }
    table
}

pub fn add(
    employee_id: &str,
    name: &str,
    department: &str,
    amount: f64,
    reason: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let mut ws = open_workspace()?;
    let id = ws.add_fine(NewFine {
        employee_id: employee_id.to_string(),
        employee_name: name.to_string(),
        department: department.to_string(),
        amount,
        reason: reason.to_string(),
        date: date.unwrap_or_else(|| Local::now().date_naive()),
    })?;
    println!("Added fine #{id}: {} for {name} ({reason})", money(amount));
    Ok(())
}

/// Run one workflow action and report the outcome.
pub fn apply(action: FineAction) -> Result<()> {
    let mut ws = open_workspace()?;
    let id = action.id();
    let cancelled = matches!(action, FineAction::Cancel { .. });
    match ws.apply_fine(action)? {
        Applied::NotFound => println!("No fine #{id}."),
        Applied::Updated if cancelled => println!("Cancelled fine #{id}."),
        Applied::Updated => {
            if let Some(fine) = ws.fines().get(id) {
                println!("Fine #{id} is now {}.", fine.status.as_str().bold());
            }
        }
    }
    Ok(())
}

pub fn list(status: Option<FineStatus>) -> Result<()> {
    let ws = open_workspace()?;
    let fines: Vec<&Fine> = match status {
        Some(s) => ws.fines().with_status(s),
        None => ws.fines().all().iter().collect(),
    };
    if fines.is_empty() {
        println!("No fines found.");
        return Ok(());
    }
    let title = match status {
        Some(s) => format!("Fines ({s})"),
        None => "Fines".to_string(),
    };
    println!("{title}\n{}", fines_table(&fines));
    Ok(())
}

pub fn summary() -> Result<()> {
    let ws = open_workspace()?;
    let summaries = ws.fines().summaries();
    if summaries.is_empty() {
        println!("No fines found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Employee", "Name", "Department", "Fines", "Awaiting Review", "Active", "Total", "Deducted",
        "Next Deduction", "Latest",
    ]);
    for s in &summaries {
        table.add_row(vec![
            Cell::new(&s.employee_id),
            Cell::new(&s.employee_name),
            Cell::new(&s.department),
            Cell::new(s.fine_count),
            Cell::new(s.count(FineStatus::Pending)),
            Cell::new(s.active_fines),
            Cell::new(money(s.total_fines)),
            Cell::new(money(s.total_deducted)),
            if s.next_deduction_amount > 0.0 {
                Cell::new(money(s.next_deduction_amount).red())
            } else {
                Cell::new(money(0.0))
            },
            Cell::new(s.latest.map(|l| l.date.to_string()).unwrap_or_default()),
        ]);
    }
    let total: f64 = summaries.iter().map(|s| s.total_fines).sum();
    let deducted: f64 = summaries.iter().map(|s| s.total_deducted).sum();
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(summaries.iter().map(|s| s.fine_count).sum::<usize>()),
        Cell::new(summaries.iter().map(|s| s.count(FineStatus::Pending)).sum::<usize>()),
        Cell::new(summaries.iter().map(|s| s.active_fines).sum::<usize>()),
        Cell::new(money(total).bold()),
        Cell::new(money(deducted).bold()),
        Cell::new(money(total - deducted).bold()),
        Cell::new(""),
    ]);
    println!("Fine Summary\n{table}");
    Ok(())
}

pub fn history(employee_id: &str) -> Result<()> {
    let ws = open_workspace()?;
    let history = ws.fines().history_for(employee_id);
    if history.is_empty() {
        println!("No fines for {employee_id}.");
        return Ok(());
    }
    println!("Fines for {employee_id}\n{}", fines_table(&history));
    Ok(())
}
