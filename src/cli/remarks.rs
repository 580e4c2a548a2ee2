use chrono::{Local, NaiveDate};
use colored::Colorize;
use comfy_table::{Cell, Table};

use super::open_workspace;
use crate::error::Result;
use crate::fmt::truncate;
use crate::remarks::{NewRemark, Remark, RemarkAction, RemarkStatus};
use crate::summary::Applied;

fn remarks_table(remarks: &[&Remark]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Date", "Employee", "Type", "Remark", "Status", "Employee Comment",
    ]);
    for remark in remarks {
        let status = match remark.status {
            RemarkStatus::Unacknowledged => Cell::new(remark.status.to_string().yellow()),
            RemarkStatus::Acknowledged => Cell::new(remark.status.to_string().green()),
        };
        table.add_row(vec![
            Cell::new(remark.id),
            Cell::new(remark.date),
            Cell::new(format!("{} ({})", remark.employee_name, remark.employee_id)),
            Cell::new(&remark.remark_type),
            Cell::new(truncate(&remark.content, 40)),
            status,
            Cell::new(truncate(remark.employee_comment.as_deref().unwrap_or(""), 30)),
        ]);
    }
    table
}

pub fn add(
    employee_id: &str,
    name: &str,
    department: &str,
    remark_type: &str,
    content: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let mut ws = open_workspace()?;
    let id = ws.add_remark(NewRemark {
        employee_id: employee_id.to_string(),
        employee_name: name.to_string(),
        department: department.to_string(),
        remark_type: remark_type.to_string(),
        content: content.to_string(),
        date: date.unwrap_or_else(|| Local::now().date_naive()),
    })?;
    println!("Added {remark_type} remark #{id} for {name}");
    Ok(())
}

pub fn acknowledge(id: u64, comment: Option<String>) -> Result<()> {
    let mut ws = open_workspace()?;
    match ws.apply_remark(RemarkAction::Acknowledge { id, comment })? {
        Applied::Updated => println!("Remark #{id} acknowledged."),
        Applied::NotFound => println!("No remark #{id}."),
    }
    Ok(())
}

pub fn cancel(id: u64) -> Result<()> {
    let mut ws = open_workspace()?;
    match ws.apply_remark(RemarkAction::Cancel { id })? {
        Applied::Updated => println!("Cancelled remark #{id}."),
        Applied::NotFound => println!("No remark #{id}."),
    }
    Ok(())
}

pub fn list(unacknowledged: bool) -> Result<()> {
    let ws = open_workspace()?;
    let remarks: Vec<&Remark> = if unacknowledged {
        ws.remarks().unacknowledged()
    } else {
        ws.remarks().all().iter().collect()
    };
    if remarks.is_empty() {
        println!("No remarks found.");
        return Ok(());
    }
    println!("Remarks\n{}", remarks_table(&remarks));
    Ok(())
}

pub fn summary() -> Result<()> {
    let ws = open_workspace()?;
    let summaries = ws.remarks().summaries();
    if summaries.is_empty() {
        println!("No remarks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Employee", "Name", "Department", "Remarks", "By Type", "Warnings", "Acknowledged", "Open",
        "Latest",
    ]);
    for s in &summaries {
        let by_type = s
            .type_counts
            .iter()
            .map(|(kind, n)| format!("{kind}: {n}"))
            .collect::<Vec<_>>()
            .join(", ");
        let latest = match (s.latest, &s.latest_type) {
            (Some(l), Some(kind)) => format!("{} ({kind})", l.date),
            (Some(l), None) => l.date.to_string(),
            _ => String::new(),
        };
        table.add_row(vec![
            Cell::new(&s.employee_id),
            Cell::new(&s.employee_name),
            Cell::new(&s.department),
            Cell::new(s.total_remarks),
            Cell::new(by_type),
            match s.count("warning") {
                0 => Cell::new(0),
                n => Cell::new(n.to_string().red()),
            },
            Cell::new(s.acknowledged),
            if s.unacknowledged > 0 {
                Cell::new(s.unacknowledged.to_string().yellow())
            } else {
                Cell::new(0)
            },
            Cell::new(latest),
        ]);
    }
    println!("Remark Summary\n{table}");
    Ok(())
}

pub fn history(employee_id: &str) -> Result<()> {
    let ws = open_workspace()?;
    let history = ws.remarks().history_for(employee_id);
    if history.is_empty() {
        println!("No remarks for {employee_id}.");
        return Ok(());
    }
    println!("Remarks for {employee_id}\n{}", remarks_table(&history));
    Ok(())
}
