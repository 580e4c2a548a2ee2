use std::path::Path;

use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

use crate::error::Result;
use crate::fines::{FineAction, NewFine};
use crate::remarks::{NewRemark, RemarkAction};
use crate::settings::get_data_dir;
use crate::store::{Backend, JsonFileBackend, Workspace};

pub const EMPLOYEES_FILE: &str = "employees.json";
pub const ATTENDANCE_FILE: &str = "attendance.json";

struct DemoEmployee {
    id: &'static str,
    name: &'static str,
    department: &'static str,
    position: &'static str,
    salary: u32,
    join_date: &'static str,
    status: &'static str,
}

const EMPLOYEES: &[DemoEmployee] = &[
    DemoEmployee { id: "E001", name: "Amara Okafor", department: "Engineering", position: "Backend Engineer", salary: 7200, join_date: "2021-04-12", status: "active" },
    DemoEmployee { id: "E002", name: "Ben Whitaker", department: "Sales", position: "Account Executive", salary: 5100, join_date: "2019-09-02", status: "active" },
    DemoEmployee { id: "E003", name: "Chen Li", department: "Engineering", position: "Frontend Engineer", salary: 6800, join_date: "2022-01-17", status: "active" },
    DemoEmployee { id: "E004", name: "Dana Rossi", department: "HR", position: "HR Generalist", salary: 4600, join_date: "2020-06-29", status: "on_leave" },
    DemoEmployee { id: "E005", name: "Elif Demir", department: "Finance", position: "Accountant", salary: 5400, join_date: "2018-11-05", status: "active" },
    DemoEmployee { id: "E006", name: "Farid Haddad", department: "Sales", position: "Sales Manager", salary: 6900, join_date: "2017-03-20", status: "active" },
    DemoEmployee { id: "E007", name: "Grace Kim", department: "Operations", position: "Office Manager", salary: 4300, join_date: "2023-02-13", status: "active" },
    DemoEmployee { id: "E008", name: "Hugo Martin", department: "Engineering", position: "QA Engineer", salary: 5900, join_date: "2021-10-04", status: "terminated" },
    DemoEmployee { id: "E009", name: "Isla Novak", department: "Finance", position: "Payroll Specialist", salary: 5000, join_date: "2022-08-22", status: "active" },
    DemoEmployee { id: "E010", name: "Jonas Berg", department: "Operations", position: "Facilities Lead", salary: 4800, join_date: "2020-12-01", status: "active" },
    DemoEmployee { id: "E011", name: "Kira Sato", department: "Engineering", position: "Engineering Manager", salary: 8400, join_date: "2016-05-16", status: "active" },
    DemoEmployee { id: "E012", name: "Luis Ortega", department: "Sales", position: "Sales Associate", salary: 3900, join_date: "2024-03-11", status: "active" },
];

/// Attendance statuses cycled per employee and day.
const ATTENDANCE_CYCLE: &[(&str, &str, &str)] = &[
    ("present", "08:55", "17:30"),
    ("present", "09:02", "17:45"),
    ("late", "09:41", "18:05"),
    ("present", "08:48", "17:20"),
    ("absent", "", ""),
    ("present", "08:59", "17:35"),
    ("half_day", "09:00", "13:00"),
];

struct DemoFine {
    employee: usize,
    days_ago: i64,
    amount: f64,
    reason: &'static str,
    action: DemoFineStep,
}

enum DemoFineStep {
    Leave,
    Approve,
    Reject,
    Deduct,
}

const FINES: &[DemoFine] = &[
    DemoFine { employee: 0, days_ago: 40, amount: 25.0, reason: "Late arrival", action: DemoFineStep::Deduct },
    DemoFine { employee: 0, days_ago: 12, amount: 25.0, reason: "Late arrival", action: DemoFineStep::Approve },
    DemoFine { employee: 1, days_ago: 30, amount: 50.0, reason: "Missed client meeting", action: DemoFineStep::Reject },
    DemoFine { employee: 1, days_ago: 5, amount: 75.0, reason: "Expense policy violation", action: DemoFineStep::Leave },
    DemoFine { employee: 3, days_ago: 22, amount: 30.0, reason: "Unreported absence", action: DemoFineStep::Approve },
    DemoFine { employee: 5, days_ago: 60, amount: 100.0, reason: "Equipment damage", action: DemoFineStep::Deduct },
    DemoFine { employee: 5, days_ago: 3, amount: 25.0, reason: "Late arrival", action: DemoFineStep::Leave },
    DemoFine { employee: 7, days_ago: 18, amount: 40.0, reason: "Dress code", action: DemoFineStep::Approve },
    DemoFine { employee: 11, days_ago: 9, amount: 25.0, reason: "Late arrival", action: DemoFineStep::Leave },
];

struct DemoRemark {
    employee: usize,
    days_ago: i64,
    remark_type: &'static str,
    content: &'static str,
    acknowledged: Option<&'static str>,
}

const REMARKS: &[DemoRemark] = &[
    DemoRemark { employee: 0, days_ago: 45, remark_type: "positive", content: "Led the billing migration without downtime.", acknowledged: Some("Thanks!") },
    DemoRemark { employee: 0, days_ago: 11, remark_type: "warning", content: "Second late arrival this month.", acknowledged: None },
    DemoRemark { employee: 2, days_ago: 20, remark_type: "positive", content: "Great accessibility work on the dashboard.", acknowledged: Some("") },
    DemoRemark { employee: 4, days_ago: 33, remark_type: "neutral", content: "Reminder to submit quarterly close notes.", acknowledged: Some("Done.") },
    DemoRemark { employee: 5, days_ago: 8, remark_type: "warning", content: "Team pipeline review overdue.", acknowledged: None },
    DemoRemark { employee: 6, days_ago: 15, remark_type: "positive", content: "Smooth office move coordination.", acknowledged: None },
    DemoRemark { employee: 10, days_ago: 2, remark_type: "positive", content: "Mentored two new hires through onboarding.", acknowledged: None },
];

fn employee_records() -> Vec<Value> {
    EMPLOYEES
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "name": e.name,
                "email": format!("{}@example.com", e.name.to_lowercase().replace(' ', ".")),
                "department": e.department,
                "position": e.position,
                "salary": e.salary,
                "join_date": e.join_date,
                "status": e.status,
            })
        })
        .collect()
}

/// Two working weeks of attendance for every active employee, ending today.
fn attendance_records(today: NaiveDate) -> Vec<Value> {
    let mut rows = Vec::new();
    for days_ago in (0..14i64).rev() {
        let date = today - chrono::Duration::days(days_ago);
        for (idx, e) in EMPLOYEES.iter().enumerate() {
            if e.status != "active" {
                continue;
            }
            let (status, check_in, check_out) =
                ATTENDANCE_CYCLE[(idx + days_ago as usize) % ATTENDANCE_CYCLE.len()];
            rows.push(json!({
                "employee_id": e.id,
                "employee_name": e.name,
                "department": e.department,
                "date": date.to_string(),
                "status": status,
                "check_in": check_in,
                "check_out": check_out,
            }));
        }
    }
    rows
}

fn write_json(path: &Path, rows: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Seed the workspace with the demo fines and remarks, walking each one
/// through its workflow. Returns (fines, remarks) added.
fn seed_events<B: Backend>(ws: &mut Workspace<B>, today: NaiveDate) -> Result<(usize, usize)> {
    for f in FINES {
        let e = &EMPLOYEES[f.employee];
        let id = ws.add_fine(NewFine {
            employee_id: e.id.to_string(),
            employee_name: e.name.to_string(),
            department: e.department.to_string(),
            amount: f.amount,
            reason: f.reason.to_string(),
            date: today - chrono::Duration::days(f.days_ago),
        })?;
        match f.action {
            DemoFineStep::Leave => {}
            DemoFineStep::Approve => {
                ws.apply_fine(FineAction::Approve { id, comment: None })?;
            }
            DemoFineStep::Reject => {
                ws.apply_fine(FineAction::Reject {
                    id,
                    comment: Some("Client rescheduled".into()),
                })?;
            }
            DemoFineStep::Deduct => {
                ws.apply_fine(FineAction::Approve { id, comment: None })?;
                ws.apply_fine(FineAction::Deduct { id })?;
            }
        }
    }

    for r in REMARKS {
        let e = &EMPLOYEES[r.employee];
        let id = ws.add_remark(NewRemark {
            employee_id: e.id.to_string(),
            employee_name: e.name.to_string(),
            department: e.department.to_string(),
            remark_type: r.remark_type.to_string(),
            content: r.content.to_string(),
            date: today - chrono::Duration::days(r.days_ago),
        })?;
        if let Some(comment) = r.acknowledged {
            let comment = (!comment.is_empty()).then(|| comment.to_string());
            ws.apply_remark(RemarkAction::Acknowledge { id, comment })?;
        }
    }

    Ok((FINES.len(), REMARKS.len()))
}

pub fn run() -> Result<()> {
    let data_dir = get_data_dir();
    let backend = JsonFileBackend::in_dir(&data_dir);

    if !backend.path().exists() {
        eprintln!("No data file found. Run `hrdesk init` first.");
        std::process::exit(1);
    }

    let mut ws = Workspace::open(backend)?;

    // Idempotency guard
    if data_dir.join(EMPLOYEES_FILE).exists() || !ws.fines().all().is_empty() {
        println!("Demo data already loaded ({EMPLOYEES_FILE} or fines exist).");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let employees = employee_records();
    let attendance = attendance_records(today);
    write_json(&data_dir.join(EMPLOYEES_FILE), &employees)?;
    write_json(&data_dir.join(ATTENDANCE_FILE), &attendance)?;
    let (fine_count, remark_count) = seed_events(&mut ws, today)?;

    println!("Demo data loaded!");
    println!("  Employees:  {}", employees.len());
    println!("  Attendance: {}", attendance.len());
    println!("  Fines:      {fine_count}");
    println!("  Remarks:    {remark_count}");
    println!();
    println!("Try these next:");
    println!("  hrdesk table {} --filter department=Sales", data_dir.join(EMPLOYEES_FILE).display());
    println!("  hrdesk browse {}", data_dir.join(ATTENDANCE_FILE).display());
    println!("  hrdesk fines summary");
    println!("  hrdesk remarks list --unacknowledged");

    Ok(())
}
