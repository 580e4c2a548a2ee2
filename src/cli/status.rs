use crate::error::Result;
use crate::fines::FineStatus;
use crate::fmt::{format_bytes, money};
use crate::settings::{load_settings, settings_path};
use crate::store::{JsonFileBackend, Workspace};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let ws = Workspace::open(JsonFileBackend::in_dir(&data_dir))?;
    let data_file = ws.backend().path();

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", data_dir.display());
    println!("Data file:  {}", data_file.display());
    println!("Page size:  {}", settings.page_size);

    if !data_file.exists() {
        println!();
        println!("Data file not found. Run `hrdesk init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(data_file)?.len();
    println!("File size:  {}", format_bytes(size));

    let fines = ws.fines();
    let pending = fines.with_status(FineStatus::Pending).len();
    let outstanding: f64 = fines.summaries().iter().map(|s| s.next_deduction_amount).sum();

    println!();
    println!("Fines:            {}", fines.all().len());
    println!("  Pending:        {pending}");
    println!("  To deduct:      {}", money(outstanding));
    println!("Remarks:          {}", ws.remarks().all().len());
    println!("  Unacknowledged: {}", ws.remarks().unacknowledged().len());

    Ok(())
}
