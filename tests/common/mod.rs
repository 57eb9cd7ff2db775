use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Writes `rows` deposits of 1.0 spread round-robin over `accounts` accounts.
pub fn generate_deposits(path: &Path, rows: usize, accounts: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["type", "account", "amount"])?;

    for i in 0..rows {
        let account = format!("acc-{}", i % accounts);
        wtr.write_record(["deposit", account.as_str(), "1.0"])?;
    }

    wtr.flush()?;
    Ok(())
}
