use syukujitsu::Holidays;

#[tokio::main]
async fn main() -> Result<(), syukujitsu::Error> {
    let holidays = Holidays::new();

    for holiday in holidays.between("2024-01-01", "2024-12-31").await? {
        println!("{}: {}", holiday.date, holiday.name);
    }

    Ok(())
}
