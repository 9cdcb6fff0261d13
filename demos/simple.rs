use chrono::NaiveDate;
use syukujitsu::Holidays;

#[tokio::main]
async fn main() -> Result<(), syukujitsu::Error> {
    let holidays = Holidays::new();

    let d = NaiveDate::from_ymd_opt(2024, 1, 1).expect("Invalid date");
    println!(
        "Is {d} a holiday in Japan? Answer is {}",
        holidays.contains(d).await?
    );

    println!("{:?}", holidays.get(d).await?);

    Ok(())
}
