use chrono::NaiveDate;

use crate::services::{Clock, HolidayStatus, TradingCalendar};
use crate::utils::{format_local_timestamp, parse_local_timestamp};

use super::context_or_exit;

pub fn run(at: Option<String>) {
    let ctx = context_or_exit();

    let now = match at {
        Some(at) => match parse_local_timestamp(&at) {
            Ok(now) => now,
            Err(e) => {
                eprintln!("❌ Error: {}", e);
                std::process::exit(1);
            }
        },
        None => ctx.clock.market_now(),
    };

    let resolved = ctx.resolver().resolve(now);
    let today = now.date();

    println!(
        "🕒 Now:          {} ({})",
        format_local_timestamp(&now),
        day_kind(&ctx.calendar, today)
    );
    println!("📍 Phase:        {:?}", resolved.phase);
    println!("🪟 Window:       {}", resolved.window);
    println!("⏱  Duration:     {} min", resolved.window.duration().num_minutes());
    println!("📥 Fetch range:  {}", resolved.fetch_range);
}

fn day_kind(calendar: &TradingCalendar, date: NaiveDate) -> &'static str {
    if calendar.is_weekend(date) {
        return "weekend";
    }
    match calendar.holiday_status(date) {
        HolidayStatus::Holiday => "holiday",
        HolidayStatus::TradingDay => "trading day",
        HolidayStatus::Unknown => "unknown (holiday year not loaded, assuming trading day)",
    }
}
