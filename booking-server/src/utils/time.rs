//! 时间工具

use chrono::Duration;

/// 解析有效期字符串
///
/// 支持纯数字 (秒) 或 `<数字><单位>`，单位可为
/// `s`/`sec`/`seconds`、`m`/`min`/`minutes`、`h`/`hr`/`hours`、`d`/`day`/`days`，
/// 数字与单位之间允许空格。结果必须为正。
///
/// ```ignore
/// assert_eq!(parse_ttl("30m"), Some(Duration::minutes(30)));
/// assert_eq!(parse_ttl("7d"), Some(Duration::days(7)));
/// ```
pub fn parse_ttl(input: &str) -> Option<Duration> {
    let input = input.trim();
    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);

    let value: i64 = digits.parse().ok()?;
    if value <= 0 {
        return None;
    }

    let duration = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => Duration::try_seconds(value),
        "m" | "min" | "mins" | "minute" | "minutes" => Duration::try_minutes(value),
        "h" | "hr" | "hrs" | "hour" | "hours" => Duration::try_hours(value),
        "d" | "day" | "days" => Duration::try_days(value),
        _ => None,
    };

    duration
}
