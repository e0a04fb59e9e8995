use chrono::Utc;
use rand::Rng;

/// Number of messages `format_for_speech` produces. Callers index into them by position.
pub const SPEECH_MESSAGE_COUNT: usize = 4;

/// Builds a 10-digit ACK number: the last 6 digits of the current millisecond timestamp
/// followed by a zero-padded 4-digit random suffix.
///
/// Two calls in the same millisecond share the timestamp part and only differ by chance.
pub fn generate_ack_number() -> String {
    let time_part = Utc::now().timestamp_millis().rem_euclid(1_000_000);
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{time_part:06}{suffix:04}")
}

/// Renders an ACK number as the four utterances spoken into a call, in order:
/// digit by digit, grouped 3-3-4, spelled slowly with pauses, and a final confirmation.
pub fn format_for_speech(ack: &str) -> [String; SPEECH_MESSAGE_COUNT] {
    let digits: Vec<String> = ack.chars().map(|c| c.to_string()).collect();

    let grouped = group_3_3_4(&digits)
        .iter()
        .map(|group| group.join(" "))
        .collect::<Vec<_>>()
        .join(", ");

    [
        format!("Your acknowledgment number is: {}.", digits.join(", ")),
        format!("Again, that is {grouped}."),
        format!("Let me spell it slowly: {}.", digits.join(", pause, ")),
        format!(
            "To confirm, your acknowledgment number is {ack}. Please keep it for your records."
        ),
    ]
}

fn group_3_3_4(digits: &[String]) -> Vec<&[String]> {
    let first = digits.len().min(3);
    let second = digits.len().min(6);
    [&digits[..first], &digits[first..second], &digits[second..]]
        .into_iter()
        .filter(|group| !group.is_empty())
        .collect()
}
