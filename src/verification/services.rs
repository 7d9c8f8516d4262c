use rand::Rng;
use time::Duration;

pub const CODE_LEN: usize = 6;
pub const CODE_TTL: Duration = Duration::minutes(10);

/// Six random digits, zero-padded.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:0width$}", width = CODE_LEN)
}

pub fn code_email(patient_name: &str, code: &str) -> (String, String) {
    let subject = "Your verification code".to_string();
    let body = format!(
        "Hello {patient_name},\n\nYour verification code is {code}.\n\
         It expires in {} minutes.\n",
        CODE_TTL.whole_minutes()
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit()), "{code}");
        }
    }

    #[test]
    fn email_mentions_code_and_expiry() {
        let (subject, body) = code_email("Choi", "004211");
        assert!(!subject.is_empty());
        assert!(body.contains("Choi"));
        assert!(body.contains("004211"));
        assert!(body.contains("10 minutes"));
    }
}
